// =============================================================================
// Fichier : core/mod.rs
// Rôle    : Cœur de la crate (logger, niveaux, sinks, configuration)
// =============================================================================

pub mod diagnostics;
pub mod level;
pub mod logger;
pub mod settings;
pub mod sink;
