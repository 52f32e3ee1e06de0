// =============================================================================
// Fichier : diagnostics.rs
// Rôle    : Diagnostics internes de la crate (façade `log` + env_logger)
//
// Ces messages ne passent jamais par le sink du logger : ils décrivent le
// fonctionnement de la crate elle-même (échecs d'écriture, configuration).
// =============================================================================

use std::fmt;
use std::io::Write;

use env_logger::{Builder, Target};
use log::{Level, LevelFilter};

use super::logger::timestamp;

/// Préfixe qui distingue un diagnostic d'une ligne émise par un logger.
const DIAGNOSTIC_TAG: &str = "easylog";

/// Ligne de diagnostic, sans retour final.
///
/// Format : `easylog: <horodatage RFC3339> [LEVEL module] message`
pub fn diagnostic_line(
    timestamp: &str,
    level: Level,
    module: &str,
    message: impl fmt::Display,
) -> String {
    format!("{DIAGNOSTIC_TAG}: {timestamp} [{level} {module}] {message}")
}

/// Initialise les diagnostics internes sur stderr (voir [`diagnostic_line`]).
///
/// `RUST_LOG`, s'il est défini, remplace `level`. Un second appel est ignoré.
pub fn init_diagnostics(level: LevelFilter) {
    let mut builder = Builder::new();
    builder.filter_level(level);
    if let Ok(filter) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filter);
    }

    let installed = builder
        .target(Target::Stderr)
        .format(|buf, record| {
            let line = diagnostic_line(
                &timestamp(),
                record.level(),
                record.module_path().unwrap_or_else(|| record.target()),
                record.args(),
            );
            writeln!(buf, "{line}")
        })
        .try_init()
        .is_ok();

    if installed {
        log::debug!("Diagnostics initialisés (niveau {level})");
    }
}

/// Niveau des diagnostics selon le nombre de `-v` passés en ligne de commande.
pub const fn level_from_verbosity(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}
