// =============================================================================
// easylog — Logger minimaliste à niveaux
// =============================================================================
//
// Format d'une ligne :
//   <horodatage RFC3339> | <ENV> | <NIVEAU>: <message>
//
// Architecture :
//   core/logger.rs      — Trait `Logger`, `DefaultLogger`, `NoopLogger`
//   core/level.rs       — Niveaux INFO / DEBUG / ERROR / FATAL
//   core/sink.rs        — Sink mémoire (tests, embarquement)
//   core/settings.rs    — Configuration JSON du binaire
//   core/diagnostics.rs — Diagnostics internes (log + env_logger)
//
// Auteur : M@nu
// Licence : MIT
// =============================================================================

//! Logger à niveaux, horodaté et filtré par environnement.
//!
//! ```
//! use easylog::{DefaultLogger, Logger, LoggerOptions, MemorySink};
//!
//! let sink = MemorySink::new();
//! let log = DefaultLogger::new(&sink, LoggerOptions::new("prod").hide_debug_in("prod"));
//!
//! log.debug("masqué");
//! easylog::infof!(log, "démarré en {} ms", 12);
//!
//! assert_eq!(sink.write_count(), 1);
//! assert!(sink.contents().ends_with(" | PROD | INFO: démarré en 12 ms\n"));
//! ```

pub mod core;

pub use crate::core::level::Level;
pub use crate::core::logger::{
    format_line, timestamp, DefaultLogger, Logger, LoggerOptions, NoopLogger, FATAL_EXIT_CODE,
};
pub use crate::core::sink::MemorySink;

/// `INFO` formaté : `infof!(logger, "count {}", 5)`.
#[macro_export]
macro_rules! infof {
    ($logger:expr, $($arg:tt)+) => {
        $crate::Logger::infof(&$logger, ::std::format_args!($($arg)+))
    };
}

/// `DEBUG` formaté.
#[macro_export]
macro_rules! debugf {
    ($logger:expr, $($arg:tt)+) => {
        $crate::Logger::debugf(&$logger, ::std::format_args!($($arg)+))
    };
}

/// `ERROR` formaté.
#[macro_export]
macro_rules! errorf {
    ($logger:expr, $($arg:tt)+) => {
        $crate::Logger::errorf(&$logger, ::std::format_args!($($arg)+))
    };
}

/// `FATAL` formaté, puis sortie du processus (code 1).
#[macro_export]
macro_rules! failf {
    ($logger:expr, $($arg:tt)+) => {
        $crate::Logger::failf(&$logger, ::std::format_args!($($arg)+))
    };
}
