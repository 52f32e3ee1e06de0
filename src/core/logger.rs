// =============================================================================
// Fichier : logger.rs
// Rôle    : Trait `Logger`, logger par défaut et logger muet
//
// Principe :
//   - Le logger n'est jamais propriétaire du sink : il l'emprunte (`&'a W`).
//   - Toute la politique de filtrage est portée par l'instance, aucun état
//     global n'est partagé entre loggers.
// =============================================================================

use std::fmt;
use std::io::Write;
use std::sync::Arc;

use chrono::{Local, SecondsFormat};
use serde::{Deserialize, Serialize};

use super::level::Level;

/// Code de sortie du processus après un appel fatal.
pub const FATAL_EXIT_CODE: i32 = 1;

// =============================================================================
// Options de construction
// =============================================================================

/// Options de construction d'un [`DefaultLogger`].
///
/// Les trois libellés sont comparés sans tenir compte de la casse. Un libellé
/// vide ne correspond qu'à un environnement vide.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerOptions {
    /// Environnement courant (ex: "dev", "prod").
    pub env: String,
    /// Environnement dans lequel les appels `debug` sont masqués.
    pub hide_debug_in_env: String,
    /// Environnement dans lequel seuls `error` et `fail` sont écrits.
    pub only_error_in_env: String,
}

impl LoggerOptions {
    pub fn new(env: impl Into<String>) -> Self {
        Self {
            env: env.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn hide_debug_in(mut self, env: impl Into<String>) -> Self {
        self.hide_debug_in_env = env.into();
        self
    }

    #[must_use]
    pub fn only_error_in(mut self, env: impl Into<String>) -> Self {
        self.only_error_in_env = env.into();
        self
    }
}

// =============================================================================
// Trait
// =============================================================================

/// Ensemble des opérations de log.
///
/// Permet de substituer une autre implémentation (ex: [`NoopLogger`] dans les
/// tests) sans toucher aux sites d'appel. Les variantes `*f` reçoivent des
/// [`fmt::Arguments`] ; les macros [`infof!`](crate::infof),
/// [`debugf!`](crate::debugf), [`errorf!`](crate::errorf) et
/// [`failf!`](crate::failf) les construisent.
pub trait Logger {
    /// Écrit une ligne `INFO`, sauf en environnement « erreurs seules ».
    fn info(&self, msg: &str);

    /// Comme [`Logger::info`], avec un message formaté.
    fn infof(&self, args: fmt::Arguments<'_>);

    /// Écrit une ligne `DEBUG`, sauf si l'un des deux libellés correspond.
    fn debug(&self, msg: &str);

    /// Comme [`Logger::debug`], avec un message formaté.
    fn debugf(&self, args: fmt::Arguments<'_>);

    /// Écrit une ligne `ERROR` ; jamais masqué.
    ///
    /// Pour une erreur, c'est son message (`Display`) qui est écrit.
    fn error(&self, value: &dyn fmt::Display);

    /// Comme [`Logger::error`], avec un message formaté.
    fn errorf(&self, args: fmt::Arguments<'_>);

    /// Écrit une ligne `FATAL` puis termine le processus avec le code 1.
    fn fail(&self, value: &dyn fmt::Display) -> !;

    /// Comme [`Logger::fail`], avec un message formaté.
    fn failf(&self, args: fmt::Arguments<'_>) -> !;
}

macro_rules! forward_logger {
    ($($ptr:ty),+ $(,)?) => {
        $(
            impl<L: Logger + ?Sized> Logger for $ptr {
                fn info(&self, msg: &str) {
                    (**self).info(msg);
                }

                fn infof(&self, args: fmt::Arguments<'_>) {
                    (**self).infof(args);
                }

                fn debug(&self, msg: &str) {
                    (**self).debug(msg);
                }

                fn debugf(&self, args: fmt::Arguments<'_>) {
                    (**self).debugf(args);
                }

                fn error(&self, value: &dyn fmt::Display) {
                    (**self).error(value);
                }

                fn errorf(&self, args: fmt::Arguments<'_>) {
                    (**self).errorf(args);
                }

                fn fail(&self, value: &dyn fmt::Display) -> ! {
                    (**self).fail(value)
                }

                fn failf(&self, args: fmt::Arguments<'_>) -> ! {
                    (**self).failf(args)
                }
            }
        )+
    };
}

forward_logger!(&L, Box<L>, Arc<L>);

// =============================================================================
// Format de ligne
// =============================================================================

/// Horodatage RFC3339 local, à la seconde (`Z` si le décalage est nul).
pub fn timestamp() -> String {
    Local::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Construit une ligne complète, retour à la ligne final inclus.
///
/// Format : `<horodatage> | <ENV> | <NIVEAU>: <message>\n`
pub fn format_line(timestamp: &str, env: &str, level: Level, message: impl fmt::Display) -> String {
    format!("{timestamp} | {env} | {level}: {message}\n")
}

// =============================================================================
// Logger par défaut
// =============================================================================

/// Logger qui écrit une ligne par appel dans un sink emprunté.
///
/// Le sink doit accepter l'écriture via une référence partagée
/// (`&Stdout`, `&Stderr`, `&File`, [`&MemorySink`](crate::MemorySink), ...).
/// Les écritures concurrentes ne sont pas sérialisées par le logger : leur
/// entrelacement dépend du sink.
pub struct DefaultLogger<'a, W: ?Sized> {
    sink: &'a W,
    env: String,
    hide_debug: String,
    only_error: String,
}

impl<'a, W> DefaultLogger<'a, W>
where
    W: ?Sized,
    for<'b> &'b W: Write,
{
    /// Crée un logger immuable ; les libellés sont normalisés en majuscules.
    pub fn new(sink: &'a W, options: LoggerOptions) -> Self {
        Self {
            sink,
            env: options.env.to_uppercase(),
            hide_debug: options.hide_debug_in_env.to_uppercase(),
            only_error: options.only_error_in_env.to_uppercase(),
        }
    }

    /// Environnement normalisé, tel qu'il apparaît dans les lignes.
    pub fn env(&self) -> &str {
        &self.env
    }

    /// Indique si un appel de ce niveau produirait une écriture.
    pub fn enabled(&self, level: Level) -> bool {
        if level.is_error() {
            return true;
        }
        !self.hides_non_error() && (level != Level::Debug || !self.hides_debug())
    }

    fn hides_non_error(&self) -> bool {
        self.env == self.only_error
    }

    fn hides_debug(&self) -> bool {
        self.env == self.hide_debug
    }

    fn log_if_enabled(&self, level: Level, args: fmt::Arguments<'_>) {
        if self.enabled(level) {
            self.log(level, args);
        } else {
            log::trace!("appel {level} masqué en environnement {}", self.env);
        }
    }

    fn log(&self, level: Level, args: fmt::Arguments<'_>) {
        let line = format_line(&timestamp(), &self.env, level, args);
        let mut sink = self.sink;
        // Un seul appel `write` par ligne, jamais répété : le sink est
        // « best effort », un échec ou une écriture partielle est signalé
        // sans être propagé.
        match sink.write(line.as_bytes()) {
            Ok(written) if written < line.len() => {
                log::warn!(
                    "Ligne {level} tronquée: {written} octets écrits sur {}",
                    line.len()
                );
            }
            Ok(_) => {}
            Err(e) => log::warn!("Écriture de la ligne {level} impossible: {e}"),
        }
    }

    fn log_fatal(&self, args: fmt::Arguments<'_>) -> ! {
        self.log(Level::Fatal, args);
        let mut sink = self.sink;
        if let Err(e) = sink.flush() {
            log::warn!("Vidage du sink impossible avant sortie: {e}");
        }
        std::process::exit(FATAL_EXIT_CODE)
    }
}

impl<W: ?Sized> fmt::Debug for DefaultLogger<'_, W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefaultLogger")
            .field("env", &self.env)
            .field("hide_debug", &self.hide_debug)
            .field("only_error", &self.only_error)
            .finish_non_exhaustive()
    }
}

impl<W> Logger for DefaultLogger<'_, W>
where
    W: ?Sized,
    for<'b> &'b W: Write,
{
    fn info(&self, msg: &str) {
        self.log_if_enabled(Level::Info, format_args!("{msg}"));
    }

    fn infof(&self, args: fmt::Arguments<'_>) {
        self.log_if_enabled(Level::Info, args);
    }

    fn debug(&self, msg: &str) {
        self.log_if_enabled(Level::Debug, format_args!("{msg}"));
    }

    fn debugf(&self, args: fmt::Arguments<'_>) {
        self.log_if_enabled(Level::Debug, args);
    }

    fn error(&self, value: &dyn fmt::Display) {
        self.log(Level::Error, format_args!("{value}"));
    }

    fn errorf(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Error, args);
    }

    fn fail(&self, value: &dyn fmt::Display) -> ! {
        self.log_fatal(format_args!("{value}"))
    }

    fn failf(&self, args: fmt::Arguments<'_>) -> ! {
        self.log_fatal(args)
    }
}

// =============================================================================
// Logger muet
// =============================================================================

/// Logger qui n'écrit rien.
///
/// `fail`/`failf` terminent tout de même le processus : le contrat fatal ne
/// dépend pas de l'implémentation.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLogger;

impl Logger for NoopLogger {
    fn info(&self, _msg: &str) {}

    fn infof(&self, _args: fmt::Arguments<'_>) {}

    fn debug(&self, _msg: &str) {}

    fn debugf(&self, _args: fmt::Arguments<'_>) {}

    fn error(&self, _value: &dyn fmt::Display) {}

    fn errorf(&self, _args: fmt::Arguments<'_>) {}

    fn fail(&self, _value: &dyn fmt::Display) -> ! {
        std::process::exit(FATAL_EXIT_CODE)
    }

    fn failf(&self, _args: fmt::Arguments<'_>) -> ! {
        std::process::exit(FATAL_EXIT_CODE)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::sink::MemorySink;

    /// Découpe une ligne en (horodatage, env, "NIVEAU: message").
    fn split_line(line: &str) -> (String, String, String) {
        let body = line.strip_suffix('\n').expect("ligne sans retour final");
        let parts: Vec<&str> = body.splitn(3, " | ").collect();
        assert_eq!(parts.len(), 3, "format inattendu: {line:?}");
        (parts[0].to_string(), parts[1].to_string(), parts[2].to_string())
    }

    fn last_tail(sink: &MemorySink) -> String {
        split_line(&sink.last_line().expect("aucune écriture")).2
    }

    #[test]
    fn dev_without_suppression_writes_every_level() {
        let sink = MemorySink::new();
        let log = DefaultLogger::new(&sink, LoggerOptions::new("dev"));

        log.info("started");
        let (ts, env, tail) = split_line(&sink.last_line().unwrap());
        assert!(chrono::DateTime::parse_from_rfc3339(&ts).is_ok(), "horodatage: {ts}");
        assert_eq!(env, "DEV");
        assert_eq!(tail, "INFO: started");

        log.infof(format_args!("test {}", 2));
        assert_eq!(last_tail(&sink), "INFO: test 2");

        log.debug("test");
        assert_eq!(last_tail(&sink), "DEBUG: test");

        log.debugf(format_args!("test {}", 2));
        assert_eq!(last_tail(&sink), "DEBUG: test 2");

        log.error(&"literal");
        assert_eq!(last_tail(&sink), "ERROR: literal");

        log.errorf(format_args!("err {}", 3));
        assert_eq!(last_tail(&sink), "ERROR: err 3");

        assert_eq!(sink.write_count(), 6);
    }

    #[test]
    fn one_write_per_call_with_single_trailing_newline() {
        let sink = MemorySink::new();
        let log = DefaultLogger::new(&sink, LoggerOptions::new("dev"));

        log.info("a");
        log.error(&"b");

        let writes = sink.writes();
        assert_eq!(writes.len(), 2);
        for w in writes {
            assert_eq!(w.matches('\n').count(), 1);
            assert!(w.ends_with('\n'));
        }
    }

    #[test]
    fn hide_debug_env_masks_only_debug() {
        let sink = MemorySink::new();
        let log = DefaultLogger::new(&sink, LoggerOptions::new("prod").hide_debug_in("prod"));

        log.debug("x");
        log.debugf(format_args!("skip this {}", "message"));
        assert_eq!(sink.write_count(), 0);

        log.info("x");
        let (_, env, tail) = split_line(&sink.last_line().unwrap());
        assert_eq!(env, "PROD");
        assert_eq!(tail, "INFO: x");

        log.infof(format_args!("count {}", 5));
        assert_eq!(last_tail(&sink), "INFO: count 5");
        assert_eq!(sink.write_count(), 2);
    }

    #[test]
    fn only_error_env_masks_info_and_debug() {
        let sink = MemorySink::new();
        let log = DefaultLogger::new(&sink, LoggerOptions::new("stage").only_error_in("stage"));

        log.info("skip this");
        log.infof(format_args!("skip this {}", 2));
        log.debug("skip this");
        log.debugf(format_args!("skip this {}", 2));
        assert_eq!(sink.write_count(), 0);

        log.errorf(format_args!("err {}", 2));
        let (_, env, tail) = split_line(&sink.last_line().unwrap());
        assert_eq!(env, "STAGE");
        assert_eq!(tail, "ERROR: err 2");

        log.error(&"still here");
        assert_eq!(sink.write_count(), 2);
    }

    #[test]
    fn labels_compare_case_insensitively() {
        let sink = MemorySink::new();
        let log = DefaultLogger::new(&sink, LoggerOptions::new("Prod").only_error_in("PROD"));
        assert_eq!(log.env(), "PROD");
        log.info("hidden");
        assert_eq!(sink.write_count(), 0);

        let log = DefaultLogger::new(&sink, LoggerOptions::new("STAGE").hide_debug_in("stage"));
        log.debug("hidden");
        assert_eq!(sink.write_count(), 0);
    }

    #[test]
    fn other_env_labels_do_not_suppress() {
        let sink = MemorySink::new();
        let log = DefaultLogger::new(
            &sink,
            LoggerOptions::new("dev").hide_debug_in("prod").only_error_in("stage"),
        );
        assert!(log.enabled(Level::Info));
        assert!(log.enabled(Level::Debug));

        log.debug("visible");
        assert_eq!(last_tail(&sink), "DEBUG: visible");
    }

    #[test]
    fn default_labels_suppress_nothing_in_named_env() {
        let sink = MemorySink::new();
        let log = DefaultLogger::new(&sink, LoggerOptions::new("dev"));

        log.info("a");
        log.debug("b");
        assert_eq!(sink.write_count(), 2);
    }

    #[test]
    fn empty_env_matches_empty_labels() {
        let sink = MemorySink::new();
        let log = DefaultLogger::new(&sink, LoggerOptions::default());

        log.info("a");
        log.debug("b");
        assert_eq!(sink.write_count(), 0, "écrit: {:?}", sink.writes());

        log.error(&"c");
        let (_, env, tail) = split_line(&sink.last_line().unwrap());
        assert_eq!(env, "");
        assert_eq!(tail, "ERROR: c");
    }

    #[test]
    fn empty_env_with_named_labels_writes_everything() {
        let sink = MemorySink::new();
        let log = DefaultLogger::new(
            &sink,
            LoggerOptions::new("").hide_debug_in("prod").only_error_in("stage"),
        );

        log.info("a");
        log.debug("b");
        assert_eq!(sink.write_count(), 2);
    }

    #[test]
    fn both_labels_configured_for_same_env() {
        let sink = MemorySink::new();
        let log = DefaultLogger::new(
            &sink,
            LoggerOptions::new("prod").hide_debug_in("prod").only_error_in("prod"),
        );
        assert!(!log.enabled(Level::Info));
        assert!(!log.enabled(Level::Debug));
        assert!(log.enabled(Level::Error));
        assert!(log.enabled(Level::Fatal));
    }

    #[test]
    fn error_renders_error_message() {
        let sink = MemorySink::new();
        let log = DefaultLogger::new(&sink, LoggerOptions::new("prod").hide_debug_in("prod"));

        let err = std::io::Error::new(std::io::ErrorKind::Other, "passing an error");
        log.error(&err);
        let (_, env, tail) = split_line(&sink.last_line().unwrap());
        assert_eq!(env, "PROD");
        assert_eq!(tail, "ERROR: passing an error");

        let err = anyhow::anyhow!("anyhow failure");
        log.error(&err);
        assert_eq!(last_tail(&sink), "ERROR: anyhow failure");

        log.error(&42);
        assert_eq!(last_tail(&sink), "ERROR: 42");
    }

    #[test]
    fn macros_format_messages() {
        let sink = MemorySink::new();
        let log = DefaultLogger::new(&sink, LoggerOptions::new("dev"));

        crate::infof!(log, "count {}", 5);
        assert_eq!(last_tail(&sink), "INFO: count 5");

        let n = 7;
        crate::debugf!(log, "n={n}");
        assert_eq!(last_tail(&sink), "DEBUG: n=7");

        crate::errorf!(log, "{}-{}", "a", "b");
        assert_eq!(last_tail(&sink), "ERROR: a-b");
    }

    #[test]
    fn substitutable_behind_trait_objects() {
        let sink = MemorySink::new();
        let loggers: Vec<Box<dyn Logger + '_>> = vec![
            Box::new(DefaultLogger::new(&sink, LoggerOptions::new("dev"))),
            Box::new(NoopLogger),
        ];
        for logger in &loggers {
            logger.info("hello");
            crate::infof!(logger, "n {}", 1);
        }
        assert_eq!(sink.write_count(), 2);

        let shared = Arc::new(DefaultLogger::new(&sink, LoggerOptions::new("dev")));
        let by_ref: &dyn Logger = &shared;
        by_ref.error(&"via arc");
        assert_eq!(last_tail(&sink), "ERROR: via arc");
    }

    #[test]
    fn loggers_with_different_policies_coexist() {
        let sink = MemorySink::new();
        let quiet = DefaultLogger::new(&sink, LoggerOptions::new("prod").only_error_in("prod"));
        let loud = DefaultLogger::new(&sink, LoggerOptions::new("dev").only_error_in("prod"));

        quiet.info("hidden");
        loud.info("shown");
        assert_eq!(sink.write_count(), 1);
        assert_eq!(last_tail(&sink), "INFO: shown");
    }

    #[test]
    fn write_failure_is_not_propagated() {
        struct Broken;
        impl Write for &Broken {
            fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
                Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let log = DefaultLogger::new(&Broken, LoggerOptions::new("dev"));
        log.info("dropped");
        log.error(&"dropped too");
    }

    #[test]
    fn short_write_is_not_retried() {
        struct Short {
            calls: std::sync::atomic::AtomicUsize,
        }
        impl Write for &Short {
            fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
                self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                Ok(buf.len().min(5))
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let sink = Short {
            calls: std::sync::atomic::AtomicUsize::new(0),
        };
        let log = DefaultLogger::new(&sink, LoggerOptions::new("dev"));
        log.info("une ligne bien plus longue que cinq octets");
        log.error(&"une autre");

        assert_eq!(sink.calls.load(std::sync::atomic::Ordering::SeqCst), 2);
    }

    #[test]
    fn format_line_layout() {
        let line = format_line("2024-01-01T00:00:00Z", "DEV", Level::Info, "started");
        assert_eq!(line, "2024-01-01T00:00:00Z | DEV | INFO: started\n");
    }

    #[test]
    fn timestamp_is_rfc3339_to_the_second() {
        let ts = timestamp();
        let parsed = chrono::DateTime::parse_from_rfc3339(&ts).expect("RFC3339 invalide");
        assert_eq!(parsed.timestamp_subsec_nanos(), 0);
        assert!(!ts.contains('.'), "fraction de seconde inattendue: {ts}");
    }
}
