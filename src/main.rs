// =============================================================================
// easylog — Écrit une ligne de log depuis la ligne de commande
// =============================================================================
//
// Exemple :
//   easylog --env prod --hide-debug-in prod info "service démarré"
//
// La configuration JSON (settings.json) est lue d'abord, les options de la
// ligne de commande la complètent ensuite.
// =============================================================================

use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};

use easylog::core::diagnostics;
use easylog::core::settings::{AppSettings, OutputTarget, SettingsManager};
use easylog::{DefaultLogger, Logger};

#[derive(Parser, Debug)]
#[command(name = "easylog")]
#[command(version, about = "Écrit une ligne de log horodatée et filtrée par environnement")]
struct Cli {
    /// Fichier de configuration JSON (défaut : <config>/easylog/settings.json).
    /// Un fichier donné explicitement doit exister et être valide.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enregistre la configuration fusionnée avec les options avant d'écrire
    #[arg(long)]
    save_config: bool,

    /// Environnement courant (ex: dev, prod)
    #[arg(short, long)]
    env: Option<String>,

    /// Environnement dans lequel DEBUG est masqué
    #[arg(long)]
    hide_debug_in: Option<String>,

    /// Environnement dans lequel seuls ERROR et FATAL sont écrits
    #[arg(long)]
    only_error_in: Option<String>,

    /// Destination des lignes
    #[arg(short, long, value_enum)]
    target: Option<TargetArg>,

    /// Fichier de sortie (implique --target file)
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Diagnostics internes plus détaillés (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Niveau de la ligne
    #[arg(value_enum)]
    level: LevelArg,

    /// Message (les mots sont joints par des espaces)
    #[arg(required = true, num_args = 1..)]
    message: Vec<String>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LevelArg {
    Info,
    Debug,
    Error,
    Fatal,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum TargetArg {
    Stdout,
    Stderr,
    File,
}

impl From<TargetArg> for OutputTarget {
    fn from(value: TargetArg) -> Self {
        match value {
            TargetArg::Stdout => Self::Stdout,
            TargetArg::Stderr => Self::Stderr,
            TargetArg::File => Self::File,
        }
    }
}

/// Charge la configuration : stricte si `--config` est donné.
///
/// Avec `--save-config`, un fichier explicite encore absent est créé.
fn load_settings(cli: &Cli) -> Result<SettingsManager> {
    match &cli.config {
        Some(path) if cli.save_config && !path.exists() => {
            Ok(SettingsManager::with_defaults(path))
        }
        Some(path) => SettingsManager::open(path),
        None => Ok(SettingsManager::open_default()),
    }
}

/// Applique les options de la ligne de commande par-dessus la configuration.
fn apply_overrides(cli: &Cli, settings: &mut AppSettings) {
    if let Some(env) = &cli.env {
        settings.logger.env = env.clone();
    }
    if let Some(env) = &cli.hide_debug_in {
        settings.logger.hide_debug_in_env = env.clone();
    }
    if let Some(env) = &cli.only_error_in {
        settings.logger.only_error_in_env = env.clone();
    }
    if let Some(target) = cli.target {
        settings.output.target = target.into();
    }
    if let Some(file) = &cli.file {
        settings.output.target = OutputTarget::File;
        settings.output.file_path = file.display().to_string();
    }
}

fn emit(logger: &dyn Logger, level: LevelArg, message: &str) {
    match level {
        LevelArg::Info => logger.info(message),
        LevelArg::Debug => logger.debug(message),
        LevelArg::Error => logger.error(&message),
        LevelArg::Fatal => logger.fail(&message),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    diagnostics::init_diagnostics(diagnostics::level_from_verbosity(cli.verbose));

    let mut manager = load_settings(&cli)?;
    apply_overrides(&cli, manager.settings_mut());
    if cli.save_config {
        manager.save()?;
    }

    let AppSettings {
        logger: options,
        output,
    } = manager.settings().clone();
    let message = cli.message.join(" ");
    log::debug!("Options du logger : {options:?}");

    match output.target {
        OutputTarget::Stdout => {
            let stdout = io::stdout();
            emit(&DefaultLogger::new(&stdout, options), cli.level, &message);
        }
        OutputTarget::Stderr => {
            let stderr = io::stderr();
            emit(&DefaultLogger::new(&stderr, options), cli.level, &message);
        }
        OutputTarget::File => {
            if output.file_path.is_empty() {
                bail!("Sortie fichier sélectionnée sans chemin (--file)");
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&output.file_path)
                .with_context(|| format!("Impossible d'ouvrir {}", output.file_path))?;
            emit(&DefaultLogger::new(&file, options), cli.level, &message);
        }
    }

    Ok(())
}
