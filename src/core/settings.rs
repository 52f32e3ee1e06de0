// =============================================================================
// Fichier : settings.rs
// Rôle    : Configuration persistante (JSON) de la ligne de commande
//
// Le logger lui-même ne lit aucun fichier : ce module ne sert qu'à construire
// ses `LoggerOptions` et à choisir la sortie pour le binaire `easylog`.
// =============================================================================

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::logger::LoggerOptions;

// =============================================================================
// Structures de configuration
// =============================================================================

/// Configuration complète.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub logger: LoggerOptions,
    pub output: OutputSettings,
}

/// Destination des lignes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputTarget {
    #[default]
    Stdout,
    Stderr,
    File,
}

/// Paramètres de sortie.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    pub target: OutputTarget,
    /// Utilisé uniquement quand `target` vaut `file` ; ouvert en ajout.
    pub file_path: String,
}

// =============================================================================
// Gestionnaire de configuration
// =============================================================================

/// Configuration chargée, associée au fichier dont elle provient.
///
/// Deux modes de chargement :
///   - fichier demandé explicitement ([`SettingsManager::open`]) : toute erreur
///     est remontée, une configuration cassée ne doit pas être ignorée ;
///   - fichier par défaut ([`SettingsManager::open_default`]) : absent, on part
///     des valeurs par défaut ; illisible, on avertit puis on fait de même.
#[derive(Debug, Clone)]
pub struct SettingsManager {
    settings: AppSettings,
    config_path: PathBuf,
}

impl SettingsManager {
    /// Valeurs par défaut, rattachées à `path` (rien n'est lu).
    pub fn with_defaults(path: impl Into<PathBuf>) -> Self {
        Self {
            settings: AppSettings::default(),
            config_path: path.into(),
        }
    }

    /// Charge un fichier demandé explicitement ; absent ou invalide = erreur.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let config_path = path.into();
        let settings = Self::read(&config_path)?;
        Ok(Self {
            settings,
            config_path,
        })
    }

    /// Charge le fichier par défaut, en retombant sur les valeurs par défaut.
    pub fn open_default() -> Self {
        Self::open_lenient(Self::default_config_path())
    }

    fn open_lenient(config_path: PathBuf) -> Self {
        if !config_path.exists() {
            log::debug!(
                "Aucune configuration dans {}, valeurs par défaut",
                config_path.display()
            );
            return Self::with_defaults(config_path);
        }
        match Self::read(&config_path) {
            Ok(settings) => Self {
                settings,
                config_path,
            },
            Err(e) => {
                log::warn!("Configuration ignorée, valeurs par défaut utilisées: {e:#}");
                Self::with_defaults(config_path)
            }
        }
    }

    /// Chemin par défaut : `<config>/easylog/settings.json`.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("easylog")
            .join("settings.json")
    }

    fn read(path: &Path) -> Result<AppSettings> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Impossible de lire {}", path.display()))?;
        let settings = serde_json::from_str(&content)
            .with_context(|| format!("Format JSON invalide dans {}", path.display()))?;
        log::info!("Configuration chargée depuis {}", path.display());
        Ok(settings)
    }

    /// Enregistre la configuration (fichier temporaire puis renommage).
    pub fn save(&self) -> Result<()> {
        let path = &self.config_path;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Impossible de créer {}", parent.display()))?;
        }
        let mut json =
            serde_json::to_string_pretty(&self.settings).context("Erreur de sérialisation JSON")?;
        json.push('\n');

        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json)
            .with_context(|| format!("Impossible d'écrire {}", tmp.display()))?;
        fs::rename(&tmp, path)
            .with_context(|| format!("Impossible de remplacer {}", path.display()))?;
        log::info!("Configuration enregistrée dans {}", path.display());
        Ok(())
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub const fn settings(&self) -> &AppSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut AppSettings {
        &mut self.settings
    }
}
