// =============================================================================
// Fichier : level.rs
// Rôle    : Niveaux de log et leur jeton textuel
// =============================================================================

/// Niveau d'un appel de log.
///
/// Seuls quatre niveaux existent ; leur jeton apparaît tel quel dans la ligne
/// écrite (`INFO`, `DEBUG`, `ERROR`, `FATAL`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    Info,
    Debug,
    Error,
    Fatal,
}

impl Level {
    /// Jeton en majuscules inséré dans la ligne.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Debug => "DEBUG",
            Self::Error => "ERROR",
            Self::Fatal => "FATAL",
        }
    }

    /// `true` pour les niveaux qui ne sont jamais masqués.
    pub const fn is_error(self) -> bool {
        matches!(self, Self::Error | Self::Fatal)
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
