// =============================================================================
// Fichier : sink.rs
// Rôle    : Sink mémoire pour les tests et l'embarquement
// =============================================================================

use std::io::{self, Write};
use std::sync::{Mutex, MutexGuard};

/// Sink qui conserve chaque écriture séparément, en mémoire.
///
/// `&MemorySink` implémente [`Write`], il peut donc être passé directement à
/// [`DefaultLogger::new`](crate::DefaultLogger::new).
#[derive(Debug, Default)]
pub struct MemorySink {
    writes: Mutex<Vec<Vec<u8>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Vec<u8>>> {
        // Un panic pendant un push ne laisse pas d'état incohérent.
        self.writes.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Nombre d'appels `write` reçus.
    pub fn write_count(&self) -> usize {
        self.lock().len()
    }

    /// Chaque écriture, décodée en UTF-8 (avec remplacement).
    pub fn writes(&self) -> Vec<String> {
        self.lock()
            .iter()
            .map(|w| String::from_utf8_lossy(w).into_owned())
            .collect()
    }

    /// Concaténation de toutes les écritures.
    pub fn contents(&self) -> String {
        self.writes().concat()
    }

    /// Dernière écriture reçue, si elle existe.
    pub fn last_line(&self) -> Option<String> {
        self.lock()
            .last()
            .map(|w| String::from_utf8_lossy(w).into_owned())
    }

    /// Vide le sink.
    pub fn clear(&self) {
        self.lock().clear();
    }
}

impl Write for &MemorySink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.lock().push(buf.to_vec());
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
