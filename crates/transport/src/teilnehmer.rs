//! Teilnehmerverzeichnis – Wer ist gerade verbunden
//!
//! Haelt den ephemeren Zustand aller verbundenen Clients. Sender lesen
//! daraus ueber `TeilnehmerListe` die aktuelle Teilnehmerliste.

use dashmap::DashMap;
use netzsignal_core::TeilnehmerId;
use std::sync::Arc;

// ---------------------------------------------------------------------------
// TeilnehmerListe
// ---------------------------------------------------------------------------

/// Faehigkeit die aktuell verbundenen Teilnehmer aufzuzaehlen
pub trait TeilnehmerListe: Send + Sync + 'static {
    fn aktuelle_teilnehmer(&self) -> Vec<TeilnehmerId>;
}

// ---------------------------------------------------------------------------
// Teilnehmerverzeichnis
// ---------------------------------------------------------------------------

/// Verwaltet alle verbundenen Teilnehmer
///
/// Thread-safe via Arc + DashMap. Clone teilt den inneren Zustand.
#[derive(Clone, Default)]
pub struct Teilnehmerverzeichnis {
    /// ID -> Anzeigename (nur fuer Logs)
    teilnehmer: Arc<DashMap<TeilnehmerId, String>>,
}

impl Teilnehmerverzeichnis {
    pub fn neu() -> Self {
        Self::default()
    }

    /// Registriert einen Teilnehmer als verbunden und gibt seine ID zurueck
    pub fn verbunden(&self, name: impl Into<String>) -> TeilnehmerId {
        let id = TeilnehmerId::new();
        let name = name.into();
        tracing::info!(teilnehmer = %id, name = %name, "Teilnehmer verbunden");
        self.teilnehmer.insert(id, name);
        id
    }

    /// Entfernt einen Teilnehmer (Verbindung getrennt)
    pub fn getrennt(&self, id: &TeilnehmerId) {
        if let Some((_, name)) = self.teilnehmer.remove(id) {
            tracing::info!(teilnehmer = %id, name = %name, "Teilnehmer getrennt");
        }
    }

    pub fn anzahl(&self) -> usize {
        self.teilnehmer.len()
    }
}

impl TeilnehmerListe for Teilnehmerverzeichnis {
    fn aktuelle_teilnehmer(&self) -> Vec<TeilnehmerId> {
        self.teilnehmer.iter().map(|e| *e.key()).collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
