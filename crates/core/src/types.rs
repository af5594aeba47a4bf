//! Gemeinsame Identifikationstypen fuer netzsignal
//!
//! IDs verwenden das Newtype-Pattern um Verwechslungen zur Compilezeit
//! auszuschliessen.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Eindeutige ID eines verbundenen Teilnehmers (Client-Prozess)
///
/// Gleichheit ist reine Identitaet, andere Felder eines Teilnehmers
/// spielen fuer Auswahl- und Ausschlusslisten keine Rolle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TeilnehmerId(pub Uuid);

impl TeilnehmerId {
    /// Erstellt eine neue zufaellige TeilnehmerId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Gibt die innere UUID zurueck
    pub fn inner(&self) -> Uuid {
        self.0
    }
}

impl Default for TeilnehmerId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TeilnehmerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "teilnehmer:{}", self.0)
    }
}
