//! Laufzeitumgebung – Ausfuehrungsseite und Entwicklungsmodus
//!
//! Statt globalen Prozesszustand abzufragen bekommen alle Endpunkte eine
//! `Laufzeitumgebung` injiziert. In Tests wird eine `FesteUmgebung` mit
//! beliebigen Werten verwendet.

use crate::types::TeilnehmerId;

/// Auf welcher Seite der Verbindung der aktuelle Prozess laeuft
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Seite {
    /// Der autoritative Server
    Server,
    /// Ein entfernter Client, identifiziert durch seinen Teilnehmer
    Client(TeilnehmerId),
}

impl Seite {
    pub fn ist_server(&self) -> bool {
        matches!(self, Seite::Server)
    }

    /// Gibt die lokale TeilnehmerId zurueck (nur auf Clients)
    pub fn teilnehmer(&self) -> Option<TeilnehmerId> {
        match self {
            Seite::Server => None,
            Seite::Client(id) => Some(*id),
        }
    }
}

impl std::fmt::Display for Seite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Seite::Server => write!(f, "server"),
            Seite::Client(id) => write!(f, "client({id})"),
        }
    }
}

/// Faehigkeit die Ausfuehrungsumgebung abzufragen
pub trait Laufzeitumgebung: Send + Sync + 'static {
    /// `true` in der interaktiven Entwicklungsumgebung
    ///
    /// Dort werden eingehende Argumente immer geprueft und Fehler hart gemeldet.
    fn ist_entwicklungsmodus(&self) -> bool;

    /// Die Seite auf der dieser Prozess laeuft
    fn seite(&self) -> Seite;
}

/// Laufzeitumgebung mit festen Werten
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FesteUmgebung {
    entwicklungsmodus: bool,
    seite: Seite,
}

impl FesteUmgebung {
    /// Server-Umgebung im Produktivmodus
    pub fn server() -> Self {
        Self {
            entwicklungsmodus: false,
            seite: Seite::Server,
        }
    }

    /// Client-Umgebung im Produktivmodus
    pub fn client(teilnehmer: TeilnehmerId) -> Self {
        Self {
            entwicklungsmodus: false,
            seite: Seite::Client(teilnehmer),
        }
    }

    pub fn mit_entwicklungsmodus(mut self, entwicklungsmodus: bool) -> Self {
        self.entwicklungsmodus = entwicklungsmodus;
        self
    }
}

impl Laufzeitumgebung for FesteUmgebung {
    fn ist_entwicklungsmodus(&self) -> bool {
        self.entwicklungsmodus
    }

    fn seite(&self) -> Seite {
        self.seite
    }
}
