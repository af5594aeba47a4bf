//! Fehlertypen fuer Signal-Endpunkte

use netzsignal_transport::TransportFehler;
use thiserror::Error;

/// Fehlertyp fuer Signal-Sender und -Empfaenger
#[derive(Debug, Error)]
pub enum SignalFehler {
    /// Sender wurde ausserhalb des Servers erstellt
    #[error("Signal-Sender kann nur auf dem Server erstellt werden")]
    SenderAufClient,

    /// Sender-Kontext ohne Teilnehmerliste
    #[error("Signal-Sender braucht eine Teilnehmerliste im Kontext")]
    OhneTeilnehmerliste,

    /// Empfaenger wurde auf dem Server erstellt
    #[error("Signal-Empfaenger kann nicht auf dem Server erstellt werden")]
    EmpfaengerAufServer,

    /// Operation auf einem bereits zerstoerten Endpunkt
    #[error("{operation} auf zerstoertem {endpunkt} nicht moeglich")]
    Zerstoert {
        endpunkt: &'static str,
        operation: &'static str,
    },

    /// Das Transportobjekt existiert nicht mehr
    #[error("Transportobjekt fuer Signal {0} existiert nicht mehr")]
    TransportZerstoert(String),

    /// Falsche Anzahl eingehender Argumente
    #[error("Ungueltige Anzahl an Argumenten fuer Signal {signal}: erwartet={erwartet}, erhalten={erhalten}")]
    FalscheArgumentanzahl {
        signal: String,
        erwartet: usize,
        erhalten: usize,
    },

    /// Ein Argument besteht seine Pruefung nicht
    #[error("Argument {index} besteht die Typpruefung fuer Signal {signal} nicht - Wert: {wert}")]
    UngueltigesArgument {
        signal: String,
        index: usize,
        wert: serde_json::Value,
    },

    /// Gepruefte Argumente passen nicht in den Argumenttyp
    #[error("Argumente fuer Signal {signal} nicht dekodierbar: {grund}")]
    Dekodierung { signal: String, grund: String },

    /// Ausgehende Argumente nicht serialisierbar
    #[error("Argumente nicht serialisierbar: {0}")]
    Kodierung(#[from] serde_json::Error),

    /// Signal-Beschreibung verletzt ihre Invarianten
    #[error("Ungueltige Signal-Beschreibung: {0}")]
    UngueltigeBeschreibung(String),

    /// Transportobjekt ist nicht rechtzeitig erschienen
    #[error("Zeitlimit beim Warten auf Signal {signal} ueberschritten")]
    Zeitlimit { signal: String },

    /// Fehler aus dem Transport
    #[error("Transportfehler: {0}")]
    Transport(#[from] TransportFehler),

    #[error("Interner Fehler: {0}")]
    Intern(String),
}

impl SignalFehler {
    /// Erstellt einen internen Fehler
    pub fn intern(msg: impl Into<String>) -> Self {
        Self::Intern(msg.into())
    }

    /// `true` fuer Fehler aus der Pruefung eingehender Argumente
    pub fn ist_validierungsfehler(&self) -> bool {
        matches!(
            self,
            Self::FalscheArgumentanzahl { .. }
                | Self::UngueltigesArgument { .. }
                | Self::Dekodierung { .. }
        )
    }
}

/// Result-Typ fuer Signal-Endpunkte
pub type SignalResult<T> = Result<T, SignalFehler>;
