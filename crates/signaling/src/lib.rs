//! netzsignal-signaling – Typisierte Server-zu-Client Signale
//!
//! Eine Anwendung beschreibt ein Signal einmal (Name + Argumentpruefungen)
//! und nutzt die Beschreibung auf beiden Seiten:
//!
//! ```text
//! SignalBeschreibung<T>
//!     |
//!     +-- SignalSender<T>     (Server: finden-oder-anlegen, Fan-out)
//!     |       |
//!     |       v
//!     |   Fernereignis (Transport, pro Teilnehmer eine Queue)
//!     |       |
//!     |       v
//!     +-- SignalEmpfaenger<T> (Client: Argumentpruefung, verbinden/warten)
//! ```
//!
//! Eingehende Argumente werden im Entwicklungsmodus immer geprueft und
//! Abweichungen als Fehler gemeldet. Im Produktivmodus wird nur mit
//! `strikte_pruefung` geprueft und Ungueltiges still verworfen.

pub mod argumente;
pub mod beschreibung;
pub mod empfaenger;
pub mod error;
pub mod kontext;
pub mod pruefung;
pub mod sender;
pub mod validierung;
pub mod verbindung;

// Bequeme Re-Exporte
pub use argumente::SignalArgumente;
pub use beschreibung::SignalBeschreibung;
pub use empfaenger::SignalEmpfaenger;
pub use error::{SignalFehler, SignalResult};
pub use kontext::SignalKontext;
pub use pruefung::{ArgumentValidator, Pruefung};
pub use sender::SignalSender;
pub use validierung::Argumentpruefung;
pub use verbindung::Verbindung;

/// Endpunkt mit explizitem Lebensende
///
/// Nach `zerstoeren` schlagen alle Operationen des Endpunkts fehl.
pub trait Zerstoerbar {
    fn zerstoeren(&mut self);
}
