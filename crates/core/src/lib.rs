//! netzsignal-core – Gemeinsame Typen und Laufzeitumgebung
//!
//! Dieses Crate stellt die Bausteine bereit, die Transport und Signaling
//! gemeinsam nutzen.

pub mod types;
pub mod umgebung;

// Re-Exporte fuer bequemen Zugriff
pub use types::TeilnehmerId;
pub use umgebung::{FesteUmgebung, Laufzeitumgebung, Seite};
