//! netzsignal-transport – In-Process Transport
//!
//! Stellt die Faehigkeiten bereit, auf denen die Signal-Endpunkte aufsetzen:
//!
//! ```text
//! Bereich (benannte Hierarchie, kind_abwarten)
//!     |
//!     +-- Fernereignis  (pro Signal ein Objekt, pro Teilnehmer eine Queue)
//!
//! ObjektFabrik          – Erstellt neue Objekte
//! Teilnehmerverzeichnis – Wer ist verbunden (TeilnehmerListe)
//! ```

pub mod error;
pub mod fabrik;
pub mod fernereignis;
pub mod instanz;
pub mod teilnehmer;

// Bequeme Re-Exporte
pub use error::{TransportFehler, TransportResult};
pub use fabrik::{ObjektFabrik, StandardFabrik};
pub use fernereignis::{Fernereignis, Nutzlast};
pub use instanz::{Bereich, Instanz, ObjektArt};
pub use teilnehmer::{TeilnehmerListe, Teilnehmerverzeichnis};
