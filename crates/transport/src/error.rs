//! Fehlertypen fuer den Transport

use thiserror::Error;

use crate::instanz::ObjektArt;

/// Fehlertyp fuer den Transport
#[derive(Debug, Error)]
pub enum TransportFehler {
    /// Das Fernereignis wurde bereits zerstoert
    #[error("Fernereignis '{0}' wurde zerstoert")]
    Zerstoert(String),

    /// Kind ist innerhalb des Zeitlimits nicht erschienen
    #[error("Zeitlimit beim Warten auf {art} '{name}' ueberschritten")]
    Zeitlimit { name: String, art: ObjektArt },

    /// Fabrik lieferte ein Objekt mit falschem Namen oder falscher Art
    #[error("Fabrik lieferte {erhalten_art} '{erhalten_name}' statt {art} '{name}'")]
    FalschesObjekt {
        name: String,
        art: ObjektArt,
        erhalten_name: String,
        erhalten_art: ObjektArt,
    },
}

/// Result-Typ fuer den Transport
pub type TransportResult<T> = Result<T, TransportFehler>;
