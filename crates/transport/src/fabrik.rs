//! Objektfabrik – Erstellt neue Objekte fuer die Hierarchie

use crate::fernereignis::Fernereignis;
use crate::instanz::{Bereich, Instanz, ObjektArt};

/// Erstellt neue, noch nicht eingehaengte Objekte einer Art
pub trait ObjektFabrik: Send + Sync + 'static {
    fn instanz_erstellen(&self, art: ObjektArt, name: &str) -> Instanz;
}

/// Fabrik fuer die In-Process-Objekte dieses Crates
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardFabrik;

impl ObjektFabrik for StandardFabrik {
    fn instanz_erstellen(&self, art: ObjektArt, name: &str) -> Instanz {
        match art {
            ObjektArt::Bereich => Instanz::Bereich(Bereich::neu(name)),
            ObjektArt::Fernereignis => Instanz::Fernereignis(Fernereignis::neu(name)),
        }
    }
}
