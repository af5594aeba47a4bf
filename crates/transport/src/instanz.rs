//! Instanz-Hierarchie – Bereiche und ihre benannten Kinder
//!
//! Ein `Bereich` ist ein benannter Container. Kinder werden in
//! Einfuegereihenfolge gehalten und ueber Name + Objektart gefunden.
//! `kind_abwarten` suspendiert den aufrufenden Task bis ein passendes Kind
//! eingefuegt wird.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

use crate::error::{TransportFehler, TransportResult};
use crate::fernereignis::Fernereignis;

// ---------------------------------------------------------------------------
// Objektart
// ---------------------------------------------------------------------------

/// Art eines Objekts in der Hierarchie
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjektArt {
    Bereich,
    Fernereignis,
}

impl std::fmt::Display for ObjektArt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ObjektArt::Bereich => write!(f, "Bereich"),
            ObjektArt::Fernereignis => write!(f, "Fernereignis"),
        }
    }
}

// ---------------------------------------------------------------------------
// Instanz
// ---------------------------------------------------------------------------

/// Ein Objekt in der Hierarchie
#[derive(Clone, Debug)]
pub enum Instanz {
    Bereich(Arc<Bereich>),
    Fernereignis(Arc<Fernereignis>),
}

impl Instanz {
    pub fn name(&self) -> &str {
        match self {
            Instanz::Bereich(b) => b.name(),
            Instanz::Fernereignis(e) => e.name(),
        }
    }

    pub fn art(&self) -> ObjektArt {
        match self {
            Instanz::Bereich(_) => ObjektArt::Bereich,
            Instanz::Fernereignis(_) => ObjektArt::Fernereignis,
        }
    }

    /// Prueft ob beide Instanzen dasselbe Objekt sind (Identitaet, nicht Name)
    pub fn ist_selbe(&self, andere: &Instanz) -> bool {
        match (self, andere) {
            (Instanz::Bereich(a), Instanz::Bereich(b)) => Arc::ptr_eq(a, b),
            (Instanz::Fernereignis(a), Instanz::Fernereignis(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    pub fn als_bereich(&self) -> Option<&Arc<Bereich>> {
        match self {
            Instanz::Bereich(b) => Some(b),
            Instanz::Fernereignis(_) => None,
        }
    }

    pub fn als_fernereignis(&self) -> Option<&Arc<Fernereignis>> {
        match self {
            Instanz::Fernereignis(e) => Some(e),
            Instanz::Bereich(_) => None,
        }
    }

    fn passt(&self, name: &str, art: ObjektArt) -> bool {
        self.art() == art && self.name() == name
    }
}

// ---------------------------------------------------------------------------
// Bereich
// ---------------------------------------------------------------------------

/// Benannter Container fuer Kind-Objekte
///
/// Thread-safe. Alle Aenderungen an den Kindern wecken wartende
/// `kind_abwarten`-Aufrufe.
pub struct Bereich {
    name: String,
    kinder: Mutex<Vec<Instanz>>,
    geaendert: Notify,
}

impl std::fmt::Debug for Bereich {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bereich")
            .field("name", &self.name)
            .field("kinder", &self.kinder.lock().len())
            .finish()
    }
}

impl Bereich {
    /// Erstellt einen neuen, leeren Bereich
    pub fn neu(name: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            kinder: Mutex::new(Vec::new()),
            geaendert: Notify::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Haengt ein Kind an diesen Bereich an
    pub fn kind_einfuegen(self: &Arc<Self>, kind: Instanz) {
        if let Instanz::Fernereignis(e) = &kind {
            e.eltern_setzen(Arc::downgrade(self));
        }
        tracing::trace!(bereich = %self.name, kind = %kind.name(), art = %kind.art(), "Kind eingefuegt");
        self.kinder.lock().push(kind);
        self.geaendert.notify_waiters();
    }

    /// Sucht das erste direkte Kind mit passendem Namen und passender Art
    pub fn kind_finden(&self, name: &str, art: ObjektArt) -> Option<Instanz> {
        self.kinder
            .lock()
            .iter()
            .find(|k| k.passt(name, art))
            .cloned()
    }

    /// Sucht ein passendes Kind oder fuegt das von `erstellen` gelieferte ein
    ///
    /// Suche und Einfuegen passieren unter derselben Sperre, sodass
    /// gleichzeitige Aufrufer fuer denselben Namen genau ein Objekt erhalten.
    /// Gibt `true` zurueck wenn ein neues Objekt eingefuegt wurde.
    ///
    /// `erstellen` laeuft unter der Sperre und darf diesen Bereich nicht
    /// verwenden, sonst blockiert der Aufruf dauerhaft. Liefert `erstellen`
    /// ein Objekt mit anderem Namen oder anderer Art, wird nichts eingefuegt.
    pub fn finden_oder_einfuegen<F>(
        self: &Arc<Self>,
        name: &str,
        art: ObjektArt,
        erstellen: F,
    ) -> TransportResult<(Instanz, bool)>
    where
        F: FnOnce() -> Instanz,
    {
        let (kind, neu) = {
            let mut kinder = self.kinder.lock();
            match kinder.iter().find(|k| k.passt(name, art)) {
                Some(k) => (k.clone(), false),
                None => {
                    let kind = erstellen();
                    if !kind.passt(name, art) {
                        return Err(TransportFehler::FalschesObjekt {
                            name: name.to_string(),
                            art,
                            erhalten_name: kind.name().to_string(),
                            erhalten_art: kind.art(),
                        });
                    }
                    if let Instanz::Fernereignis(e) = &kind {
                        e.eltern_setzen(Arc::downgrade(self));
                    }
                    kinder.push(kind.clone());
                    (kind, true)
                }
            }
        };

        if neu {
            self.geaendert.notify_waiters();
        }
        Ok((kind, neu))
    }

    /// Entfernt ein Kind (Identitaetsvergleich)
    ///
    /// Gibt `true` zurueck wenn das Kind gefunden wurde.
    pub fn kind_entfernen(&self, kind: &Instanz) -> bool {
        let entfernt = {
            let mut kinder = self.kinder.lock();
            let vorher = kinder.len();
            kinder.retain(|k| !k.ist_selbe(kind));
            kinder.len() != vorher
        };
        if entfernt {
            self.geaendert.notify_waiters();
        }
        entfernt
    }

    pub(crate) fn fernereignis_abhaengen(&self, ereignis: &Fernereignis) {
        let mut kinder = self.kinder.lock();
        kinder.retain(|k| match k {
            Instanz::Fernereignis(e) => !std::ptr::eq(Arc::as_ptr(e), ereignis),
            Instanz::Bereich(_) => true,
        });
    }

    /// Momentaufnahme aller direkten Kinder
    pub fn kinder(&self) -> Vec<Instanz> {
        self.kinder.lock().clone()
    }

    /// Wartet bis ein passendes direktes Kind existiert
    ///
    /// Kein Zeitlimit: kehrt erst zurueck wenn das Kind erscheint.
    pub async fn kind_abwarten(&self, name: &str, art: ObjektArt) -> Instanz {
        loop {
            let benachrichtigt = self.geaendert.notified();
            tokio::pin!(benachrichtigt);
            // Vor der Suche registrieren, sonst geht ein Einfuegen dazwischen verloren
            benachrichtigt.as_mut().enable();

            if let Some(kind) = self.kind_finden(name, art) {
                return kind;
            }

            tracing::trace!(bereich = %self.name, name = %name, art = %art, "Warte auf Kind");
            benachrichtigt.await;
        }
    }

    /// Wie `kind_abwarten`, aber mit Zeitlimit
    pub async fn kind_abwarten_mit_zeitlimit(
        &self,
        name: &str,
        art: ObjektArt,
        zeitlimit: Duration,
    ) -> TransportResult<Instanz> {
        tokio::time::timeout(zeitlimit, self.kind_abwarten(name, art))
            .await
            .map_err(|_| TransportFehler::Zeitlimit {
                name: name.to_string(),
                art,
            })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
