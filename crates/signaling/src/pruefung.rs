//! Argumentpruefungen
//!
//! Eine Pruefung entscheidet fuer genau eine Argumentposition ob ein
//! eingehender Wert akzeptiert wird. Pruefungen lassen sich kombinieren
//! (`optional`, `einer_von`, `liste_von`), jede Closure
//! `Fn(&Value) -> bool` ist ebenfalls eine Pruefung.
//!
//! ```ignore
//! let pruefungen = vec![pruefung::zahl(), pruefung::optional(pruefung::text())];
//! ```

use serde_json::Value;
use std::sync::Arc;

/// Entscheidet ueber die Zulaessigkeit eines einzelnen Arguments
pub trait ArgumentValidator: Send + Sync + 'static {
    fn akzeptiert(&self, wert: &Value) -> bool;

    /// Kurzbeschreibung fuer Logausgaben
    fn beschreibung(&self) -> String {
        "benutzerdefiniert".to_string()
    }
}

impl<F> ArgumentValidator for F
where
    F: Fn(&Value) -> bool + Send + Sync + 'static,
{
    fn akzeptiert(&self, wert: &Value) -> bool {
        self(wert)
    }
}

/// Geteilte Pruefung, wie sie in einer Beschreibung abgelegt wird
pub type Pruefung = Arc<dyn ArgumentValidator>;

// ---------------------------------------------------------------------------
// Grundarten
// ---------------------------------------------------------------------------

/// Prueft die JSON-Grundart eines Werts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Typpruefung {
    Zahl,
    Ganzzahl,
    Text,
    Wahrheitswert,
    Liste,
    Objekt,
    Null,
    Beliebig,
}

impl ArgumentValidator for Typpruefung {
    fn akzeptiert(&self, wert: &Value) -> bool {
        match self {
            Typpruefung::Zahl => wert.is_number(),
            Typpruefung::Ganzzahl => wert.is_i64() || wert.is_u64(),
            Typpruefung::Text => wert.is_string(),
            Typpruefung::Wahrheitswert => wert.is_boolean(),
            Typpruefung::Liste => wert.is_array(),
            Typpruefung::Objekt => wert.is_object(),
            Typpruefung::Null => wert.is_null(),
            Typpruefung::Beliebig => true,
        }
    }

    fn beschreibung(&self) -> String {
        match self {
            Typpruefung::Zahl => "zahl",
            Typpruefung::Ganzzahl => "ganzzahl",
            Typpruefung::Text => "text",
            Typpruefung::Wahrheitswert => "wahrheitswert",
            Typpruefung::Liste => "liste",
            Typpruefung::Objekt => "objekt",
            Typpruefung::Null => "null",
            Typpruefung::Beliebig => "beliebig",
        }
        .to_string()
    }
}

// ---------------------------------------------------------------------------
// Kombinatoren
// ---------------------------------------------------------------------------

/// `null` oder ein Wert der inneren Pruefung
pub struct Optional(pub Pruefung);

impl ArgumentValidator for Optional {
    fn akzeptiert(&self, wert: &Value) -> bool {
        wert.is_null() || self.0.akzeptiert(wert)
    }

    fn beschreibung(&self) -> String {
        format!("optional<{}>", self.0.beschreibung())
    }
}

/// Vereinigung: mindestens eine Pruefung muss akzeptieren
pub struct EinerVon(pub Vec<Pruefung>);

impl ArgumentValidator for EinerVon {
    fn akzeptiert(&self, wert: &Value) -> bool {
        self.0.iter().any(|p| p.akzeptiert(wert))
    }

    fn beschreibung(&self) -> String {
        let teile: Vec<String> = self.0.iter().map(|p| p.beschreibung()).collect();
        teile.join(" | ")
    }
}

/// Liste deren Elemente alle die innere Pruefung bestehen
pub struct ListeVon(pub Pruefung);

impl ArgumentValidator for ListeVon {
    fn akzeptiert(&self, wert: &Value) -> bool {
        wert.as_array()
            .is_some_and(|elemente| elemente.iter().all(|e| self.0.akzeptiert(e)))
    }

    fn beschreibung(&self) -> String {
        format!("liste<{}>", self.0.beschreibung())
    }
}

/// Beliebige Closure mit eigener Beschreibung
pub struct Praedikat<F> {
    beschreibung: String,
    f: F,
}

impl<F> ArgumentValidator for Praedikat<F>
where
    F: Fn(&Value) -> bool + Send + Sync + 'static,
{
    fn akzeptiert(&self, wert: &Value) -> bool {
        (self.f)(wert)
    }

    fn beschreibung(&self) -> String {
        self.beschreibung.clone()
    }
}

// ---------------------------------------------------------------------------
// Konstruktoren
// ---------------------------------------------------------------------------

pub fn zahl() -> Pruefung {
    Arc::new(Typpruefung::Zahl)
}

pub fn ganzzahl() -> Pruefung {
    Arc::new(Typpruefung::Ganzzahl)
}

pub fn text() -> Pruefung {
    Arc::new(Typpruefung::Text)
}

pub fn wahrheitswert() -> Pruefung {
    Arc::new(Typpruefung::Wahrheitswert)
}

pub fn liste() -> Pruefung {
    Arc::new(Typpruefung::Liste)
}

pub fn objekt() -> Pruefung {
    Arc::new(Typpruefung::Objekt)
}

pub fn beliebig() -> Pruefung {
    Arc::new(Typpruefung::Beliebig)
}

pub fn optional(innen: Pruefung) -> Pruefung {
    Arc::new(Optional(innen))
}

pub fn einer_von(pruefungen: Vec<Pruefung>) -> Pruefung {
    Arc::new(EinerVon(pruefungen))
}

pub fn liste_von(innen: Pruefung) -> Pruefung {
    Arc::new(ListeVon(innen))
}

pub fn praedikat<F>(beschreibung: impl Into<String>, f: F) -> Pruefung
where
    F: Fn(&Value) -> bool + Send + Sync + 'static,
{
    Arc::new(Praedikat {
        beschreibung: beschreibung.into(),
        f,
    })
}
