//! Signal-Beschreibung – Name und Argumentpruefungen eines Signals
//!
//! Eine Beschreibung wird einmal definiert und von genau einem Sender und
//! beliebig vielen Empfaengern geteilt. Beim Auffinden des Transportobjekts
//! zaehlt nur der Name; dass Sender und Empfaenger dieselbe Argumentform
//! erwarten, liegt beim Autor und wird nur empfangsseitig geprueft.

use std::marker::PhantomData;
use std::sync::Arc;

use crate::argumente::SignalArgumente;
use crate::error::{SignalFehler, SignalResult};
use crate::pruefung::Pruefung;

/// Unveraenderliche Beschreibung eines Signals mit Argumenttyp `T`
pub struct SignalBeschreibung<T> {
    name: Arc<str>,
    pruefungen: Arc<[Pruefung]>,
    _typ: PhantomData<fn() -> T>,
}

impl<T> Clone for SignalBeschreibung<T> {
    fn clone(&self) -> Self {
        Self {
            name: Arc::clone(&self.name),
            pruefungen: Arc::clone(&self.pruefungen),
            _typ: PhantomData,
        }
    }
}

impl<T> std::fmt::Debug for SignalBeschreibung<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let pruefungen: Vec<String> = self.pruefungen.iter().map(|p| p.beschreibung()).collect();
        f.debug_struct("SignalBeschreibung")
            .field("name", &self.name)
            .field("pruefungen", &pruefungen)
            .finish()
    }
}

impl<T: SignalArgumente> SignalBeschreibung<T> {
    /// Erstellt eine Beschreibung
    ///
    /// Pro Argument von `T` muss genau eine Pruefung angegeben werden,
    /// der Name darf nicht leer sein.
    pub fn neu(name: impl Into<String>, pruefungen: Vec<Pruefung>) -> SignalResult<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(SignalFehler::UngueltigeBeschreibung(
                "Signalname darf nicht leer sein".into(),
            ));
        }
        if pruefungen.len() != T::ANZAHL {
            return Err(SignalFehler::UngueltigeBeschreibung(format!(
                "Signal {name}: {} Pruefungen fuer {} Argumente",
                pruefungen.len(),
                T::ANZAHL
            )));
        }

        Ok(Self {
            name: name.into(),
            pruefungen: pruefungen.into(),
            _typ: PhantomData,
        })
    }
}

impl<T> SignalBeschreibung<T> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pruefungen(&self) -> &[Pruefung] {
        &self.pruefungen
    }

    /// Anzahl der Argumente
    pub fn anzahl(&self) -> usize {
        self.pruefungen.len()
    }
}
