//! Argumentpruefung eingehender Signale
//!
//! Jede eingehende Argumentliste laeuft durch `Argumentpruefung::pruefen`
//! bevor ein Callback oder `warten` sie sieht.
//!
//! ## Ablauf
//! 1. Pruefmodus aus -> akzeptieren
//! 2. Anzahl != Anzahl Pruefungen -> Fehler bzw. Verwerfen
//! 3. Pruefungen links nach rechts, Abbruch beim ersten Fehlschlag
//! 4. alles bestanden -> akzeptieren
//!
//! Im Entwicklungsmodus wird jede Abweichung als Fehler gemeldet, sonst
//! wird die Nutzlast still verworfen.

use serde_json::Value;
use std::sync::Arc;

use crate::argumente::SignalArgumente;
use crate::beschreibung::SignalBeschreibung;
use crate::error::{SignalFehler, SignalResult};
use crate::pruefung::Pruefung;

/// Pruefregeln eines Empfaengers
///
/// Wird zwischen Empfaenger und seinen Verbindungs-Tasks geteilt.
#[derive(Clone)]
pub struct Argumentpruefung {
    signal: Arc<str>,
    pruefungen: Arc<[Pruefung]>,
    /// Pruefmodus: Entwicklungsmodus oder strikte Pruefung angefordert
    pruefen: bool,
    entwicklungsmodus: bool,
}

impl Argumentpruefung {
    /// Leitet die Pruefregeln ab
    ///
    /// Im Entwicklungsmodus wird immer geprueft, `strikte_pruefung` kann den
    /// Pruefmodus nur einschalten, nie ausschalten.
    pub fn neu<T>(
        beschreibung: &SignalBeschreibung<T>,
        entwicklungsmodus: bool,
        strikte_pruefung: bool,
    ) -> Self {
        Self {
            signal: beschreibung.name().into(),
            pruefungen: beschreibung.pruefungen().into(),
            pruefen: entwicklungsmodus || strikte_pruefung,
            entwicklungsmodus,
        }
    }

    pub fn signal(&self) -> &str {
        &self.signal
    }

    pub fn ist_aktiv(&self) -> bool {
        self.pruefen
    }

    /// Prueft eine rohe Argumentliste
    ///
    /// `Ok(true)` = akzeptiert, `Ok(false)` = still verworfen,
    /// `Err` nur im Entwicklungsmodus.
    pub fn pruefen(&self, roh: &[Value]) -> SignalResult<bool> {
        if !self.pruefen {
            return Ok(true);
        }

        if roh.len() != self.pruefungen.len() {
            return self.ablehnen(SignalFehler::FalscheArgumentanzahl {
                signal: self.signal.to_string(),
                erwartet: self.pruefungen.len(),
                erhalten: roh.len(),
            });
        }

        for (index, (wert, pruefung)) in roh.iter().zip(self.pruefungen.iter()).enumerate() {
            if !pruefung.akzeptiert(wert) {
                tracing::trace!(
                    signal = %self.signal,
                    index,
                    erwartet = %pruefung.beschreibung(),
                    "Pruefung fehlgeschlagen"
                );
                return self.ablehnen(SignalFehler::UngueltigesArgument {
                    signal: self.signal.to_string(),
                    index,
                    wert: wert.clone(),
                });
            }
        }

        Ok(true)
    }

    /// Prueft und dekodiert eine Argumentliste
    ///
    /// `Ok(None)` wenn die Nutzlast verworfen wurde.
    pub fn annehmen<T: SignalArgumente>(&self, roh: &[Value]) -> SignalResult<Option<T>> {
        if !self.pruefen(roh)? {
            return Ok(None);
        }

        match T::aus_werten(roh) {
            Ok(argumente) => Ok(Some(argumente)),
            Err(grund) => {
                let fehler = SignalFehler::Dekodierung {
                    signal: self.signal.to_string(),
                    grund,
                };
                self.ablehnen(fehler).map(|_| None)
            }
        }
    }

    fn ablehnen(&self, fehler: SignalFehler) -> SignalResult<bool> {
        if self.entwicklungsmodus {
            tracing::error!(signal = %self.signal, fehler = %fehler, "Ungueltige Argumente empfangen");
            return Err(fehler);
        }

        tracing::debug!(signal = %self.signal, fehler = %fehler, "Ungueltige Argumente verworfen");
        Ok(false)
    }
}
