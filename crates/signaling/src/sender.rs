//! Signal-Sender – Server-seitiger Endpunkt eines Signals
//!
//! Der Sender findet das Transportobjekt seines Signals im Bereich oder legt
//! es ueber die Objektfabrik an, und verteilt Argumente an Clients.
//!
//! ## Adressierung
//! - An einen Teilnehmer: `an_teilnehmer_senden`
//! - An alle: `an_alle_senden`
//! - An eine Auswahl: `an_auswahl_senden`
//! - An alle ausser einer Liste: `an_alle_ausser_senden`
//!
//! Ausgehende Argumente werden nicht geprueft. Der Sender ist alleiniger
//! Besitzer des Transportobjekts und zerstoert es in `zerstoeren`.

use netzsignal_core::TeilnehmerId;
use netzsignal_transport::{Bereich, Fernereignis, Nutzlast, ObjektArt, TeilnehmerListe};
use std::collections::HashSet;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::argumente::SignalArgumente;
use crate::beschreibung::SignalBeschreibung;
use crate::error::{SignalFehler, SignalResult};
use crate::kontext::SignalKontext;
use crate::Zerstoerbar;

const ENDPUNKT: &str = "SignalSender";

/// Sender eines Server-zu-Client Signals mit Argumenttyp `T`
pub struct SignalSender<T> {
    name: Arc<str>,
    ereignis: Option<Arc<Fernereignis>>,
    teilnehmer: Arc<dyn TeilnehmerListe>,
    _typ: PhantomData<fn(T)>,
}

impl<T: SignalArgumente> SignalSender<T> {
    /// Erstellt einen Sender (nur auf dem Server)
    ///
    /// Existiert unter `bereich` bereits ein Transportobjekt mit dem Namen
    /// des Signals, wird es uebernommen. Suche und Anlegen laufen unter der
    /// Sperre des Bereichs, pro Name entsteht hoechstens ein Objekt.
    pub fn erstellen(
        kontext: &SignalKontext,
        bereich: &Arc<Bereich>,
        beschreibung: &SignalBeschreibung<T>,
    ) -> SignalResult<Self> {
        if !kontext.umgebung.seite().ist_server() {
            return Err(SignalFehler::SenderAufClient);
        }
        let teilnehmer = kontext
            .teilnehmer
            .as_ref()
            .map(Arc::clone)
            .ok_or(SignalFehler::OhneTeilnehmerliste)?;

        let name = beschreibung.name();
        let (instanz, neu) = bereich.finden_oder_einfuegen(name, ObjektArt::Fernereignis, || {
            kontext.fabrik.instanz_erstellen(ObjektArt::Fernereignis, name)
        })?;
        let ereignis = instanz
            .als_fernereignis()
            .cloned()
            .ok_or_else(|| SignalFehler::intern("Fabrik lieferte kein Fernereignis"))?;

        if neu {
            tracing::info!(signal = %name, bereich = %bereich.name(), "Transportobjekt angelegt");
        } else {
            tracing::debug!(signal = %name, bereich = %bereich.name(), "Bestehendes Transportobjekt uebernommen");
        }

        Ok(Self {
            name: name.into(),
            ereignis: Some(ereignis),
            teilnehmer,
            _typ: PhantomData,
        })
    }

    /// Sendet an genau einen Teilnehmer
    ///
    /// Gibt `true` zurueck wenn die Nutzlast an den Client uebergeben wurde.
    pub fn an_teilnehmer_senden(&self, teilnehmer: &TeilnehmerId, argumente: T) -> SignalResult<bool> {
        let ereignis = self.ereignis("an_teilnehmer_senden")?;
        let nutzlast = kodieren(argumente)?;
        Ok(ereignis.an_client_senden(teilnehmer, nutzlast)?)
    }

    /// Sendet an alle aktuell verbundenen Teilnehmer
    ///
    /// Gibt die Anzahl der erfolgreichen Uebergaben zurueck.
    pub fn an_alle_senden(&self, argumente: T) -> SignalResult<usize> {
        let ereignis = self.ereignis("an_alle_senden")?;
        let nutzlast = kodieren(argumente)?;
        let ziele = self.teilnehmer.aktuelle_teilnehmer();
        self.verteilen(ereignis, ziele.iter(), nutzlast)
    }

    /// Sendet nur an die angegebenen Teilnehmer
    ///
    /// Mehrfach genannte Teilnehmer bekommen das Ereignis nur einmal.
    pub fn an_auswahl_senden(&self, auswahl: &[TeilnehmerId], argumente: T) -> SignalResult<usize> {
        let ereignis = self.ereignis("an_auswahl_senden")?;
        let nutzlast = kodieren(argumente)?;
        let mut gesehen = HashSet::with_capacity(auswahl.len());
        let ziele = auswahl.iter().filter(|t| gesehen.insert(**t));
        self.verteilen(ereignis, ziele, nutzlast)
    }

    /// Sendet an alle aktuell verbundenen Teilnehmer ausser den angegebenen
    pub fn an_alle_ausser_senden(
        &self,
        ausgeschlossen: &[TeilnehmerId],
        argumente: T,
    ) -> SignalResult<usize> {
        let ereignis = self.ereignis("an_alle_ausser_senden")?;
        let nutzlast = kodieren(argumente)?;
        let ausgeschlossen: HashSet<&TeilnehmerId> = ausgeschlossen.iter().collect();
        let ziele = self.teilnehmer.aktuelle_teilnehmer();
        self.verteilen(
            ereignis,
            ziele.iter().filter(|t| !ausgeschlossen.contains(t)),
            nutzlast,
        )
    }

    fn verteilen<'a>(
        &self,
        ereignis: &Fernereignis,
        ziele: impl Iterator<Item = &'a TeilnehmerId>,
        nutzlast: Nutzlast,
    ) -> SignalResult<usize> {
        let mut gesendet = 0;
        for teilnehmer in ziele {
            if ereignis.an_client_senden(teilnehmer, Arc::clone(&nutzlast))? {
                gesendet += 1;
            }
        }
        tracing::trace!(signal = %self.name, gesendet, "Signal verteilt");
        Ok(gesendet)
    }
}

impl<T> SignalSender<T> {
    pub fn signal_name(&self) -> &str {
        &self.name
    }

    pub fn ist_zerstoert(&self) -> bool {
        self.ereignis.is_none()
    }

    /// Zerstoert das Transportobjekt
    ///
    /// Empfaenger die noch darauf verweisen erhalten danach keine Ereignisse
    /// mehr, ihre Operationen schlagen mit `TransportZerstoert` fehl.
    pub fn zerstoeren(&mut self) {
        if let Some(ereignis) = self.ereignis.take() {
            ereignis.zerstoeren();
            tracing::info!(signal = %self.name, "Signal-Sender zerstoert");
        }
    }

    fn ereignis(&self, operation: &'static str) -> SignalResult<&Fernereignis> {
        let ereignis = self.ereignis.as_deref().ok_or(SignalFehler::Zerstoert {
            endpunkt: ENDPUNKT,
            operation,
        })?;
        // Ein uebernommenes Objekt kann von einem anderen Sender zerstoert worden sein
        if ereignis.ist_zerstoert() {
            return Err(SignalFehler::TransportZerstoert(self.name.to_string()));
        }
        Ok(ereignis)
    }
}

impl<T> Zerstoerbar for SignalSender<T> {
    fn zerstoeren(&mut self) {
        SignalSender::zerstoeren(self);
    }
}

fn kodieren<T: SignalArgumente>(argumente: T) -> SignalResult<Nutzlast> {
    Ok(argumente.in_werte()?.into())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
