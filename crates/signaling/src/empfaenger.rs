//! Signal-Empfaenger – Client-seitiger Endpunkt eines Signals
//!
//! Der Empfaenger findet das Transportobjekt seines Signals im Bereich
//! (wartet notfalls bis der Server es angelegt hat) und liefert gepruefte
//! Argumente an Callbacks (`verbinden`) oder an einen einzelnen Wartenden
//! (`warten`).
//!
//! Der Empfaenger haelt nur eine schwache Referenz auf das Transportobjekt.
//! Dessen Lebenszyklus gehoert dem Sender.

use netzsignal_core::{Seite, TeilnehmerId};
use netzsignal_transport::{Bereich, Fernereignis, Instanz, Nutzlast, ObjektArt, TransportFehler};
use parking_lot::Mutex;
use std::marker::PhantomData;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::mpsc;

use crate::argumente::SignalArgumente;
use crate::beschreibung::SignalBeschreibung;
use crate::error::{SignalFehler, SignalResult};
use crate::kontext::SignalKontext;
use crate::validierung::Argumentpruefung;
use crate::verbindung::Verbindung;
use crate::Zerstoerbar;

const ENDPUNKT: &str = "SignalEmpfaenger";

/// Empfaenger eines Server-zu-Client Signals mit Argumenttyp `T`
pub struct SignalEmpfaenger<T> {
    pruefung: Argumentpruefung,
    teilnehmer: TeilnehmerId,
    ereignis: Option<Weak<Fernereignis>>,
    /// Callbacks aller Verbindungen dieses Empfaengers laufen nacheinander
    callback_sperre: Arc<Mutex<()>>,
    _typ: PhantomData<fn() -> T>,
}

impl<T: SignalArgumente> SignalEmpfaenger<T> {
    /// Erstellt einen Empfaenger
    ///
    /// Wartet ohne Zeitlimit bis das Transportobjekt `beschreibung.name()`
    /// direkt unter `bereich` existiert. Mit `strikte_pruefung` werden
    /// eingehende Argumente auch ausserhalb des Entwicklungsmodus geprueft.
    pub async fn erstellen(
        kontext: &SignalKontext,
        bereich: &Bereich,
        beschreibung: &SignalBeschreibung<T>,
        strikte_pruefung: bool,
    ) -> SignalResult<Self> {
        let teilnehmer = lokaler_teilnehmer(kontext)?;
        let instanz = bereich
            .kind_abwarten(beschreibung.name(), ObjektArt::Fernereignis)
            .await;
        Self::aus_instanz(kontext, teilnehmer, &instanz, beschreibung, strikte_pruefung)
    }

    /// Wie `erstellen`, aber mit Zeitlimit fuer das Auffinden
    pub async fn erstellen_mit_zeitlimit(
        kontext: &SignalKontext,
        bereich: &Bereich,
        beschreibung: &SignalBeschreibung<T>,
        strikte_pruefung: bool,
        zeitlimit: Duration,
    ) -> SignalResult<Self> {
        let teilnehmer = lokaler_teilnehmer(kontext)?;
        let instanz = bereich
            .kind_abwarten_mit_zeitlimit(beschreibung.name(), ObjektArt::Fernereignis, zeitlimit)
            .await
            .map_err(|e| match e {
                TransportFehler::Zeitlimit { .. } => SignalFehler::Zeitlimit {
                    signal: beschreibung.name().to_string(),
                },
                andere => andere.into(),
            })?;
        Self::aus_instanz(kontext, teilnehmer, &instanz, beschreibung, strikte_pruefung)
    }

    fn aus_instanz(
        kontext: &SignalKontext,
        teilnehmer: TeilnehmerId,
        instanz: &Instanz,
        beschreibung: &SignalBeschreibung<T>,
        strikte_pruefung: bool,
    ) -> SignalResult<Self> {
        let ereignis = instanz
            .als_fernereignis()
            .ok_or_else(|| SignalFehler::intern("Lookup lieferte kein Fernereignis"))?;

        let pruefung = Argumentpruefung::neu(
            beschreibung,
            kontext.umgebung.ist_entwicklungsmodus(),
            strikte_pruefung,
        );

        tracing::debug!(
            signal = %beschreibung.name(),
            teilnehmer = %teilnehmer,
            pruefen = pruefung.ist_aktiv(),
            "Signal-Empfaenger erstellt"
        );

        Ok(Self {
            pruefung,
            teilnehmer,
            ereignis: Some(Arc::downgrade(ereignis)),
            callback_sperre: Arc::new(Mutex::new(())),
            _typ: PhantomData,
        })
    }

    /// Registriert einen Callback fuer jedes akzeptierte Ereignis
    ///
    /// Der Callback laeuft in einem eigenen tokio-Task, Ereignisse kommen in
    /// Ankunftsreihenfolge. Muss innerhalb einer tokio-Runtime aufgerufen
    /// werden.
    ///
    /// Im Entwicklungsmodus wird fuer ein ungueltiges Ereignis der Callback
    /// nicht aufgerufen, der Fehler geloggt und ueber
    /// `Verbindung::naechster_fehler` gemeldet. Die Verbindung bleibt
    /// bestehen und liefert spaetere gueltige Ereignisse weiter.
    pub fn verbinden<F>(&self, callback: F) -> SignalResult<Verbindung>
    where
        F: FnMut(T) + Send + 'static,
    {
        let rx = self.abonnieren("verbinden")?;
        let pruefung = self.pruefung.clone();
        let teilnehmer = self.teilnehmer;

        tracing::debug!(signal = %pruefung.signal(), teilnehmer = %teilnehmer, "Callback verbunden");

        let sperre = Arc::clone(&self.callback_sperre);
        let (fehler_tx, fehler_rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(callback_schleife(
            rx, pruefung, teilnehmer, sperre, fehler_tx, callback,
        ));

        Ok(Verbindung::neu(task, fehler_rx))
    }

    /// Wartet auf das naechste akzeptierte Ereignis
    ///
    /// Verworfene Ereignisse werden uebersprungen. Im Entwicklungsmodus
    /// beendet ein ungueltiges Ereignis das Warten mit einem Fehler.
    pub async fn warten(&self) -> SignalResult<T> {
        let mut rx = self.abonnieren("warten")?;

        loop {
            let Some(nutzlast) = rx.recv().await else {
                return Err(self.transport_zerstoert());
            };
            if let Some(argumente) = self.pruefung.annehmen::<T>(&nutzlast)? {
                return Ok(argumente);
            }
        }
    }
}

impl<T> SignalEmpfaenger<T> {
    pub fn signal_name(&self) -> &str {
        self.pruefung.signal()
    }

    pub fn ist_zerstoert(&self) -> bool {
        self.ereignis.is_none()
    }

    /// Vergisst die Referenz auf das Transportobjekt
    ///
    /// Das Objekt selbst bleibt bestehen, andere Empfaenger und der Sender
    /// nutzen es weiter.
    pub fn zerstoeren(&mut self) {
        if self.ereignis.take().is_some() {
            tracing::debug!(signal = %self.pruefung.signal(), "Signal-Empfaenger zerstoert");
        }
    }

    fn abonnieren(
        &self,
        operation: &'static str,
    ) -> SignalResult<mpsc::UnboundedReceiver<Nutzlast>> {
        let schwach = self.ereignis.as_ref().ok_or(SignalFehler::Zerstoert {
            endpunkt: ENDPUNKT,
            operation,
        })?;

        let ereignis = schwach.upgrade().ok_or_else(|| self.transport_zerstoert())?;
        ereignis
            .client_abonnieren(self.teilnehmer)
            .map_err(|_| self.transport_zerstoert())
    }

    fn transport_zerstoert(&self) -> SignalFehler {
        SignalFehler::TransportZerstoert(self.pruefung.signal().to_string())
    }
}

impl<T> Zerstoerbar for SignalEmpfaenger<T> {
    fn zerstoeren(&mut self) {
        SignalEmpfaenger::zerstoeren(self);
    }
}

fn lokaler_teilnehmer(kontext: &SignalKontext) -> SignalResult<TeilnehmerId> {
    match kontext.umgebung.seite() {
        Seite::Client(teilnehmer) => Ok(teilnehmer),
        Seite::Server => Err(SignalFehler::EmpfaengerAufServer),
    }
}

/// Liest die Queue einer Verbindung bis sie geschlossen wird
///
/// Pruefungsfehler brechen nur die Zustellung des betroffenen Ereignisses
/// ab und gehen an `fehler_tx`.
async fn callback_schleife<T, F>(
    mut rx: mpsc::UnboundedReceiver<Nutzlast>,
    pruefung: Argumentpruefung,
    teilnehmer: TeilnehmerId,
    sperre: Arc<Mutex<()>>,
    fehler_tx: mpsc::UnboundedSender<SignalFehler>,
    mut callback: F,
) where
    T: SignalArgumente,
    F: FnMut(T) + Send + 'static,
{
    while let Some(nutzlast) = rx.recv().await {
        match pruefung.annehmen::<T>(&nutzlast) {
            Ok(Some(argumente)) => {
                let _sperre = sperre.lock();
                callback(argumente);
            }
            Ok(None) => {}
            Err(fehler) => {
                // Fehlschlag nur wenn das Handle bereits gedroppt wurde
                let _ = fehler_tx.send(fehler);
            }
        }
    }
    tracing::debug!(
        signal = %pruefung.signal(),
        teilnehmer = %teilnehmer,
        "Transportobjekt geschlossen, Verbindung endet"
    );
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
