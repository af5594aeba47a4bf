//! Fernereignis – Das Transportobjekt eines Signals
//!
//! Ein `Fernereignis` traegt die Nutzlasten eines benannten Signals vom
//! Server zu den Clients. Jedes Abonnement eines Teilnehmers bekommt eine
//! eigene, unbegrenzte Empfangs-Queue (tokio mpsc). Eine uebergebene
//! Nutzlast geht nicht verloren solange der Receiver lebt. Innerhalb einer
//! Queue gilt FIFO, darueber hinaus keine Garantie.

use dashmap::DashMap;
use netzsignal_core::TeilnehmerId;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use tokio::sync::mpsc;

use crate::error::{TransportFehler, TransportResult};
use crate::instanz::Bereich;

/// Argumentliste wie sie ueber den Transport geht
///
/// Fuer Fan-out wird dieselbe Liste zwischen allen Empfaengern geteilt.
pub type Nutzlast = Arc<[serde_json::Value]>;

// ---------------------------------------------------------------------------
// Fernereignis
// ---------------------------------------------------------------------------

pub struct Fernereignis {
    name: String,
    zerstoert: AtomicBool,
    /// Empfangs-Queues aller Abonnements, indiziert nach Teilnehmer
    clients: DashMap<TeilnehmerId, Vec<mpsc::UnboundedSender<Nutzlast>>>,
    eltern: Mutex<Weak<Bereich>>,
}

impl std::fmt::Debug for Fernereignis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fernereignis")
            .field("name", &self.name)
            .field("zerstoert", &self.ist_zerstoert())
            .field("clients", &self.clients.len())
            .finish()
    }
}

impl Fernereignis {
    /// Erstellt ein neues, noch nicht eingehaengtes Fernereignis
    pub fn neu(name: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            zerstoert: AtomicBool::new(false),
            clients: DashMap::new(),
            eltern: Mutex::new(Weak::new()),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ist_zerstoert(&self) -> bool {
        self.zerstoert.load(Ordering::SeqCst)
    }

    pub(crate) fn eltern_setzen(&self, eltern: Weak<Bereich>) {
        *self.eltern.lock() = eltern;
    }

    /// Abonniert die Empfangs-Queue eines Teilnehmers (Client-Seite)
    ///
    /// Jeder Aufruf liefert einen eigenen Receiver, der alle ab jetzt an
    /// diesen Teilnehmer gesendeten Nutzlasten erhaelt. Den Receiver zu
    /// droppen beendet das Abonnement.
    pub fn client_abonnieren(
        &self,
        teilnehmer: TeilnehmerId,
    ) -> TransportResult<mpsc::UnboundedReceiver<Nutzlast>> {
        if self.ist_zerstoert() {
            return Err(TransportFehler::Zerstoert(self.name.clone()));
        }

        let (tx, rx) = mpsc::unbounded_channel();
        self.clients.entry(teilnehmer).or_default().push(tx);

        // zerstoeren() koennte zwischen Pruefung und Einfuegen gelaufen sein
        if self.ist_zerstoert() {
            self.clients.remove(&teilnehmer);
            return Err(TransportFehler::Zerstoert(self.name.clone()));
        }

        tracing::trace!(ereignis = %self.name, teilnehmer = %teilnehmer, "Client abonniert");
        Ok(rx)
    }

    /// Sendet eine Nutzlast an einen einzelnen Teilnehmer
    ///
    /// Gibt `true` zurueck wenn mindestens ein Abonnement die Nutzlast
    /// angenommen hat, `false` wenn auf diesem Client niemand zuhoert.
    /// Geschlossene Abonnements werden dabei entfernt.
    pub fn an_client_senden(
        &self,
        teilnehmer: &TeilnehmerId,
        nutzlast: Nutzlast,
    ) -> TransportResult<bool> {
        if self.ist_zerstoert() {
            return Err(TransportFehler::Zerstoert(self.name.clone()));
        }

        let Some(mut abonnements) = self.clients.get_mut(teilnehmer) else {
            tracing::debug!(ereignis = %self.name, teilnehmer = %teilnehmer, "Client hat nie abonniert");
            return Ok(false);
        };

        abonnements.retain(|tx| tx.send(Arc::clone(&nutzlast)).is_ok());
        if abonnements.is_empty() {
            tracing::debug!(ereignis = %self.name, teilnehmer = %teilnehmer, "Keine Empfaenger auf Client");
            return Ok(false);
        }
        Ok(true)
    }

    /// Anzahl der Teilnehmer mit mindestens einem aktiven Receiver
    pub fn client_anzahl(&self) -> usize {
        self.clients
            .iter()
            .filter(|e| e.value().iter().any(|tx| !tx.is_closed()))
            .count()
    }

    /// Zerstoert das Fernereignis
    ///
    /// Schliesst alle Empfangs-Queues und haengt das Objekt aus seinem
    /// Bereich aus. Weitere Aufrufe sind wirkungslos.
    pub fn zerstoeren(&self) {
        if self.zerstoert.swap(true, Ordering::SeqCst) {
            return;
        }

        self.clients.clear();

        let eltern = std::mem::take(&mut *self.eltern.lock());
        if let Some(bereich) = eltern.upgrade() {
            bereich.fernereignis_abhaengen(self);
        }

        tracing::debug!(ereignis = %self.name, "Fernereignis zerstoert");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
