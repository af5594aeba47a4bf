//! Signal-Kontext – Gebuendelte Faehigkeiten fuer Endpunkte
//!
//! Endpunkte lesen keinen globalen Zustand. Umgebung, Teilnehmerliste und
//! Objektfabrik werden ueber den Kontext injiziert. Clone teilt alles.

use netzsignal_core::Laufzeitumgebung;
use netzsignal_transport::{ObjektFabrik, StandardFabrik, TeilnehmerListe};
use std::sync::Arc;

#[derive(Clone)]
pub struct SignalKontext {
    pub umgebung: Arc<dyn Laufzeitumgebung>,
    /// Nur fuer Sender noetig, `SignalSender::erstellen` schlaegt ohne fehl
    pub teilnehmer: Option<Arc<dyn TeilnehmerListe>>,
    pub fabrik: Arc<dyn ObjektFabrik>,
}

impl SignalKontext {
    /// Kontext ohne Teilnehmerliste mit Standardfabrik (reicht fuer Clients)
    pub fn neu(umgebung: impl Laufzeitumgebung) -> Self {
        Self {
            umgebung: Arc::new(umgebung),
            teilnehmer: None,
            fabrik: Arc::new(StandardFabrik),
        }
    }

    /// Kontext fuer Sender: Umgebung plus die Liste der verbundenen Teilnehmer
    pub fn server(umgebung: impl Laufzeitumgebung, teilnehmer: impl TeilnehmerListe) -> Self {
        Self::neu(umgebung).mit_teilnehmerliste(teilnehmer)
    }

    pub fn mit_teilnehmerliste(mut self, teilnehmer: impl TeilnehmerListe) -> Self {
        self.teilnehmer = Some(Arc::new(teilnehmer));
        self
    }

    pub fn mit_fabrik(mut self, fabrik: impl ObjektFabrik) -> Self {
        self.fabrik = Arc::new(fabrik);
        self
    }
}
