//! Verbindung – Handle auf einen registrierten Callback

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::{SignalFehler, SignalResult};

/// Handle einer `verbinden`-Registrierung
///
/// Der Callback laeuft in einem eigenen tokio-Task. Das Handle zu droppen
/// trennt die Verbindung nicht, dafuer gibt es `trennen`.
#[derive(Debug)]
pub struct Verbindung {
    task: JoinHandle<()>,
    fehler_rx: mpsc::UnboundedReceiver<SignalFehler>,
}

impl Verbindung {
    pub(crate) fn neu(task: JoinHandle<()>, fehler_rx: mpsc::UnboundedReceiver<SignalFehler>) -> Self {
        Self { task, fehler_rx }
    }

    /// Trennt die Verbindung, der Callback wird nicht mehr aufgerufen
    pub fn trennen(&self) {
        self.task.abort();
    }

    pub fn ist_verbunden(&self) -> bool {
        !self.task.is_finished()
    }

    /// Wartet auf den naechsten Pruefungsfehler dieser Verbindung
    ///
    /// Nur im Entwicklungsmodus entstehen Fehler. `None` sobald die
    /// Verbindung beendet ist und alle Fehler abgeholt wurden.
    pub async fn naechster_fehler(&mut self) -> Option<SignalFehler> {
        self.fehler_rx.recv().await
    }

    /// Wartet bis die Verbindung endet
    ///
    /// `Ok(())` nach `trennen` oder wenn das Transportobjekt zerstoert wurde.
    pub async fn beendet(self) -> SignalResult<()> {
        match self.task.await {
            Ok(()) => Ok(()),
            Err(e) if e.is_cancelled() => Ok(()),
            Err(e) => Err(SignalFehler::intern(format!("Verbindungs-Task abgestuerzt: {e}"))),
        }
    }
}
