//! netzsignal-server – Bibliotheks-Root
//!
//! Simuliert einen Server mit mehreren verbundenen Clients im selben
//! Prozess und spielt alle Sendearten eines Signals durch.

pub mod config;

use anyhow::{Context, Result};
use config::ServerConfig;
use netzsignal_core::{FesteUmgebung, TeilnehmerId};
use netzsignal_signaling::{
    pruefung, SignalBeschreibung, SignalEmpfaenger, SignalKontext, SignalResult, SignalSender,
    Verbindung,
};
use netzsignal_transport::{Bereich, Instanz, ObjektArt, Teilnehmerverzeichnis};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Name des Wurzelbereichs unter dem der Signal-Bereich haengt
pub const WURZEL: &str = "Wurzel";

/// Argumente des Demo-Signals: Spielername und Punktestand
pub type Punktestand = (String, i64);

/// Beschreibung des Demo-Signals
pub fn punktestand_signal() -> SignalResult<SignalBeschreibung<Punktestand>> {
    SignalBeschreibung::neu("Punktestand", vec![pruefung::text(), pruefung::ganzzahl()])
}

/// Ergebnis eines Demo-Laufs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DemoBericht {
    pub teilnehmer: usize,
    pub runden: u32,
    /// Vom Sender an Client-Queues uebergebene Nutzlasten
    pub uebergeben: usize,
    /// Von Client-Callbacks angenommene Ereignisse
    pub empfangen: usize,
}

/// Haelt den Server-Zustand zusammen
pub struct Server {
    pub config: ServerConfig,
}

impl Server {
    /// Erstellt einen neuen Server aus der gegebenen Konfiguration
    pub fn neu(config: ServerConfig) -> Self {
        Self { config }
    }

    /// Fuehrt den Demo-Ablauf aus
    ///
    /// Reihenfolge:
    /// 1. Bereiche anlegen und Clients registrieren
    /// 2. Client-Empfaenger starten (warten auf das Transportobjekt)
    /// 3. Sender anlegen
    /// 4. Pro Runde alle Sendearten durchspielen
    /// 5. Sender zerstoeren und Verbindungen abbauen
    pub async fn starten(self) -> Result<DemoBericht> {
        let cfg = &self.config;
        tracing::info!(
            entwicklungsmodus = cfg.umgebung.entwicklungsmodus,
            bereich = %cfg.signale.bereich,
            teilnehmer = cfg.demo.teilnehmer,
            runden = cfg.demo.runden,
            "Server startet"
        );

        let beschreibung = punktestand_signal().context("Signalbeschreibung ungueltig")?;
        let verzeichnis = Teilnehmerverzeichnis::neu();

        let wurzel = Bereich::neu(WURZEL);
        let bereich = Bereich::neu(cfg.signale.bereich.clone());
        wurzel.kind_einfuegen(Instanz::Bereich(Arc::clone(&bereich)));

        let (tx, mut rx) = mpsc::unbounded_channel::<TeilnehmerId>();

        let mut ids = Vec::with_capacity(cfg.demo.teilnehmer);
        let mut client_tasks = Vec::with_capacity(cfg.demo.teilnehmer);
        for nr in 1..=cfg.demo.teilnehmer {
            let id = verzeichnis.verbunden(format!("spieler-{nr}"));
            ids.push(id);

            let kontext = SignalKontext::neu(
                FesteUmgebung::client(id).mit_entwicklungsmodus(cfg.umgebung.entwicklungsmodus),
            );

            client_tasks.push(tokio::spawn(client_starten(
                kontext,
                Arc::clone(&wurzel),
                cfg.signale.bereich.clone(),
                beschreibung.clone(),
                cfg.signale.strikte_pruefung,
                cfg.warte_zeitlimit(),
                tx.clone(),
            )));
        }
        drop(tx);

        let server_kontext = SignalKontext::server(
            FesteUmgebung::server().mit_entwicklungsmodus(cfg.umgebung.entwicklungsmodus),
            verzeichnis.clone(),
        );
        let mut sender = SignalSender::erstellen(&server_kontext, &bereich, &beschreibung)
            .context("Sender konnte nicht angelegt werden")?;

        let mut clients = Vec::with_capacity(client_tasks.len());
        for task in client_tasks {
            clients.push(task.await.context("Client-Task abgebrochen")??);
        }
        tracing::info!(
            clients = clients.len(),
            registriert = verzeichnis.anzahl(),
            "Alle Clients verbunden"
        );

        let mut uebergeben = 0;
        for runde in 1..=cfg.demo.runden {
            uebergeben += runde_senden(&sender, &ids, i64::from(runde))?;
        }

        let empfangen = zustellungen_zaehlen(&mut rx, uebergeben).await;
        if empfangen < uebergeben {
            tracing::warn!(uebergeben, empfangen, "Nicht alle Ereignisse angekommen");
        }

        sender.zerstoeren();
        for (mut empfaenger, verbindung) in clients {
            verbindung
                .beendet()
                .await
                .with_context(|| format!("Client fuer '{}' mit Fehler beendet", empfaenger.signal_name()))?;
            empfaenger.zerstoeren();
        }
        for id in &ids {
            verzeichnis.getrennt(id);
        }

        let bericht = DemoBericht {
            teilnehmer: ids.len(),
            runden: cfg.demo.runden,
            uebergeben,
            empfangen,
        };
        tracing::info!(
            uebergeben = bericht.uebergeben,
            empfangen = bericht.empfangen,
            "Demo beendet"
        );
        Ok(bericht)
    }
}

// ---------------------------------------------------------------------------
// Client-Seite
// ---------------------------------------------------------------------------

async fn client_starten(
    kontext: SignalKontext,
    wurzel: Arc<Bereich>,
    bereich_name: String,
    beschreibung: SignalBeschreibung<Punktestand>,
    strikte_pruefung: bool,
    zeitlimit: Option<Duration>,
    zustellungen: mpsc::UnboundedSender<TeilnehmerId>,
) -> Result<(SignalEmpfaenger<Punktestand>, Verbindung)> {
    let teilnehmer = kontext
        .umgebung
        .seite()
        .teilnehmer()
        .context("Client-Kontext ohne Teilnehmer")?;

    let instanz = wurzel.kind_abwarten(&bereich_name, ObjektArt::Bereich).await;
    let bereich = instanz
        .als_bereich()
        .context("Lookup lieferte keinen Bereich")?;

    let empfaenger = match zeitlimit {
        Some(limit) => {
            SignalEmpfaenger::erstellen_mit_zeitlimit(
                &kontext,
                bereich,
                &beschreibung,
                strikte_pruefung,
                limit,
            )
            .await?
        }
        None => SignalEmpfaenger::erstellen(&kontext, bereich, &beschreibung, strikte_pruefung).await?,
    };

    let verbindung = empfaenger.verbinden(move |(spieler, punkte): Punktestand| {
        tracing::info!(teilnehmer = %teilnehmer, spieler = %spieler, punkte, "Punktestand empfangen");
        let _ = zustellungen.send(teilnehmer);
    })?;

    Ok((empfaenger, verbindung))
}

// ---------------------------------------------------------------------------
// Server-Seite
// ---------------------------------------------------------------------------

/// Spielt alle Sendearten einmal durch, gibt die Zahl der Uebergaben zurueck
fn runde_senden(sender: &SignalSender<Punktestand>, ids: &[TeilnehmerId], runde: i64) -> Result<usize> {
    let mut uebergeben = sender.an_alle_senden(("alle".into(), runde))?;

    if let (Some(erster), Some(letzter)) = (ids.first(), ids.last()) {
        uebergeben += sender.an_alle_ausser_senden(&[*erster], ("andere".into(), runde * 10))?;
        // Doppelte Eintraege in der Auswahl werden nur einmal beliefert
        uebergeben += sender.an_auswahl_senden(&[*erster, *erster], ("auswahl".into(), runde * 100))?;
        if sender.an_teilnehmer_senden(letzter, ("einzeln".into(), runde * 1000))? {
            uebergeben += 1;
        }
    }

    tracing::debug!(runde, uebergeben, "Runde gesendet");
    Ok(uebergeben)
}

async fn zustellungen_zaehlen(rx: &mut mpsc::UnboundedReceiver<TeilnehmerId>, erwartet: usize) -> usize {
    let mut empfangen = 0;
    while empfangen < erwartet {
        match tokio::time::timeout(Duration::from_secs(2), rx.recv()).await {
            Ok(Some(_)) => empfangen += 1,
            Ok(None) | Err(_) => break,
        }
    }
    empfangen
}
