//! Integration-Tests fuer Sender und Empfaenger (In-Process Transport)

use netzsignal_core::{FesteUmgebung, TeilnehmerId};
use netzsignal_signaling::{
    pruefung, SignalBeschreibung, SignalEmpfaenger, SignalFehler, SignalKontext, SignalSender,
    Zerstoerbar,
};
use netzsignal_transport::{Bereich, ObjektArt, Teilnehmerverzeichnis};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

const ZEITLIMIT: Duration = Duration::from_secs(2);

struct Welt {
    bereich: Arc<Bereich>,
    verzeichnis: Teilnehmerverzeichnis,
    server: SignalKontext,
}

fn welt() -> Welt {
    let verzeichnis = Teilnehmerverzeichnis::neu();
    Welt {
        bereich: Bereich::neu("Signale"),
        server: SignalKontext::server(FesteUmgebung::server(), verzeichnis.clone()),
        verzeichnis,
    }
}

impl Welt {
    /// Verbindet einen neuen Teilnehmer und liefert seinen Client-Kontext
    fn client(&self, name: &str, entwicklungsmodus: bool) -> (TeilnehmerId, SignalKontext) {
        let id = self.verzeichnis.verbunden(name);
        let kontext = SignalKontext::neu(
            FesteUmgebung::client(id).mit_entwicklungsmodus(entwicklungsmodus),
        );
        (id, kontext)
    }
}

fn score() -> SignalBeschreibung<(f64,)> {
    SignalBeschreibung::neu("Score", vec![pruefung::zahl()]).unwrap()
}

/// Beschreibung mit gleichem Namen aber anderer Argumentform
fn score_als_text() -> SignalBeschreibung<(String,)> {
    SignalBeschreibung::neu("Score", vec![pruefung::text()]).unwrap()
}

async fn naechster<T>(rx: &mut mpsc::UnboundedReceiver<T>) -> T {
    tokio::time::timeout(ZEITLIMIT, rx.recv())
        .await
        .expect("Ereignis muss rechtzeitig ankommen")
        .expect("Kanal darf nicht geschlossen sein")
}

#[tokio::test]
async fn gueltige_argumente_erreichen_callback_genau_einmal() {
    let w = welt();
    let (tid, kontext) = w.client("anna", false);
    let sender = SignalSender::erstellen(&w.server, &w.bereich, &score()).unwrap();
    let empfaenger = SignalEmpfaenger::erstellen(&kontext, &w.bereich, &score(), true)
        .await
        .unwrap();

    let (tx, mut rx) = mpsc::unbounded_channel();
    let _verbindung = empfaenger
        .verbinden(move |(wert,)| {
            let _ = tx.send(wert);
        })
        .unwrap();

    assert!(sender.an_teilnehmer_senden(&tid, (42.0,)).unwrap());
    assert_eq!(naechster(&mut rx).await, 42.0);

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(rx.try_recv().is_err(), "Genau ein Aufruf pro Ereignis");
}

#[tokio::test]
async fn warten_liefert_argumente() {
    let w = welt();
    let (tid, kontext) = w.client("anna", false);
    let sender = SignalSender::erstellen(&w.server, &w.bereich, &score()).unwrap();
    let empfaenger = SignalEmpfaenger::erstellen(&kontext, &w.bereich, &score(), false)
        .await
        .unwrap();

    let warten = tokio::spawn(async move { empfaenger.warten().await });
    tokio::task::yield_now().await;

    // Wiederholen bis der Wartende abonniert hat
    let ergebnis = loop {
        sender.an_teilnehmer_senden(&tid, (7.5,)).unwrap();
        if warten.is_finished() {
            break warten.await.unwrap();
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    };
    assert_eq!(ergebnis.unwrap(), (7.5,));
}

#[tokio::test]
async fn callbacks_in_ankunftsreihenfolge() {
    let w = welt();
    let (tid, kontext) = w.client("anna", false);
    let sender = SignalSender::erstellen(&w.server, &w.bereich, &score()).unwrap();
    let empfaenger = SignalEmpfaenger::erstellen(&kontext, &w.bereich, &score(), false)
        .await
        .unwrap();

    let (tx, mut rx) = mpsc::unbounded_channel();
    let _v = empfaenger
        .verbinden(move |(wert,)| {
            let _ = tx.send(wert);
        })
        .unwrap();

    for i in 1..=5 {
        sender.an_teilnehmer_senden(&tid, (i as f64,)).unwrap();
    }
    for i in 1..=5 {
        assert_eq!(naechster(&mut rx).await, i as f64);
    }
}

#[tokio::test]
async fn schnelle_folge_geht_nicht_verloren() {
    let w = welt();
    let (tid, kontext) = w.client("anna", false);
    let (_bert, kontext_bert) = w.client("bert", false);
    let sender = SignalSender::erstellen(&w.server, &w.bereich, &score()).unwrap();

    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut verbindungen = Vec::new();
    for k in [&kontext, &kontext_bert] {
        let empfaenger = SignalEmpfaenger::erstellen(k, &w.bereich, &score(), true)
            .await
            .unwrap();
        let tx = tx.clone();
        verbindungen.push(
            empfaenger
                .verbinden(move |(wert,)| {
                    let _ = tx.send(wert);
                })
                .unwrap(),
        );
    }

    // Ohne await dazwischen: die Callback-Tasks laufen erst danach
    let mut uebergeben = 0;
    for i in 0..100 {
        assert!(sender.an_teilnehmer_senden(&tid, (f64::from(i),)).unwrap());
        uebergeben += 1;
        uebergeben += sender.an_alle_senden((f64::from(i),)).unwrap();
    }
    assert_eq!(uebergeben, 300);

    let mut empfangen = Vec::with_capacity(uebergeben);
    for _ in 0..uebergeben {
        empfangen.push(naechster(&mut rx).await);
    }
    assert_eq!(empfangen.len(), uebergeben);
    assert!(naechster_oder_nichts(&mut rx).await.is_none());
}

#[tokio::test]
async fn mehrere_verbindungen_bekommen_jedes_ereignis() {
    let w = welt();
    let (tid, kontext) = w.client("anna", false);
    let sender = SignalSender::erstellen(&w.server, &w.bereich, &score()).unwrap();
    let empfaenger = SignalEmpfaenger::erstellen(&kontext, &w.bereich, &score(), false)
        .await
        .unwrap();

    let (tx1, mut rx1) = mpsc::unbounded_channel();
    let (tx2, mut rx2) = mpsc::unbounded_channel();
    let _v1 = empfaenger.verbinden(move |(wert,)| {
        let _ = tx1.send(wert);
    });
    let _v2 = empfaenger.verbinden(move |(wert,)| {
        let _ = tx2.send(wert);
    });

    sender.an_teilnehmer_senden(&tid, (3.0,)).unwrap();
    assert_eq!(naechster(&mut rx1).await, 3.0);
    assert_eq!(naechster(&mut rx2).await, 3.0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn callbacks_eines_empfaengers_ueberlappen_nicht() {
    use std::sync::atomic::{AtomicBool, Ordering};

    let w = welt();
    let (tid, kontext) = w.client("anna", false);
    let sender = SignalSender::erstellen(&w.server, &w.bereich, &score()).unwrap();
    let empfaenger = SignalEmpfaenger::erstellen(&kontext, &w.bereich, &score(), false)
        .await
        .unwrap();

    let aktiv = Arc::new(AtomicBool::new(false));
    let ueberlappt = Arc::new(AtomicBool::new(false));
    let (tx, mut rx) = mpsc::unbounded_channel();

    let mut verbindungen = Vec::new();
    for _ in 0..2 {
        let aktiv = Arc::clone(&aktiv);
        let ueberlappt = Arc::clone(&ueberlappt);
        let tx = tx.clone();
        verbindungen.push(
            empfaenger
                .verbinden(move |(wert,): (f64,)| {
                    if aktiv.swap(true, Ordering::SeqCst) {
                        ueberlappt.store(true, Ordering::SeqCst);
                    }
                    std::thread::sleep(Duration::from_millis(5));
                    aktiv.store(false, Ordering::SeqCst);
                    let _ = tx.send(wert);
                })
                .unwrap(),
        );
    }

    for i in 0..5 {
        sender.an_teilnehmer_senden(&tid, (f64::from(i),)).unwrap();
    }
    for _ in 0..10 {
        naechster(&mut rx).await;
    }
    assert!(!ueberlappt.load(Ordering::SeqCst));
}

#[tokio::test]
async fn produktiv_verwirft_ungueltige_argumente_still() {
    let w = welt();
    let (tid, kontext) = w.client("anna", false);
    let sender = SignalSender::erstellen(&w.server, &w.bereich, &score()).unwrap();
    let falscher_sender = SignalSender::erstellen(&w.server, &w.bereich, &score_als_text()).unwrap();
    let empfaenger = SignalEmpfaenger::erstellen(&kontext, &w.bereich, &score(), true)
        .await
        .unwrap();

    let (tx, mut rx) = mpsc::unbounded_channel();
    let verbindung = empfaenger
        .verbinden(move |(wert,)| {
            let _ = tx.send(wert);
        })
        .unwrap();

    falscher_sender
        .an_teilnehmer_senden(&tid, ("oops".to_string(),))
        .unwrap();
    sender.an_teilnehmer_senden(&tid, (1.0,)).unwrap();

    assert_eq!(naechster(&mut rx).await, 1.0, "Ungueltiges Ereignis verworfen");
    assert!(verbindung.ist_verbunden(), "Verbindung bleibt bestehen");
}

#[tokio::test]
async fn produktiv_warten_ueberspringt_ungueltiges() {
    let w = welt();
    let (tid, kontext) = w.client("anna", false);
    let sender = SignalSender::erstellen(&w.server, &w.bereich, &score()).unwrap();
    let falscher_sender = SignalSender::erstellen(&w.server, &w.bereich, &score_als_text()).unwrap();
    let empfaenger = Arc::new(
        SignalEmpfaenger::erstellen(&kontext, &w.bereich, &score(), true)
            .await
            .unwrap(),
    );

    // Kurz warten bis der Task abonniert hat
    let e = Arc::clone(&empfaenger);
    let warten = tokio::spawn(async move { e.warten().await });
    tokio::task::yield_now().await;
    tokio::time::sleep(Duration::from_millis(20)).await;

    falscher_sender
        .an_teilnehmer_senden(&tid, ("oops".to_string(),))
        .unwrap();
    sender.an_teilnehmer_senden(&tid, (9.0,)).unwrap();

    let ergebnis = tokio::time::timeout(ZEITLIMIT, warten)
        .await
        .expect("warten muss zurueckkehren")
        .unwrap();
    assert_eq!(ergebnis.unwrap(), (9.0,));
}

#[tokio::test]
async fn entwicklungsmodus_meldet_falschen_wert() {
    let w = welt();
    let (tid, kontext) = w.client("anna", true);
    let sender = SignalSender::erstellen(&w.server, &w.bereich, &score()).unwrap();
    let falscher_sender = SignalSender::erstellen(&w.server, &w.bereich, &score_als_text()).unwrap();
    // Entwicklungsmodus prueft auch ohne strikte Pruefung
    let empfaenger = SignalEmpfaenger::erstellen(&kontext, &w.bereich, &score(), false)
        .await
        .unwrap();

    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut verbindung = empfaenger
        .verbinden(move |(wert,)| {
            let _ = tx.send(wert);
        })
        .unwrap();

    sender.an_teilnehmer_senden(&tid, (42.0,)).unwrap();
    assert_eq!(naechster(&mut rx).await, 42.0);

    falscher_sender
        .an_teilnehmer_senden(&tid, ("oops".to_string(),))
        .unwrap();

    let fehler = tokio::time::timeout(ZEITLIMIT, verbindung.naechster_fehler())
        .await
        .expect("Fehler muss gemeldet werden")
        .expect("Verbindung darf nicht enden");
    let text = fehler.to_string();
    assert!(text.contains("Score"), "{text}");
    assert!(text.contains("\"oops\""), "{text}");
    assert!(matches!(
        fehler,
        SignalFehler::UngueltigesArgument { index: 0, .. }
    ));
    assert!(rx.try_recv().is_err(), "Kein Callback fuer ungueltiges Ereignis");

    // Die Verbindung lebt weiter
    assert!(verbindung.ist_verbunden());
    sender.an_teilnehmer_senden(&tid, (43.0,)).unwrap();
    assert_eq!(naechster(&mut rx).await, 43.0);
}

#[tokio::test]
async fn entwicklungsmodus_meldet_falsche_anzahl_beim_warten() {
    let w = welt();
    let (tid, kontext) = w.client("anna", true);
    let paar = SignalBeschreibung::<(f64, f64)>::neu(
        "Score",
        vec![pruefung::zahl(), pruefung::zahl()],
    )
    .unwrap();
    let sender = SignalSender::erstellen(&w.server, &w.bereich, &paar).unwrap();
    let empfaenger = Arc::new(
        SignalEmpfaenger::erstellen(&kontext, &w.bereich, &score(), false)
            .await
            .unwrap(),
    );

    let e = Arc::clone(&empfaenger);
    let warten = tokio::spawn(async move { e.warten().await });
    tokio::time::sleep(Duration::from_millis(20)).await;

    sender.an_teilnehmer_senden(&tid, (1.0, 2.0)).unwrap();

    let ergebnis = tokio::time::timeout(ZEITLIMIT, warten).await.unwrap().unwrap();
    assert!(matches!(
        ergebnis,
        Err(SignalFehler::FalscheArgumentanzahl {
            erwartet: 1,
            erhalten: 2,
            ..
        })
    ));
}

#[tokio::test]
async fn an_alle_und_an_alle_ausser() {
    let w = welt();
    let sender = SignalSender::erstellen(&w.server, &w.bereich, &score()).unwrap();

    let mut clients = Vec::new();
    for name in ["anna", "bert", "cora"] {
        let (tid, kontext) = w.client(name, false);
        let empfaenger = SignalEmpfaenger::erstellen(&kontext, &w.bereich, &score(), false)
            .await
            .unwrap();
        let (tx, rx) = mpsc::unbounded_channel();
        let verbindung = empfaenger
            .verbinden(move |(wert,)| {
                let _ = tx.send(wert);
            })
            .unwrap();
        clients.push((tid, empfaenger, verbindung, rx));
    }

    assert_eq!(sender.an_alle_senden((1.0,)).unwrap(), 3);
    for (_, _, _, rx) in clients.iter_mut() {
        assert_eq!(naechster(rx).await, 1.0);
    }

    let ausgeschlossen = clients[1].0;
    assert_eq!(sender.an_alle_ausser_senden(&[ausgeschlossen], (2.0,)).unwrap(), 2);
    // Danach an alle, damit der Ausgeschlossene sicher etwas empfaengt
    sender.an_alle_senden((3.0,)).unwrap();

    assert_eq!(naechster(&mut clients[0].3).await, 2.0);
    assert_eq!(naechster(&mut clients[2].3).await, 2.0);
    assert_eq!(
        naechster(&mut clients[1].3).await,
        3.0,
        "Ausgeschlossener Teilnehmer bekommt das Ereignis nicht"
    );
}

#[tokio::test]
async fn an_auswahl_mit_duplikaten() {
    let w = welt();
    let sender = SignalSender::erstellen(&w.server, &w.bereich, &score()).unwrap();
    let (anna, kontext_anna) = w.client("anna", false);
    let (_bert, kontext_bert) = w.client("bert", false);

    let e_anna = SignalEmpfaenger::erstellen(&kontext_anna, &w.bereich, &score(), false)
        .await
        .unwrap();
    let e_bert = SignalEmpfaenger::erstellen(&kontext_bert, &w.bereich, &score(), false)
        .await
        .unwrap();

    let (tx_a, mut rx_a) = mpsc::unbounded_channel();
    let (tx_b, mut rx_b) = mpsc::unbounded_channel();
    let _va = e_anna.verbinden(move |(wert,)| {
        let _ = tx_a.send(wert);
    });
    let _vb = e_bert.verbinden(move |(wert,)| {
        let _ = tx_b.send(wert);
    });

    assert_eq!(sender.an_auswahl_senden(&[anna, anna, anna], (5.0,)).unwrap(), 1);
    assert_eq!(naechster(&mut rx_a).await, 5.0);

    sender.an_alle_senden((6.0,)).unwrap();
    assert_eq!(naechster(&mut rx_a).await, 6.0, "Keine doppelte Zustellung");
    assert_eq!(naechster(&mut rx_b).await, 6.0, "bert war nicht ausgewaehlt");
}

#[tokio::test]
async fn empfaenger_wartet_auf_spaeteren_sender() {
    let w = welt();
    let (tid, kontext) = w.client("anna", false);

    let bereich = Arc::clone(&w.bereich);
    let erstellen = tokio::spawn(async move {
        SignalEmpfaenger::erstellen(&kontext, &bereich, &score(), false).await
    });

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(!erstellen.is_finished(), "Ohne Transportobjekt wird gewartet");

    let sender = SignalSender::erstellen(&w.server, &w.bereich, &score()).unwrap();
    let empfaenger = tokio::time::timeout(ZEITLIMIT, erstellen)
        .await
        .expect("Empfaenger muss nach dem Anlegen fertig werden")
        .unwrap()
        .unwrap();

    let (tx, mut rx) = mpsc::unbounded_channel();
    let _v = empfaenger.verbinden(move |(wert,)| {
        let _ = tx.send(wert);
    });
    sender.an_teilnehmer_senden(&tid, (11.0,)).unwrap();
    assert_eq!(naechster(&mut rx).await, 11.0);
}

#[tokio::test]
async fn sender_zerstoeren_beendet_empfang() {
    let w = welt();
    let (_tid, kontext) = w.client("anna", false);
    let mut sender = SignalSender::erstellen(&w.server, &w.bereich, &score()).unwrap();
    let empfaenger = SignalEmpfaenger::erstellen(&kontext, &w.bereich, &score(), false)
        .await
        .unwrap();
    let verbindung = empfaenger.verbinden(|_| {}).unwrap();

    Zerstoerbar::zerstoeren(&mut sender);

    assert!(w
        .bereich
        .kind_finden("Score", ObjektArt::Fernereignis)
        .is_none());
    tokio::time::timeout(ZEITLIMIT, verbindung.beendet())
        .await
        .expect("Verbindung endet mit dem Transportobjekt")
        .unwrap();
    assert!(matches!(
        empfaenger.warten().await,
        Err(SignalFehler::TransportZerstoert(_))
    ));
    assert!(sender.an_alle_senden((1.0,)).is_err());
}

#[tokio::test]
async fn empfaenger_zerstoeren_laesst_andere_unberuehrt() {
    let w = welt();
    let (tid, kontext) = w.client("anna", false);
    let sender = SignalSender::erstellen(&w.server, &w.bereich, &score()).unwrap();
    let mut erster = SignalEmpfaenger::erstellen(&kontext, &w.bereich, &score(), false)
        .await
        .unwrap();
    let zweiter = SignalEmpfaenger::erstellen(&kontext, &w.bereich, &score(), false)
        .await
        .unwrap();

    erster.zerstoeren();
    assert!(erster.verbinden(|_| {}).is_err());

    let (tx, mut rx) = mpsc::unbounded_channel();
    let _v = zweiter.verbinden(move |(wert,)| {
        let _ = tx.send(wert);
    });
    sender.an_teilnehmer_senden(&tid, (4.0,)).unwrap();
    assert_eq!(naechster(&mut rx).await, 4.0);
}

#[tokio::test]
async fn trennen_beendet_callback() {
    let w = welt();
    let (tid, kontext) = w.client("anna", false);
    let sender = SignalSender::erstellen(&w.server, &w.bereich, &score()).unwrap();
    let empfaenger = SignalEmpfaenger::erstellen(&kontext, &w.bereich, &score(), false)
        .await
        .unwrap();

    let (tx, mut rx) = mpsc::unbounded_channel();
    let verbindung = empfaenger
        .verbinden(move |(wert,)| {
            let _ = tx.send(wert);
        })
        .unwrap();
    verbindung.trennen();
    verbindung.beendet().await.unwrap();

    sender.an_teilnehmer_senden(&tid, (1.0,)).unwrap();
    // Der Sender des Kanals lebte im abgebrochenen Task
    assert!(naechster_oder_nichts(&mut rx).await.is_none());
}

async fn naechster_oder_nichts<T>(rx: &mut mpsc::UnboundedReceiver<T>) -> Option<T> {
    tokio::time::timeout(Duration::from_millis(50), rx.recv())
        .await
        .ok()
        .flatten()
}
