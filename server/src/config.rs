//! Server-Konfiguration
//!
//! Wird beim Start aus einer TOML-Datei geladen. Alle Felder haben
//! sinnvolle Standardwerte, sodass der Server ohne Konfigurationsdatei
//! lauffaehig ist.

use anyhow::bail;
use netzsignal_observability::{log_format_gueltig, log_level_gueltig};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Vollstaendige Server-Konfiguration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Laufzeitumgebung (Entwicklungs- oder Produktivmodus)
    pub umgebung: UmgebungEinstellungen,
    /// Signal-Einstellungen
    pub signale: SignalEinstellungen,
    /// Demo-Ablauf
    pub demo: DemoEinstellungen,
    /// Logging-Einstellungen
    pub logging: LoggingEinstellungen,
}

/// Laufzeitumgebung
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UmgebungEinstellungen {
    /// Im Entwicklungsmodus werden eingehende Argumente immer geprueft
    /// und Abweichungen als Fehler gemeldet
    pub entwicklungsmodus: bool,
}

/// Signal-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalEinstellungen {
    /// Name des Bereichs unter dem die Transportobjekte liegen
    pub bereich: String,
    /// Argumente auch im Produktivmodus pruefen
    pub strikte_pruefung: bool,
    /// Zeitlimit fuer das Auffinden eines Transportobjekts (leer = unbegrenzt)
    pub warte_zeitlimit_ms: Option<u64>,
}

impl Default for SignalEinstellungen {
    fn default() -> Self {
        Self {
            bereich: "Signale".into(),
            strikte_pruefung: false,
            warte_zeitlimit_ms: None,
        }
    }
}

/// Demo-Ablauf
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoEinstellungen {
    /// Anzahl simulierter Clients
    pub teilnehmer: usize,
    /// Anzahl der Senderunden
    pub runden: u32,
}

impl Default for DemoEinstellungen {
    fn default() -> Self {
        Self {
            teilnehmer: 3,
            runden: 3,
        }
    }
}

/// Logging-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingEinstellungen {
    /// Log-Level: "trace", "debug", "info", "warn", "error"
    pub level: String,
    /// Format: "json" oder "text"
    pub format: String,
}

impl Default for LoggingEinstellungen {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "text".into(),
        }
    }
}

impl LoggingEinstellungen {
    /// Prueft Level und Format gegen die bekannten Werte
    pub fn pruefen(&self) -> anyhow::Result<()> {
        if !log_level_gueltig(&self.level) {
            bail!("Unbekannter Log-Level '{}'", self.level);
        }
        if !log_format_gueltig(&self.format) {
            bail!("Unbekanntes Log-Format '{}'", self.format);
        }
        Ok(())
    }
}

impl ServerConfig {
    /// Laedt die Konfiguration aus einer TOML-Datei.
    /// Gibt die Standardkonfiguration zurueck wenn die Datei nicht existiert.
    pub fn laden(pfad: &str) -> anyhow::Result<Self> {
        match std::fs::read_to_string(pfad) {
            Ok(inhalt) => {
                let config: Self = toml::from_str(&inhalt)
                    .map_err(|e| anyhow::anyhow!("Konfigurationsfehler in '{pfad}': {e}"))?;
                config
                    .logging
                    .pruefen()
                    .map_err(|e| anyhow::anyhow!("Konfigurationsfehler in '{pfad}': {e}"))?;
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(
                    pfad = pfad,
                    "Konfigurationsdatei nicht gefunden, verwende Standardwerte"
                );
                Ok(Self::default())
            }
            Err(e) => Err(anyhow::anyhow!(
                "Konfigurationsdatei '{pfad}' nicht lesbar: {e}"
            )),
        }
    }

    /// Zeitlimit fuer Empfaenger, `None` = ohne Zeitlimit warten
    pub fn warte_zeitlimit(&self) -> Option<Duration> {
        self.signale.warte_zeitlimit_ms.map(Duration::from_millis)
    }
}
