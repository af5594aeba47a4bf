//! netzsignal Server – Einstiegspunkt
//!
//! Laedt die Konfiguration, initialisiert das Logging und startet die Demo.

use anyhow::Result;
use netzsignal_server::{config::ServerConfig, Server};

#[tokio::main]
async fn main() -> Result<()> {
    // Konfigurationsdatei-Pfad aus Umgebungsvariable oder Standard
    let config_pfad =
        std::env::var("NETZSIGNAL_CONFIG").unwrap_or_else(|_| "netzsignal.toml".into());

    // Konfiguration laden (Standardwerte falls Datei fehlt)
    let config = ServerConfig::laden(&config_pfad)?;

    netzsignal_observability::logging_initialisieren(&config.logging.level, &config.logging.format);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %config_pfad,
        "netzsignal Server wird initialisiert"
    );

    let bericht = Server::neu(config).starten().await?;

    tracing::info!(
        teilnehmer = bericht.teilnehmer,
        runden = bericht.runden,
        empfangen = bericht.empfangen,
        "Server beendet"
    );

    Ok(())
}
