//! Structured Logging Setup via tracing-subscriber
//!
//! Konfigurierbar per Umgebungsvariable:
//! - `NS_LOG_LEVEL`: Log-Level oder Filter-Direktive, Standard: info
//! - `NS_LOG_FORMAT`: Format (text/json), Standard: text

use tracing_subscriber::{fmt, EnvFilter};

const ENV_LEVEL: &str = "NS_LOG_LEVEL";
const ENV_FORMAT: &str = "NS_LOG_FORMAT";

/// Initialisiert das Logging-System.
///
/// Umgebungsvariablen haben Vorrang vor den uebergebenen Werten.
/// Gibt `false` zurueck wenn bereits ein globaler Subscriber gesetzt war.
pub fn logging_initialisieren(level: &str, format: &str) -> bool {
    let level = log_level_aus_env(level);
    let filter = EnvFilter::try_new(&level).unwrap_or_else(|_| EnvFilter::new("info"));

    let format_env = log_format_aus_env(format);

    let ergebnis = match format_env.as_str() {
        "json" => fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(true)
            .with_current_span(true)
            .try_init(),
        _ => fmt().with_env_filter(filter).with_target(true).try_init(),
    };
    match ergebnis {
        Ok(()) => {
            if !log_format_gueltig(&format_env) {
                tracing::warn!(format = %format_env, "Unbekanntes Log-Format, verwende text");
            }
            tracing::debug!(level = %level, format = %format_env, "Logging initialisiert");
            true
        }
        Err(_) => false,
    }
}

/// Gibt den Log-Level aus der Umgebung zurueck, sonst `standard`.
pub fn log_level_aus_env(standard: &str) -> String {
    std::env::var(ENV_LEVEL).unwrap_or_else(|_| standard.to_string())
}

/// Gibt das Log-Format aus der Umgebung zurueck, sonst `standard`.
pub fn log_format_aus_env(standard: &str) -> String {
    std::env::var(ENV_FORMAT).unwrap_or_else(|_| standard.to_string())
}

/// Validiert ob ein Log-Level-String gueltig ist.
pub fn log_level_gueltig(level: &str) -> bool {
    matches!(level, "trace" | "debug" | "info" | "warn" | "error")
}

/// Validiert ob ein Log-Format-String gueltig ist.
pub fn log_format_gueltig(format: &str) -> bool {
    matches!(format, "text" | "json")
}
