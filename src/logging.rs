/// Logging setup shared by the editor and viewer binaries

use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Map a `LOG_LEVEL` value to a tracing level (info when unset or unknown)
pub fn level_from_env(value: Option<&str>) -> Level {
    match value.map(|v| v.to_lowercase()).as_deref() {
        Some("trace") => Level::TRACE,
        Some("debug") => Level::DEBUG,
        Some("warn") => Level::WARN,
        Some("error") => Level::ERROR,
        _ => Level::INFO,
    }
}

/// Install the global subscriber
///
/// Safe to call more than once; later calls are ignored.
pub fn init() {
    let level = level_from_env(std::env::var("LOG_LEVEL").ok().as_deref());

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        tracing::debug!("Logging already initialized");
    }
}
