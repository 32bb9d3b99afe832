//! Tracing subscriber setup

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Dependency targets that are only interesting when debugging.
const NOISY_TARGETS: &[&str] = &["figment", "tokio_util"];

const LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error", "off"];

/// Resolve the configured level, falling back to `info`.
///
/// Returns the level to use and, when the configured value was rejected, the
/// message to report once logging is up.
pub fn resolve_level(config: &LoggingConfig) -> (&'static str, Option<String>) {
    let requested = config.level.trim().to_ascii_lowercase();
    match LEVELS.iter().find(|level| **level == requested) {
        Some(level) => (*level, None),
        None => (
            "info",
            Some(format!(
                "Invalid logging level '{}', using 'info'",
                config.level
            )),
        ),
    }
}

/// Build the filter for a resolved level.
///
/// Above `debug`, dependency chatter is limited to warnings.
pub fn build_filter(level: &str) -> EnvFilter {
    let mut directives = vec![level.to_string()];
    if !matches!(level, "trace" | "debug") {
        directives.extend(NOISY_TARGETS.iter().map(|target| format!("{}=warn", target)));
    }
    EnvFilter::new(directives.join(","))
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured level. Calling this more
/// than once is harmless; later calls leave the first subscriber in place.
pub fn init(config: &LoggingConfig) {
    let (level, error) = resolve_level(config);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| build_filter(level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .try_init();

    if let Some(error) = error {
        tracing::error!("{}", error);
    }
}
