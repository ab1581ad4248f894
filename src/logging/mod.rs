//! Logging setup
//!
//! Installs a `tracing_subscriber` fmt subscriber. `RUST_LOG` wins over the
//! configured level.

use crate::config::LoggingSettings;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber. Returns `false` if one was already set.
pub fn init(settings: &LoggingSettings) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(settings.with_target)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        let settings = LoggingSettings {
            level: "not a [valid filter".to_string(),
            with_target: true,
        };
        init(&settings);
        assert!(!init(&settings));
    }
}
