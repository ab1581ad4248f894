//! Configuration module for fanout-search
//!
//! Settings are built once (defaults, then an optional YAML file, then
//! environment overrides) and passed down explicitly.

mod settings;

pub use settings::*;

use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::info;

/// Environment variable pointing at a settings file
pub const SETTINGS_PATH_VAR: &str = "FANOUT_SETTINGS_PATH";

/// Load settings from `path` if given, else from `FANOUT_SETTINGS_PATH`, else
/// the first default location that exists, else defaults. Environment
/// overrides are applied last.
pub fn load(path: Option<&Path>) -> Result<Settings> {
    let candidate = path
        .map(Path::to_path_buf)
        .or_else(|| std::env::var(SETTINGS_PATH_VAR).ok().map(PathBuf::from))
        .or_else(|| default_paths().into_iter().find(|p| p.exists()));

    let mut settings = match candidate {
        Some(path) => {
            info!("Loading settings from: {}", path.display());
            Settings::from_file(&path)?
        }
        None => {
            info!("No settings file found, using defaults");
            Settings::default()
        }
    };

    settings.merge_env();
    Ok(settings)
}

fn default_paths() -> Vec<PathBuf> {
    vec![
        PathBuf::from("fanout.yml"),
        PathBuf::from("config/fanout.yml"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_explicit_path() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "backend:\n  news_days: 2").unwrap();

        let settings = load(Some(file.path())).unwrap();
        assert_eq!(settings.backend.news_days, 2);
    }

    #[test]
    fn test_load_missing_file_errors() {
        let result = load(Some(Path::new("/nonexistent/fanout.yml")));
        assert!(result.is_err());
    }
}
