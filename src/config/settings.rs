//! Settings structures for fanout-search configuration

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Fallback cap used when a result limit is unset or unparseable
pub const DEFAULT_RESULT_LIMIT: usize = 3;

/// Fallback batch deadline in seconds
pub const DEFAULT_DEADLINE_SECS: f64 = 30.0;

/// Main settings structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub search: SearchSettings,
    pub backend: BackendSettings,
    pub logging: LoggingSettings,
}

impl Settings {
    /// Load settings from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse settings from a YAML document
    pub fn from_yaml(content: &str) -> Result<Self> {
        let settings: Settings = serde_yaml::from_str(content)?;
        Ok(settings)
    }

    /// Merge with process environment variables
    pub fn merge_env(&mut self) {
        self.merge_vars(std::env::vars());
    }

    /// Merge overrides from `(name, value)` pairs.
    ///
    /// Recognised names are `FANOUT_DEADLINE_SECS`, `MAXRESULTS`,
    /// `MAXDeepRESULTS`, `TAVILY_API_KEY` and `FANOUT_LOG`. Anything else is
    /// ignored.
    pub fn merge_vars<I, K, V>(&mut self, vars: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, value) in vars {
            let value = value.as_ref();
            match key.as_ref() {
                "FANOUT_DEADLINE_SECS" => {
                    if let Some(secs) = value
                        .trim()
                        .parse::<f64>()
                        .ok()
                        .filter(|secs| Duration::try_from_secs_f64(*secs).is_ok())
                    {
                        self.search.deadline_secs = secs;
                    }
                }
                name if name == LimitKey::Standard.env_var() => {
                    self.search.max_results = parse_limit(Some(value));
                }
                name if name == LimitKey::Deep.env_var() => {
                    self.search.max_deep_results = parse_limit(Some(value));
                }
                "TAVILY_API_KEY" if !value.is_empty() => {
                    self.backend.api_key = Some(value.to_string());
                }
                "FANOUT_LOG" if !value.is_empty() => {
                    self.logging.level = value.to_string();
                }
                _ => {}
            }
        }
    }

    /// Result caps for the standard and deep call patterns
    pub fn result_limits(&self) -> ResultLimits {
        ResultLimits {
            standard: self.search.max_results,
            deep: self.search.max_deep_results,
        }
    }

    /// Shared batch deadline. Values that are negative, NaN, infinite or
    /// out of `Duration` range fall back to [`DEFAULT_DEADLINE_SECS`].
    pub fn deadline(&self) -> Duration {
        Duration::try_from_secs_f64(self.search.deadline_secs)
            .unwrap_or_else(|_| Duration::from_secs_f64(DEFAULT_DEADLINE_SECS))
    }
}

/// Search orchestration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Wall-clock budget shared by every worker of a batch (seconds)
    pub deadline_secs: f64,
    /// Result cap handed to backends by single-query calls
    pub max_results: usize,
    /// Result cap handed to backends by deep (multi-query) calls
    pub max_deep_results: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            deadline_secs: DEFAULT_DEADLINE_SECS,
            max_results: DEFAULT_RESULT_LIMIT,
            max_deep_results: DEFAULT_RESULT_LIMIT,
        }
    }
}

/// Values handed through to whichever backend implementation is plugged in
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendSettings {
    /// API key for the search provider
    pub api_key: Option<String>,
    /// Recency window for the raw news variant (days)
    pub news_days: u32,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            news_days: 5,
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default filter directive when `RUST_LOG` is unset
    pub level: String,
    /// Include the event target in formatted output
    pub with_target: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            with_target: false,
        }
    }
}

/// Named result-limit keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LimitKey {
    Standard,
    Deep,
}

impl LimitKey {
    /// Environment variable the key is read from
    pub fn env_var(&self) -> &'static str {
        match self {
            Self::Standard => "MAXRESULTS",
            Self::Deep => "MAXDeepRESULTS",
        }
    }
}

/// Resolved result caps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResultLimits {
    pub standard: usize,
    pub deep: usize,
}

impl ResultLimits {
    /// Cap for a named key
    pub fn get(&self, key: LimitKey) -> usize {
        match key {
            LimitKey::Standard => self.standard,
            LimitKey::Deep => self.deep,
        }
    }
}

impl Default for ResultLimits {
    fn default() -> Self {
        Self {
            standard: DEFAULT_RESULT_LIMIT,
            deep: DEFAULT_RESULT_LIMIT,
        }
    }
}

/// Parse a raw limit value, falling back to [`DEFAULT_RESULT_LIMIT`]
pub fn parse_limit(raw: Option<&str>) -> usize {
    raw.and_then(|v| v.trim().parse().ok())
        .unwrap_or(DEFAULT_RESULT_LIMIT)
}
