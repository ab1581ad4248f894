//! Named backend variants and the request profile each one implies

use crate::config::{BackendSettings, LimitKey};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Search topic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Topic {
    General,
    News,
}

/// How much effort the provider spends per query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchDepth {
    Basic,
    Advanced,
}

/// Backend variants selectable by callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendVariant {
    /// Plain web search
    Standard,
    /// Advanced-depth web search including raw page content
    Deep,
    /// News search
    News,
    /// Advanced-depth news search limited to a recency window
    RawNews,
}

impl BackendVariant {
    pub const ALL: [BackendVariant; 4] = [
        BackendVariant::Standard,
        BackendVariant::Deep,
        BackendVariant::News,
        BackendVariant::RawNews,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Deep => "deep",
            Self::News => "news",
            Self::RawNews => "raw_news",
        }
    }

    /// Result-limit key this variant reads its cap from
    pub fn limit_key(&self) -> LimitKey {
        match self {
            Self::Standard | Self::News => LimitKey::Standard,
            Self::Deep | Self::RawNews => LimitKey::Deep,
        }
    }

    /// Request profile for this variant
    pub fn profile(&self, settings: &BackendSettings) -> BackendProfile {
        let base = BackendProfile {
            variant: *self,
            topic: Topic::General,
            depth: SearchDepth::Basic,
            include_answer: true,
            include_images: false,
            include_raw_content: false,
            limit_key: self.limit_key(),
            days: None,
            api_key: settings.api_key.clone(),
        };

        match self {
            Self::Standard => base,
            Self::Deep => BackendProfile {
                depth: SearchDepth::Advanced,
                include_raw_content: true,
                ..base
            },
            Self::News => BackendProfile {
                topic: Topic::News,
                ..base
            },
            Self::RawNews => BackendProfile {
                topic: Topic::News,
                depth: SearchDepth::Advanced,
                days: Some(settings.news_days),
                ..base
            },
        }
    }
}

impl fmt::Display for BackendVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provider parameters a backend implementation applies for a variant
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendProfile {
    pub variant: BackendVariant,
    pub topic: Topic,
    pub depth: SearchDepth,
    pub include_answer: bool,
    pub include_images: bool,
    pub include_raw_content: bool,
    pub limit_key: LimitKey,
    /// Recency window in days
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days: Option<u32>,
    /// Provider credential; never serialized or printed
    #[serde(skip)]
    pub api_key: Option<String>,
}

impl fmt::Debug for BackendProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendProfile")
            .field("variant", &self.variant)
            .field("topic", &self.topic)
            .field("depth", &self.depth)
            .field("include_answer", &self.include_answer)
            .field("include_images", &self.include_images)
            .field("include_raw_content", &self.include_raw_content)
            .field("limit_key", &self.limit_key)
            .field("days", &self.days)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_keys() {
        assert_eq!(BackendVariant::Standard.limit_key(), LimitKey::Standard);
        assert_eq!(BackendVariant::News.limit_key(), LimitKey::Standard);
        assert_eq!(BackendVariant::Deep.limit_key(), LimitKey::Deep);
        assert_eq!(BackendVariant::RawNews.limit_key(), LimitKey::Deep);
    }

    #[test]
    fn test_profiles() {
        let settings = BackendSettings::default();

        let deep = BackendVariant::Deep.profile(&settings);
        assert_eq!(deep.depth, SearchDepth::Advanced);
        assert!(deep.include_raw_content);
        assert_eq!(deep.topic, Topic::General);

        let raw_news = BackendVariant::RawNews.profile(&settings);
        assert_eq!(raw_news.topic, Topic::News);
        assert_eq!(raw_news.days, Some(5));
        assert!(!raw_news.include_raw_content);

        let news = BackendVariant::News.profile(&settings);
        assert_eq!(news.depth, SearchDepth::Basic);
        assert_eq!(news.days, None);
    }

    #[test]
    fn test_profile_json() {
        let settings = BackendSettings {
            api_key: Some("tvly-secret".into()),
            ..BackendSettings::default()
        };
        let profile = BackendVariant::News.profile(&settings);
        assert_eq!(profile.api_key.as_deref(), Some("tvly-secret"));

        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["topic"], "news");
        assert_eq!(json["variant"], "news");
        assert!(json.get("days").is_none());
        assert!(json.get("api_key").is_none());
        assert!(!format!("{profile:?}").contains("tvly-secret"));
    }
}
