//! Typed application configuration
//!
//! Replaces a string-keyed settings map with named, validated sections. Every
//! section has serde defaults so a partial TOML file is enough.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{CopysmithError, CopysmithResult, ErrorContext};
use crate::logging::LoggingConfig;

/// Root configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub research: ResearchConfig,
    #[serde(default)]
    pub content: ContentConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub alerts: AlertConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Language-model provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub api_key: Option<String>,
    pub endpoint: String,
    pub model: String,
    pub api_version: String,
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: "https://api.anthropic.com/v1/messages".to_string(),
            model: "claude-3-opus-20240229".to_string(),
            api_version: "2023-06-01".to_string(),
            max_tokens: 4000,
            timeout_secs: 60,
        }
    }
}

/// Keyword research provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResearchConfig {
    pub login: Option<String>,
    pub password: Option<String>,
    pub primary_endpoint: String,
    pub fallback_endpoint: String,
    pub search_volume_endpoint: String,
    pub location_name: String,
    pub language_name: String,
    pub device: String,
    pub timeout_secs: u64,
    pub max_attempts: usize,
    pub retry_delay_ms: u64,
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            login: None,
            password: None,
            primary_endpoint: "https://api.dataforseo.com/v3/serp/google/organic/live".to_string(),
            fallback_endpoint:
                "https://api.dataforseo.com/v3/keywords_data/google/search_volume/live".to_string(),
            search_volume_endpoint:
                "https://api.dataforseo.com/v3/keywords_data/google/search_volume/live".to_string(),
            location_name: "United States".to_string(),
            language_name: "English".to_string(),
            device: "desktop".to_string(),
            timeout_secs: 30,
            max_attempts: 3,
            retry_delay_ms: 1000,
        }
    }
}

/// Where the affiliate disclosure goes relative to the article body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DisclosurePlacement {
    Top,
    #[default]
    Bottom,
}

/// Post-processing settings for generated articles
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    pub disclosure: String,
    pub include_disclosure: bool,
    pub disclosure_placement: DisclosurePlacement,
    pub default_word_count: u32,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            disclosure: "This post may contain affiliate links.".to_string(),
            include_disclosure: true,
            disclosure_placement: DisclosurePlacement::Bottom,
            default_word_count: 1500,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    #[default]
    Memory,
    File,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub backend: CacheBackend,
    pub directory: Option<PathBuf>,
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackend::Memory,
            directory: None,
            ttl_secs: 24 * 60 * 60,
        }
    }
}

/// Operator notification settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    pub recipient: Option<String>,
    pub site_label: String,
    pub min_interval_secs: u64,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            recipient: None,
            site_label: "copysmith".to_string(),
            min_interval_secs: 60 * 60,
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> CopysmithResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| CopysmithError::Config {
            message: format!("Failed to read config file: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("read_file")
                .with_suggestion("Check if the config file exists and is readable"),
        })?;

        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> CopysmithResult<Self> {
        toml::from_str(content).map_err(|e| CopysmithError::Config {
            message: format!("Failed to parse config: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("parse_toml")
                .with_suggestion("Check TOML syntax in config file"),
        })
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> CopysmithResult<()> {
        let content = toml::to_string_pretty(self).map_err(|e| CopysmithError::Config {
            message: format!("Failed to serialize config: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config").with_operation("serialize_toml"),
        })?;

        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        std::fs::write(path, content).map_err(|e| CopysmithError::Config {
            message: format!("Failed to write config file: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("write_file")
                .with_suggestion("Check if the directory exists and is writable"),
        })?;

        Ok(())
    }

    /// Fill missing credentials from the environment
    pub fn with_env_overrides(mut self) -> Self {
        if self.generation.api_key.as_deref().map_or(true, str::is_empty) {
            self.generation.api_key = std::env::var("ANTHROPIC_API_KEY").ok();
        }
        if self.research.login.as_deref().map_or(true, str::is_empty) {
            self.research.login = std::env::var("DATAFORSEO_LOGIN").ok();
        }
        if self.research.password.as_deref().map_or(true, str::is_empty) {
            self.research.password = std::env::var("DATAFORSEO_PASSWORD").ok();
        }
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> CopysmithResult<()> {
        if self.generation.max_tokens == 0 {
            return Err(invalid("generation.max_tokens must be greater than 0"));
        }

        if self.generation.model.trim().is_empty() {
            return Err(invalid("generation.model must not be empty"));
        }

        if self.research.max_attempts == 0 {
            return Err(invalid("research.max_attempts must be greater than 0"));
        }

        if self.cache.ttl_secs == 0 {
            return Err(invalid("cache.ttl_secs must be greater than 0"));
        }

        if self.content.include_disclosure && self.content.disclosure.trim().is_empty() {
            return Err(invalid(
                "content.disclosure must be set when include_disclosure is true",
            ));
        }

        Ok(())
    }
}

fn invalid(message: &str) -> CopysmithError {
    CopysmithError::Config {
        message: message.to_string(),
        source: None,
        context: ErrorContext::new("config")
            .with_operation("validate")
            .with_suggestion("Fix the value in your config file"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.generation.max_tokens, 4000);
        assert_eq!(config.research.max_attempts, 3);
        assert_eq!(config.research.retry_delay_ms, 1000);
        assert_eq!(config.cache.ttl_secs, 86_400);
        assert_eq!(config.alerts.min_interval_secs, 3_600);
        assert_eq!(
            config.content.disclosure_placement,
            DisclosurePlacement::Bottom
        );
    }

    #[test]
    fn test_partial_toml() {
        let config = AppConfig::from_toml_str(
            r#"
            [content]
            disclosure_placement = "top"
            disclosure = "We earn commissions."

            [research]
            max_attempts = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.content.disclosure_placement, DisclosurePlacement::Top);
        assert_eq!(config.content.disclosure, "We earn commissions.");
        assert_eq!(config.research.max_attempts, 5);
        assert_eq!(config.research.location_name, "United States");
        assert_eq!(config.generation.model, "claude-3-opus-20240229");
    }

    #[test]
    fn test_validation_rejects_zero_budget() {
        let mut config = AppConfig::default();
        config.generation.max_tokens = 0;
        assert!(matches!(
            config.validate(),
            Err(CopysmithError::Config { .. })
        ));
    }

    #[test]
    fn test_roundtrip_through_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nested").join("copysmith.toml");

        let mut config = AppConfig::default();
        config.content.default_word_count = 2200;
        config.save_to_file(&path).unwrap();

        let loaded = AppConfig::from_file(&path).unwrap();
        assert_eq!(loaded.content.default_word_count, 2200);
    }
}
