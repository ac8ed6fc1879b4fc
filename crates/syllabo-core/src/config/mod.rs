//! Configuration management

use crate::encode::{PageSize, PresentationTheme};
use crate::error::{Result, SyllaboError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// LLM service configuration
    #[serde(default)]
    pub llm_service: LLMServiceConfig,

    /// Content analysis settings
    #[serde(default)]
    pub analysis: AnalysisSettings,

    /// Material generation settings
    #[serde(default)]
    pub generation: GenerationSettings,

    /// Document text extraction settings
    #[serde(default)]
    pub extraction: ExtractionSettings,

    /// Artifact encoding settings
    #[serde(default)]
    pub encoding: EncodingSettings,
}

/// LLM service configuration for external inference
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMServiceConfig {
    /// Base URL of the OpenAI-compatible service
    #[serde(default = "default_service_url")]
    pub url: String,

    /// Model name for analysis and generation
    #[serde(default = "default_chat_model")]
    pub model: String,

    /// API key (optional, for authenticated services)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Upper bound for any single HTTP request, in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for LLMServiceConfig {
    fn default() -> Self {
        Self {
            url: default_service_url(),
            model: default_chat_model(),
            api_key: std::env::var("SYLLABO_LLM_API_KEY").ok(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

fn default_service_url() -> String {
    std::env::var("SYLLABO_LLM_URL").unwrap_or_else(|_| "http://localhost:8000".to_string())
}

fn default_chat_model() -> String {
    std::env::var("SYLLABO_LLM_MODEL")
        .unwrap_or_else(|_| "meta-llama/Llama-3.1-8B-Instruct".to_string())
}

fn default_request_timeout() -> u64 {
    120
}

/// Settings for the content analyzer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    /// Sampling temperature; kept low to favor stable structure
    pub temperature: f32,
    /// Wall-clock limit for the model call
    pub timeout_secs: u64,
    /// Document text beyond this many chars is dropped before prompting
    pub max_document_chars: usize,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            temperature: 0.2,
            timeout_secs: 90,
            max_document_chars: 60_000,
        }
    }
}

impl AnalysisSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Settings for the material generator
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    pub temperature: f32,
    pub timeout_secs: u64,
    /// Language the generated materials are written in
    pub language: String,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            timeout_secs: 45,
            language: "Spanish".to_string(),
        }
    }
}

impl GenerationSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Settings for resolving and reading uploaded documents
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionSettings {
    /// Root directory document references resolve against
    pub uploads_dir: PathBuf,
    pub timeout_secs: u64,
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self {
            uploads_dir: std::env::var("SYLLABO_UPLOADS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| default_uploads_dir()),
            timeout_secs: 30,
        }
    }
}

impl ExtractionSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_uploads_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(crate::DATA_DIR_NAME)
        .join("uploads")
}

/// Settings for the slide deck and PDF encoders
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodingSettings {
    /// Built-in presentation theme name
    pub theme: String,
    /// Page size for PDF documents
    pub page: PageSize,
}

impl Default for EncodingSettings {
    fn default() -> Self {
        Self {
            theme: "classic".to_string(),
            page: PageSize::A4,
        }
    }
}

impl EncodingSettings {
    /// Resolve the configured theme name
    pub fn presentation_theme(&self) -> Result<PresentationTheme> {
        PresentationTheme::by_name(&self.theme).ok_or_else(|| {
            SyllaboError::Config(format!(
                "Unknown theme '{}' (available: {})",
                self.theme,
                PresentationTheme::NAMES.join(", ")
            ))
        })
    }
}

impl Config {
    /// Load config from default path
    pub fn load() -> Result<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Config::default())
        }
    }

    /// Load config from an explicit path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            SyllaboError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config: Config = serde_yaml::from_str(&content)?;
        config.encoding.presentation_theme()?;
        Ok(config)
    }

    /// Save config to default path
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::default_path())
    }

    /// Save config to an explicit path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let write_failed = |e: std::io::Error| {
            SyllaboError::Config(format!("Failed to write {}: {}", path.display(), e))
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(write_failed)?;
        }
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content).map_err(write_failed)?;
        Ok(())
    }

    /// Get default config path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(crate::CONFIG_DIR_NAME)
            .join("config.yml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(config.analysis.temperature < config.generation.temperature);
        assert!(config.generation.timeout_secs < config.analysis.timeout_secs);
        assert_eq!(config.encoding.theme, "classic");
    }

    #[test]
    fn test_partial_yaml() {
        let yaml = r#"
llm_service:
  url: http://inference:9000
analysis:
  timeout_secs: 60
encoding:
  theme: midnight
  page: letter
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.llm_service.url, "http://inference:9000");
        assert_eq!(config.analysis.timeout_secs, 60);
        assert_eq!(config.analysis.max_document_chars, 60_000);
        assert_eq!(config.generation.timeout_secs, 45);
        assert_eq!(config.encoding.page, PageSize::Letter);
        assert_eq!(config.encoding.presentation_theme().unwrap().name, "midnight");
    }

    #[test]
    fn test_llm_section_without_url() {
        let yaml = "llm_service:\n  model: qwen2.5-7b-instruct\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.llm_service.model, "qwen2.5-7b-instruct");
        assert_eq!(config.llm_service.url, default_service_url());
    }

    #[test]
    fn test_unknown_theme_rejected() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.yml");
        std::fs::write(&path, "encoding:\n  theme: neon\n").unwrap();
        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, SyllaboError::Config(_)));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.yml");
        let mut config = Config::default();
        config.generation.language = "English".to_string();
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.generation.language, "English");
    }

    #[test]
    fn test_file_errors_are_config_errors() {
        let dir = tempfile::TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "not a directory").unwrap();

        let err = Config::default()
            .save_to(&blocker.join("config.yml"))
            .unwrap_err();
        assert!(matches!(err, SyllaboError::Config(_)), "{}", err);
        assert_ne!(err.category(), crate::error::ErrorCategory::Extraction);

        let err = Config::load_from(&dir.path().join("missing.yml")).unwrap_err();
        assert!(matches!(err, SyllaboError::Config(_)), "{}", err);
    }
}
