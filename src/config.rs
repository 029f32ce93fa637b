use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Configuration for the Lecture Viewer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Remote lessons API settings
    pub api: ApiConfig,

    /// Playback and subtitle sampling settings
    pub playback: PlaybackConfig,

    /// Local files (vocabulary, downloads)
    pub storage: StorageConfig,

    /// Output and logging settings
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Origin of the lessons API; endpoint paths are joined onto it
    pub base_url: String,

    /// Subtitle language requested and uploaded
    pub language: String,

    /// Request timeout (seconds)
    pub timeout_seconds: u64,

    /// Connection timeout (seconds)
    pub connect_timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// How often the active subtitle is recomputed (milliseconds)
    pub sample_interval_ms: u64,

    /// Length of the window a new subtitle covers, ending at the playback position
    pub provisional_window_seconds: f64,

    /// Step used by the rewind control
    pub rewind_seconds: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// JSON file holding the personal vocabulary list
    pub vocabulary_file: PathBuf,

    /// Directory downloaded audio is written to
    pub download_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Log level
    pub log_level: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://masluz-api.edwin-abel-3.workers.dev".to_string(),
            language: "es".to_string(),
            timeout_seconds: 60,
            connect_timeout_seconds: 10,
        }
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            sample_interval_ms: 100,
            provisional_window_seconds: 5.0,
            rewind_seconds: 10.0,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        let data_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("lecture-viewer");
        Self {
            vocabulary_file: data_dir.join("vocabulary.json"),
            download_dir: PathBuf::from("./downloads"),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            playback: PlaybackConfig::default(),
            storage: StorageConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl PlaybackConfig {
    pub fn sample_interval(&self) -> Duration {
        Duration::from_millis(self.sample_interval_ms)
    }
}

impl Config {
    /// Candidate configuration files, most specific first
    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![
            PathBuf::from("lecture-viewer.toml"),
            PathBuf::from("config/lecture-viewer.toml"),
        ];
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("lecture-viewer").join("config.toml"));
        }
        paths
    }

    /// Load configuration from the first readable file, then apply
    /// environment overrides. Falls back to defaults when no file exists.
    pub fn load() -> Result<Self> {
        for path in Self::config_paths() {
            if let Ok(config_str) = std::fs::read_to_string(&path) {
                match toml::from_str::<Config>(&config_str) {
                    Ok(config) => {
                        tracing::info!("📄 Loaded configuration from: {}", path.display());
                        return Ok(config.with_env_overrides());
                    }
                    Err(e) => {
                        tracing::warn!("Failed to parse config file {}: {}", path.display(), e);
                    }
                }
            }
        }

        Ok(Self::from_env())
    }

    /// Load configuration from an explicit file
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .map_err(|e| anyhow!("Cannot read config {}: {}", path.display(), e))?;
        let config: Config = toml::from_str(&config_str)?;
        tracing::info!("📄 Loaded configuration from: {}", path.display());
        Ok(config.with_env_overrides())
    }

    /// Defaults with environment overrides applied
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(base_url) = std::env::var("LECTURE_VIEWER_API_URL") {
            self.api.base_url = base_url;
        }

        if let Ok(language) = std::env::var("LECTURE_VIEWER_LANGUAGE") {
            self.api.language = language;
        }

        if let Ok(timeout) = std::env::var("LECTURE_VIEWER_TIMEOUT") {
            match timeout.parse() {
                Ok(seconds) => self.api.timeout_seconds = seconds,
                Err(_) => tracing::warn!("Ignoring invalid LECTURE_VIEWER_TIMEOUT: {}", timeout),
            }
        }

        if let Ok(vocabulary_file) = std::env::var("LECTURE_VIEWER_VOCABULARY_FILE") {
            self.storage.vocabulary_file = PathBuf::from(vocabulary_file);
        }

        if let Ok(log_level) = std::env::var("LECTURE_VIEWER_LOG_LEVEL") {
            self.output.log_level = log_level;
        }

        self
    }

    /// Save configuration to file
    pub fn save(&self, path: &std::path::Path) -> Result<()> {
        let config_str = toml::to_string_pretty(self)?;
        std::fs::write(path, config_str)?;
        tracing::info!("💾 Configuration saved to: {}", path.display());
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let base = Url::parse(&self.api.base_url)
            .map_err(|e| anyhow!("Invalid api.base_url {:?}: {}", self.api.base_url, e))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(anyhow!("api.base_url must be http or https, got {}", base.scheme()));
        }

        if self.api.language.trim().is_empty() {
            return Err(anyhow!("api.language must not be empty"));
        }

        if self.api.timeout_seconds == 0 {
            return Err(anyhow!("api.timeout_seconds must be greater than 0"));
        }

        if self.playback.sample_interval_ms == 0 {
            return Err(anyhow!("playback.sample_interval_ms must be greater than 0"));
        }

        if !(self.playback.provisional_window_seconds >= 0.0) {
            return Err(anyhow!("playback.provisional_window_seconds must not be negative"));
        }

        if !(self.playback.rewind_seconds > 0.0) {
            return Err(anyhow!("playback.rewind_seconds must be greater than 0"));
        }

        tracing::debug!("✅ Configuration validation passed");
        Ok(())
    }

    /// Get runtime configuration summary
    pub fn summary(&self) -> String {
        format!(
            "Lecture Viewer Configuration:\n\
            - API: {}\n\
            - Language: {}\n\
            - Timeout: {}s\n\
            - Subtitle sampling: every {}ms\n\
            - Provisional window: {}s\n\
            - Vocabulary file: {}\n\
            - Download directory: {}",
            self.api.base_url,
            self.api.language,
            self.api.timeout_seconds,
            self.playback.sample_interval_ms,
            self.playback.provisional_window_seconds,
            self.storage.vocabulary_file.display(),
            self.storage.download_dir.display(),
        )
    }
}

/// Configuration builder for programmatic config creation
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.api.base_url = base_url.into();
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.config.api.language = language.into();
        self
    }

    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.config.api.timeout_seconds = seconds;
        self
    }

    pub fn with_sample_interval_ms(mut self, interval_ms: u64) -> Self {
        self.config.playback.sample_interval_ms = interval_ms;
        self
    }

    pub fn with_vocabulary_file(mut self, path: PathBuf) -> Self {
        self.config.storage.vocabulary_file = path;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api.language, "es");
        assert_eq!(config.playback.sample_interval(), Duration::from_millis(100));
        assert_eq!(config.playback.provisional_window_seconds, 5.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = ConfigBuilder::new()
            .with_base_url("http://localhost:8787")
            .with_language("en")
            .with_sample_interval_ms(50)
            .build();

        assert_eq!(config.api.base_url, "http://localhost:8787");
        assert_eq!(config.api.language, "en");
        assert_eq!(config.playback.sample_interval_ms, 50);
    }

    #[test]
    fn test_config_validation() {
        assert!(ConfigBuilder::new().with_base_url("not a url").build().validate().is_err());
        assert!(ConfigBuilder::new().with_base_url("ftp://host").build().validate().is_err());
        assert!(ConfigBuilder::new().with_sample_interval_ms(0).build().validate().is_err());
        assert!(ConfigBuilder::new().with_language(" ").build().validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str("[api]\nbase_url = \"http://127.0.0.1:9000\"\n").unwrap();
        assert_eq!(config.api.base_url, "http://127.0.0.1:9000");
        assert_eq!(config.api.language, "es");
        assert_eq!(config.playback.rewind_seconds, 10.0);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lecture-viewer.toml");
        let config = ConfigBuilder::new().with_language("pt").build();

        config.save(&path).unwrap();
        let reloaded: Config = toml::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(reloaded.api.language, "pt");
    }
}
