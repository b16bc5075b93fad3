use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::path::Path;

use crate::segmenter::{SegmenterOptions, DEFAULT_MAX_WORDS};
use crate::subtitle_processor::SubtitleFormat;
use crate::timeline::CaptionStyle;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    /// Transcription config
    #[serde(default)]
    pub transcription: TranscriptionConfig,

    /// Caption generation and export config
    #[serde(default)]
    pub captions: CaptionConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Transcription provider type
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TranscriptionProviderType {
    // @provider: OpenAI Whisper
    #[default]
    Whisper,
    // @provider: AssemblyAI
    AssemblyAI,
    // @provider: Google Gemini
    Gemini,
    // @provider: Offline demo captions
    Mock,
}

impl TranscriptionProviderType {
    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::Whisper => "OpenAI Whisper",
            Self::AssemblyAI => "AssemblyAI",
            Self::Gemini => "Gemini",
            Self::Mock => "Mock",
        }
    }

    // @returns: Lowercase provider identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::Whisper => "whisper".to_string(),
            Self::AssemblyAI => "assemblyai".to_string(),
            Self::Gemini => "gemini".to_string(),
            Self::Mock => "mock".to_string(),
        }
    }

    // @returns: Environment variable holding the API key, if the provider needs one
    pub fn api_key_env_var(&self) -> Option<&'static str> {
        match self {
            Self::Whisper => Some("OPENAI_API_KEY"),
            Self::AssemblyAI => Some("ASSEMBLYAI_API_KEY"),
            Self::Gemini => Some("GEMINI_API_KEY"),
            Self::Mock => None,
        }
    }

    pub fn all() -> [Self; 4] {
        [Self::Whisper, Self::AssemblyAI, Self::Gemini, Self::Mock]
    }
}

impl std::fmt::Display for TranscriptionProviderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

impl std::str::FromStr for TranscriptionProviderType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "whisper" | "openai" => Ok(Self::Whisper),
            "assemblyai" => Ok(Self::AssemblyAI),
            "gemini" => Ok(Self::Gemini),
            "mock" => Ok(Self::Mock),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Provider configuration wrapper
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderConfig {
    // @field: Provider type identifier
    #[serde(rename = "type")]
    pub provider_type: String,

    // @field: Model name
    #[serde(default = "String::new")]
    pub model: String,

    // @field: API key, empty to read from the environment
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Service URL
    #[serde(default = "String::new")]
    pub endpoint: String,

    // @field: Timeout seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    // @field: Largest media payload accepted, in bytes
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: u64,
}

impl ProviderConfig {
    // @param provider_type: Provider enum
    // @returns: Provider config with defaults
    pub fn new(provider_type: TranscriptionProviderType) -> Self {
        Self {
            provider_type: provider_type.to_lowercase_string(),
            model: default_model(provider_type),
            api_key: String::new(),
            endpoint: default_endpoint(provider_type),
            timeout_secs: default_provider_timeout_secs(provider_type),
            max_upload_bytes: default_provider_max_upload_bytes(provider_type),
        }
    }
}

/// Transcription service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranscriptionConfig {
    /// Transcription provider to use
    #[serde(default)]
    pub provider: TranscriptionProviderType,

    /// Available transcription providers
    #[serde(default)]
    pub available_providers: Vec<ProviderConfig>,

    /// Common transcription settings
    #[serde(default)]
    pub common: TranscriptionCommonConfig,
}

/// Settings shared by every provider
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranscriptionCommonConfig {
    /// Retry count for transient failures
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    /// Backoff base for retries (in milliseconds), doubled on each retry
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Emit placeholder captions instead of failing when the provider stays unreachable
    #[serde(default)]
    pub fallback_on_unavailable: bool,

    /// Delay between status polls for asynchronous providers (in milliseconds)
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl Default for TranscriptionCommonConfig {
    fn default() -> Self {
        Self {
            retry_count: default_retry_count(),
            retry_backoff_ms: default_retry_backoff_ms(),
            fallback_on_unavailable: false,
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

/// Caption generation and export settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CaptionConfig {
    /// Maximum words per caption cue
    #[serde(default = "default_max_words_per_cue")]
    pub max_words_per_cue: usize,

    /// Close a cue after sentence-ending punctuation
    #[serde(default = "default_true")]
    pub split_on_punctuation: bool,

    /// Rendering style reported in the run summary.
    ///
    /// Informational only: cue text, timing and the exported subtitle file
    /// are the same for every style. `preview --style` picks its own.
    #[serde(default)]
    pub style: CaptionStyle,

    /// Subtitle format written next to the input
    #[serde(default)]
    pub export_format: SubtitleFormat,
}

impl Default for CaptionConfig {
    fn default() -> Self {
        Self {
            max_words_per_cue: default_max_words_per_cue(),
            split_on_punctuation: true,
            style: CaptionStyle::default(),
            export_format: SubtitleFormat::default(),
        }
    }
}

impl CaptionConfig {
    /// Segmentation options for word-level transcripts
    pub fn segmenter_options(&self) -> SegmenterOptions {
        SegmenterOptions {
            max_words: self.max_words_per_cue,
            split_on_punctuation: self.split_on_punctuation,
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_max_upload_bytes() -> u64 {
    100 * 1024 * 1024
}

fn default_retry_count() -> u32 {
    2
}

fn default_retry_backoff_ms() -> u64 {
    1000 // 1 second base backoff time, doubled on each retry
}

fn default_poll_interval_ms() -> u64 {
    3000
}

fn default_max_words_per_cue() -> usize {
    DEFAULT_MAX_WORDS
}

fn default_true() -> bool {
    true
}

fn default_model(provider_type: TranscriptionProviderType) -> String {
    match provider_type {
        TranscriptionProviderType::Whisper => "whisper-1",
        TranscriptionProviderType::AssemblyAI => "best",
        TranscriptionProviderType::Gemini => "gemini-1.5-flash",
        TranscriptionProviderType::Mock => "demo",
    }
    .to_string()
}

fn default_endpoint(provider_type: TranscriptionProviderType) -> String {
    match provider_type {
        TranscriptionProviderType::Whisper => "https://api.openai.com/v1",
        TranscriptionProviderType::AssemblyAI => "https://api.assemblyai.com/v2",
        TranscriptionProviderType::Gemini => "https://generativelanguage.googleapis.com/v1beta",
        TranscriptionProviderType::Mock => "",
    }
    .to_string()
}

fn default_provider_timeout_secs(provider_type: TranscriptionProviderType) -> u64 {
    match provider_type {
        TranscriptionProviderType::AssemblyAI => 300,
        TranscriptionProviderType::Mock => 5,
        _ => default_timeout_secs(),
    }
}

fn default_provider_max_upload_bytes(provider_type: TranscriptionProviderType) -> u64 {
    match provider_type {
        // Whisper rejects uploads above 25 MB
        TranscriptionProviderType::Whisper => 25 * 1024 * 1024,
        // Inline request data is capped at 20 MB
        TranscriptionProviderType::Gemini => 20 * 1024 * 1024,
        _ => default_max_upload_bytes(),
    }
}

impl Config {
    /// Load a configuration file, creating it with defaults when missing
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<(Self, bool)> {
        let path = path.as_ref();
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to open config file: {}", path.display()))?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
            return Ok((config, false));
        }

        let config = Config::default();
        config.save(path)?;
        Ok((config, true))
    }

    /// Write the configuration as pretty JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let config_json = serde_json::to_string_pretty(self)
            .context("Failed to serialize config to JSON")?;
        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write config to file: {}", path.display()))?;
        Ok(())
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if self.captions.max_words_per_cue == 0 {
            return Err(anyhow!("captions.max_words_per_cue must be at least 1"));
        }

        let provider = self.transcription.provider;
        if let Some(env_var) = provider.api_key_env_var() {
            if self.transcription.get_api_key().is_empty() {
                return Err(anyhow!(
                    "Transcription API key is required for {} provider (set it in the config or {})",
                    provider.display_name(),
                    env_var
                ));
            }
        }

        if provider != TranscriptionProviderType::Mock {
            let endpoint = self.transcription.get_endpoint();
            url::Url::parse(&endpoint)
                .with_context(|| format!("Invalid endpoint for {} provider: {}", provider.display_name(), endpoint))?;
        }

        Ok(())
    }
}

impl TranscriptionConfig {
    /// Get the active provider configuration from the available_providers array
    pub fn get_active_provider_config(&self) -> Option<&ProviderConfig> {
        self.get_provider_config(&self.provider)
    }

    /// Get a specific provider configuration by type
    pub fn get_provider_config(&self, provider_type: &TranscriptionProviderType) -> Option<&ProviderConfig> {
        let provider_str = provider_type.to_lowercase_string();
        self.available_providers.iter()
            .find(|p| p.provider_type == provider_str)
    }

    /// Mutable access to the active provider configuration, inserted with defaults if absent
    pub fn active_provider_config_mut(&mut self) -> &mut ProviderConfig {
        let provider_str = self.provider.to_lowercase_string();
        let index = match self.available_providers.iter().position(|p| p.provider_type == provider_str) {
            Some(index) => index,
            None => {
                self.available_providers.push(ProviderConfig::new(self.provider));
                self.available_providers.len() - 1
            }
        };
        &mut self.available_providers[index]
    }

    /// Get the model for the active provider
    pub fn get_model(&self) -> String {
        self.get_active_provider_config()
            .map(|p| p.model.clone())
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| default_model(self.provider))
    }

    /// Get the API key for the active provider, falling back to its environment variable
    pub fn get_api_key(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.api_key.is_empty() {
                return provider_config.api_key.clone();
            }
        }

        self.provider
            .api_key_env_var()
            .and_then(|var| std::env::var(var).ok())
            .unwrap_or_default()
    }

    /// Get the endpoint for the active provider
    pub fn get_endpoint(&self) -> String {
        self.get_active_provider_config()
            .map(|p| p.endpoint.clone())
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| default_endpoint(self.provider))
    }

    /// Get the request timeout for the active provider
    pub fn get_timeout_secs(&self) -> u64 {
        self.get_active_provider_config()
            .map(|p| p.timeout_secs)
            .filter(|t| *t > 0)
            .unwrap_or_else(|| default_provider_timeout_secs(self.provider))
    }

    /// Get the upload limit for the active provider
    pub fn get_max_upload_bytes(&self) -> u64 {
        self.get_active_provider_config()
            .map(|p| p.max_upload_bytes)
            .filter(|b| *b > 0)
            .unwrap_or_else(|| default_provider_max_upload_bytes(self.provider))
    }
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            provider: TranscriptionProviderType::default(),
            available_providers: TranscriptionProviderType::all()
                .into_iter()
                .map(ProviderConfig::new)
                .collect(),
            common: TranscriptionCommonConfig::default(),
        }
    }
}
