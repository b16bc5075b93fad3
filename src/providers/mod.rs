/*!
 * Transcription provider implementations.
 *
 * This module contains client implementations for the speech-to-text services
 * captions can be generated from:
 * - Whisper: OpenAI audio transcription API (word-level timestamps)
 * - AssemblyAI: upload, transcribe and poll (word-level timestamps in ms)
 * - Gemini: multimodal generation prompted for timed segments
 * - Mock: canned demo captions, also used by the test suite
 *
 * Every provider hands back a `ProviderResponse`; turning it into words is the
 * job of `transcript::normalize`.
 */

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use log::{error, warn};
use reqwest::Client;
use std::fmt::Debug;
use std::future::Future;
use std::path::Path;
use std::time::Duration;

use crate::app_config::{TranscriptionConfig, TranscriptionProviderType};
use crate::errors::ProviderError;
use crate::file_utils::FileManager;
use crate::transcript::ProviderResponse;

pub mod assemblyai;
pub mod gemini;
pub mod mock;
pub mod whisper;

pub use assemblyai::AssemblyAIProvider;
pub use gemini::GeminiProvider;
pub use mock::{MockBehavior, MockProvider};
pub use whisper::WhisperProvider;

/// Media handed to a provider
#[derive(Debug, Clone)]
pub struct MediaInput {
    /// Raw file bytes
    pub data: Vec<u8>,
    /// File name sent along with the upload
    pub file_name: String,
    /// MIME type of the payload
    pub mime_type: String,
}

impl MediaInput {
    pub fn new(data: Vec<u8>, file_name: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self {
            data,
            file_name: file_name.into(),
            mime_type: mime_type.into(),
        }
    }

    /// Read a media file from disk
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = FileManager::read_bytes(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "media".to_string());
        Ok(Self::new(data, file_name, FileManager::mime_type(path)))
    }

    /// Payload size in bytes
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    /// Reject payloads above `limit` before anything is sent
    pub fn check_size(&self, limit: u64) -> Result<(), ProviderError> {
        if self.size() > limit {
            return Err(ProviderError::FileTooLarge { size: self.size(), limit });
        }
        Ok(())
    }
}

/// Common trait for all transcription providers
///
/// Implementations make a single attempt; retries are applied by the caller
/// through [`RetryPolicy`].
#[async_trait]
pub trait TranscriptionProvider: Send + Sync + Debug {
    /// Transcribe a media payload
    ///
    /// # Arguments
    /// * `media` - The audio or video to transcribe
    ///
    /// # Returns
    /// * `Result<ProviderResponse, ProviderError>` - Words, segments or text, or an error
    async fn transcribe(&self, media: &MediaInput) -> Result<ProviderResponse, ProviderError>;

    /// Short provider name for logs
    fn name(&self) -> &str;
}

/// Connection details shared by the HTTP providers
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub api_key: String,
    pub endpoint: String,
    pub model: String,
    pub timeout_secs: u64,
    pub max_upload_bytes: u64,
}

impl ProviderSettings {
    /// Resolve the active provider's settings from configuration
    pub fn from_config(config: &TranscriptionConfig) -> Self {
        Self {
            api_key: config.get_api_key(),
            endpoint: config.get_endpoint().trim_end_matches('/').to_string(),
            model: config.get_model(),
            timeout_secs: config.get_timeout_secs(),
            max_upload_bytes: config.get_max_upload_bytes(),
        }
    }

    pub(crate) fn http_client(&self) -> Client {
        Client::builder()
            .timeout(Duration::from_secs(self.timeout_secs))
            .build()
            .unwrap_or_default()
    }
}

/// Build the configured provider
pub fn build_provider(config: &TranscriptionConfig) -> Result<Box<dyn TranscriptionProvider>> {
    let settings = ProviderSettings::from_config(config);
    if let Some(env_var) = config.provider.api_key_env_var() {
        if settings.api_key.is_empty() {
            return Err(anyhow!(
                "No API key for {} provider: set it in the config or {}",
                config.provider.display_name(),
                env_var
            ));
        }
    }

    let provider: Box<dyn TranscriptionProvider> = match config.provider {
        TranscriptionProviderType::Whisper => Box::new(WhisperProvider::new(settings)),
        TranscriptionProviderType::AssemblyAI => Box::new(AssemblyAIProvider::new(
            settings,
            Duration::from_millis(config.common.poll_interval_ms),
        )),
        TranscriptionProviderType::Gemini => Box::new(GeminiProvider::new(settings)),
        TranscriptionProviderType::Mock => Box::new(MockProvider::working()),
    };
    Ok(provider)
}

/// Exponential backoff for transient provider failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Delay before the first retry, doubled for each one after
    pub base_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay_ms: 1000,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay_ms: u64) -> Self {
        Self { max_retries, base_delay_ms }
    }

    pub fn from_config(config: &TranscriptionConfig) -> Self {
        Self::new(config.common.retry_count, config.common.retry_backoff_ms)
    }

    /// Delay before retry number `retry` (0-based)
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = 1u64 << retry.min(16);
        Duration::from_millis(self.base_delay_ms.saturating_mul(factor))
    }

    /// Run `operation` until it succeeds, fails permanently, or retries run out.
    ///
    /// Only [`ProviderError::is_transient`] errors are retried. Exhausting the
    /// retries yields `ProviderUnavailable` carrying the last error.
    pub async fn run<T, F, Fut>(&self, label: &str, mut operation: F) -> Result<T, ProviderError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ProviderError>>,
    {
        let attempts = self.max_retries + 1;
        let mut attempt = 0;

        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(e) if !e.is_transient() => {
                    error!("{} request failed: {}", label, e);
                    return Err(e);
                }
                Err(e) => {
                    attempt += 1;
                    if attempt >= attempts {
                        error!("{} request failed after {} attempts: {}", label, attempts, e);
                        return Err(ProviderError::ProviderUnavailable {
                            attempts,
                            message: e.to_string(),
                        });
                    }

                    let delay = self.delay_for(attempt - 1);
                    warn!("{} request failed: {} - retry {}/{} in {}ms", label, e, attempt, self.max_retries, delay.as_millis());
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

/// Turn a non-success HTTP response into a provider error
pub(crate) async fn error_from_response(provider: &str, response: reqwest::Response) -> ProviderError {
    let status = response.status().as_u16();
    let error_text = response.text().await
        .unwrap_or_else(|_| "Failed to get error response text".to_string());
    error!("{} API error ({}): {}", provider, status, error_text);
    ProviderError::from_status(status, error_text)
}
