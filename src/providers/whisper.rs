use async_trait::async_trait;
use log::debug;
use reqwest::{multipart, Client};
use serde_json::Value;

use crate::errors::ProviderError;
use crate::providers::{error_from_response, MediaInput, ProviderSettings, TranscriptionProvider};
use crate::transcript::{ProviderResponse, TimeUnit};

/// OpenAI Whisper client for the audio transcription endpoint
#[derive(Debug)]
pub struct WhisperProvider {
    /// HTTP client for API requests
    client: Client,
    /// API key, model and endpoint
    settings: ProviderSettings,
}

impl WhisperProvider {
    /// Create a new Whisper client
    pub fn new(settings: ProviderSettings) -> Self {
        Self {
            client: settings.http_client(),
            settings,
        }
    }

    fn transcriptions_url(&self) -> String {
        format!("{}/audio/transcriptions", self.settings.endpoint)
    }

    fn build_form(&self, media: &MediaInput) -> Result<multipart::Form, ProviderError> {
        let file_part = multipart::Part::bytes(media.data.clone())
            .file_name(media.file_name.clone())
            .mime_str(&media.mime_type)
            .map_err(|e| ProviderError::RequestFailed(format!("Failed to create multipart: {}", e)))?;

        Ok(multipart::Form::new()
            .part("file", file_part)
            .text("model", self.settings.model.clone())
            .text("response_format", "verbose_json")
            .text("timestamp_granularities[]", "word")
            .text("timestamp_granularities[]", "segment"))
    }

    /// Read a `verbose_json` body: words when granted, segments otherwise.
    pub fn parse_response(body: &Value) -> Result<ProviderResponse, ProviderError> {
        let duration = body.get("duration").and_then(Value::as_f64);
        Ok(ProviderResponse::from_json(body, TimeUnit::Seconds, duration)?)
    }
}

#[async_trait]
impl TranscriptionProvider for WhisperProvider {
    async fn transcribe(&self, media: &MediaInput) -> Result<ProviderResponse, ProviderError> {
        media.check_size(self.settings.max_upload_bytes)?;
        debug!("Uploading {} ({} bytes) to Whisper", media.file_name, media.size());

        let response = self.client.post(self.transcriptions_url())
            .bearer_auth(&self.settings.api_key)
            .multipart(self.build_form(media)?)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response("Whisper", response).await);
        }

        let body: Value = response.json().await?;
        Self::parse_response(&body)
    }

    fn name(&self) -> &str {
        "whisper"
    }
}
