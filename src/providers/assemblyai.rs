use async_trait::async_trait;
use log::{debug, info};
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use crate::errors::ProviderError;
use crate::providers::{error_from_response, MediaInput, ProviderSettings, TranscriptionProvider};
use crate::transcript::{ProviderResponse, TimeUnit};

/// AssemblyAI client: upload, request a transcript, then poll until it is ready
#[derive(Debug)]
pub struct AssemblyAIProvider {
    /// HTTP client for API requests
    client: Client,
    /// API key, model and endpoint
    settings: ProviderSettings,
    /// Delay between status polls
    poll_interval: Duration,
}

/// Transcript creation request
#[derive(Debug, Serialize)]
struct TranscriptRequest<'a> {
    audio_url: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    speech_model: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    upload_url: String,
}

/// Status of a transcript job
#[derive(Debug, Deserialize)]
pub struct TranscriptStatus {
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub error: Option<String>,
}

impl AssemblyAIProvider {
    /// Create a new AssemblyAI client
    pub fn new(settings: ProviderSettings, poll_interval: Duration) -> Self {
        Self {
            client: settings.http_client(),
            settings,
            poll_interval,
        }
    }

    /// Polls allowed before giving up, derived from the request timeout
    fn max_polls(&self) -> u64 {
        let interval_ms = self.poll_interval.as_millis().max(1) as u64;
        (self.settings.timeout_secs * 1000 / interval_ms).max(1)
    }

    async fn upload(&self, media: &MediaInput) -> Result<String, ProviderError> {
        let response = self.client.post(format!("{}/upload", self.settings.endpoint))
            .header(header::AUTHORIZATION, &self.settings.api_key)
            .header(header::CONTENT_TYPE, "application/octet-stream")
            .body(media.data.clone())
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response("AssemblyAI", response).await);
        }

        let upload: UploadResponse = response.json().await?;
        Ok(upload.upload_url)
    }

    async fn create_transcript(&self, audio_url: &str) -> Result<TranscriptStatus, ProviderError> {
        let request = TranscriptRequest {
            audio_url,
            speech_model: Some(self.settings.model.as_str()).filter(|m| !m.is_empty()),
        };

        let response = self.client.post(format!("{}/transcript", self.settings.endpoint))
            .header(header::AUTHORIZATION, &self.settings.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response("AssemblyAI", response).await);
        }

        Ok(response.json().await?)
    }

    async fn fetch_transcript(&self, id: &str) -> Result<Value, ProviderError> {
        let response = self.client.get(format!("{}/transcript/{}", self.settings.endpoint, id))
            .header(header::AUTHORIZATION, &self.settings.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response("AssemblyAI", response).await);
        }

        Ok(response.json().await?)
    }

    /// Interpret a polled transcript body.
    ///
    /// Returns `Ok(None)` while the job is still queued or processing.
    pub fn parse_transcript(body: &Value) -> Result<Option<ProviderResponse>, ProviderError> {
        let status = body.get("status").and_then(Value::as_str).unwrap_or_default();
        match status {
            "completed" => {
                let duration = body.get("audio_duration").and_then(Value::as_f64);
                Ok(Some(ProviderResponse::from_json(body, TimeUnit::Milliseconds, duration)?))
            }
            "error" => {
                let message = body.get("error").and_then(Value::as_str).unwrap_or("transcription failed");
                Err(ProviderError::ApiError {
                    status_code: 422,
                    message: message.to_string(),
                })
            }
            "queued" | "processing" => Ok(None),
            other => Err(ProviderError::ParseError(format!("Unknown transcript status: {}", other))),
        }
    }
}

#[async_trait]
impl TranscriptionProvider for AssemblyAIProvider {
    async fn transcribe(&self, media: &MediaInput) -> Result<ProviderResponse, ProviderError> {
        media.check_size(self.settings.max_upload_bytes)?;

        let audio_url = self.upload(media).await?;
        debug!("Uploaded {} to AssemblyAI", media.file_name);

        let job = self.create_transcript(&audio_url).await?;
        info!("AssemblyAI transcript {} {}", job.id, job.status);

        for _ in 0..self.max_polls() {
            let body = self.fetch_transcript(&job.id).await?;
            if let Some(response) = Self::parse_transcript(&body)? {
                return Ok(response);
            }
            tokio::time::sleep(self.poll_interval).await;
        }

        Err(ProviderError::RequestFailed(format!(
            "Transcript {} not ready after {}s",
            job.id, self.settings.timeout_secs
        )))
    }

    fn name(&self) -> &str {
        "assemblyai"
    }
}
