use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use log::debug;
use reqwest::Client;
use serde_json::{json, Value};

use crate::errors::{CaptionError, ProviderError};
use crate::providers::{error_from_response, MediaInput, ProviderSettings, TranscriptionProvider};
use crate::transcript::{ProviderResponse, TimeUnit};

/// Instruction sent alongside the audio
const TRANSCRIPTION_PROMPT: &str = "Transcribe the speech in this audio. \
Speech may mix English and Hindi; keep English words in Latin script and Hindi words in Devanagari. \
Respond only with JSON of the form {\"segments\":[{\"start\":<seconds>,\"end\":<seconds>,\"text\":\"...\"}]}, \
one entry per sentence, in playback order.";

/// Gemini client using `generateContent` with inline audio
#[derive(Debug)]
pub struct GeminiProvider {
    /// HTTP client for API requests
    client: Client,
    /// API key, model and endpoint
    settings: ProviderSettings,
}

impl GeminiProvider {
    /// Create a new Gemini client
    pub fn new(settings: ProviderSettings) -> Self {
        Self {
            client: settings.http_client(),
            settings,
        }
    }

    fn generate_url(&self) -> Result<url::Url, ProviderError> {
        let base = format!("{}/models/{}:generateContent", self.settings.endpoint, self.settings.model);
        url::Url::parse_with_params(&base, &[("key", self.settings.api_key.as_str())])
            .map_err(|e| ProviderError::RequestFailed(format!("Invalid Gemini endpoint {}: {}", base, e)))
    }

    fn build_request(media: &MediaInput) -> Value {
        json!({
            "contents": [{
                "parts": [
                    { "text": TRANSCRIPTION_PROMPT },
                    { "inline_data": { "mime_type": media.mime_type, "data": STANDARD.encode(&media.data) } }
                ]
            }],
            "generationConfig": { "responseMimeType": "application/json" }
        })
    }

    /// Pull the model's JSON answer out of a `generateContent` body
    pub fn parse_response(body: &Value) -> Result<ProviderResponse, ProviderError> {
        let text = body
            .pointer("/candidates/0/content/parts/0/text")
            .and_then(Value::as_str)
            .ok_or_else(|| malformed("Gemini response has no candidate text".to_string()))?;

        let answer: Value = serde_json::from_str(strip_code_fence(text))
            .map_err(|e| malformed(format!("Gemini answer is not JSON: {}", e)))?;

        Ok(ProviderResponse::from_json(&answer, TimeUnit::Seconds, None)?)
    }
}

fn malformed(message: String) -> ProviderError {
    CaptionError::MalformedProviderResponse(message).into()
}

/// Models sometimes wrap JSON in a markdown fence
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    match trimmed.strip_prefix("```") {
        Some(rest) => {
            let rest = rest.strip_prefix("json").unwrap_or(rest);
            rest.strip_suffix("```").unwrap_or(rest).trim()
        }
        None => trimmed,
    }
}

#[async_trait]
impl TranscriptionProvider for GeminiProvider {
    async fn transcribe(&self, media: &MediaInput) -> Result<ProviderResponse, ProviderError> {
        media.check_size(self.settings.max_upload_bytes)?;
        debug!("Sending {} ({} bytes) to Gemini {}", media.file_name, media.size(), self.settings.model);

        let response = self.client.post(self.generate_url()?)
            .json(&Self::build_request(media))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response("Gemini", response).await);
        }

        let body: Value = response.json().await?;
        Self::parse_response(&body)
    }

    fn name(&self) -> &str {
        "gemini"
    }
}
