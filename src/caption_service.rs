/*!
 * Caption generation pipeline.
 *
 * Ties a transcription provider to the caption core:
 * provider response → `transcript::normalize` → `segmenter::segment`.
 */

use anyhow::Result;
use log::{debug, info, warn};

use crate::app_config::Config;
use crate::errors::{AppError, CaptionError, ProviderError};
use crate::providers::mock::DEMO_CAPTIONS;
use crate::providers::{build_provider, MediaInput, RetryPolicy, TranscriptionProvider};
use crate::segmenter::{segment, Cue, SegmenterOptions};
use crate::transcript::{full_text, normalize, ProviderResponse};

/// Captions served when the provider stays unreachable
pub const FALLBACK_CAPTIONS: [(f64, f64, &str); 4] = [
    (0.0, 2.5, "Welcome to the Remotion Captioning Platform"),
    (2.5, 5.0, "OpenAI API is currently unavailable"),
    (5.0, 7.5, "These are fallback captions"),
    (7.5, 10.0, "Please try again later or contact support"),
];

fn cues_from_table(table: &[(f64, f64, &str)]) -> Vec<Cue> {
    table.iter().map(|(start, end, text)| Cue::new(*text, *start, *end)).collect()
}

/// Static cue list used when a transcript has no words
pub fn placeholder_cues() -> Vec<Cue> {
    cues_from_table(&DEMO_CAPTIONS)
}

/// Static cue list used when the provider is unavailable
pub fn fallback_cues() -> Vec<Cue> {
    cues_from_table(&FALLBACK_CAPTIONS)
}

/// Where a cue list came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptionSource {
    /// Segmented from the provider's transcript
    Transcribed,
    /// Transcript was empty, placeholder captions used
    Placeholder,
    /// Provider unreachable, fallback captions used
    Fallback,
}

/// Output of the pipeline for one media item
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionResult {
    pub cues: Vec<Cue>,
    pub source: CaptionSource,
    /// Plain transcript text, empty for placeholder and fallback captions
    pub transcript: String,
}

impl CaptionResult {
    fn placeholder() -> Self {
        Self {
            cues: placeholder_cues(),
            source: CaptionSource::Placeholder,
            transcript: String::new(),
        }
    }

    fn fallback() -> Self {
        Self {
            cues: fallback_cues(),
            source: CaptionSource::Fallback,
            transcript: String::new(),
        }
    }

    /// End of the last cue
    pub fn duration(&self) -> f64 {
        crate::timeline::total_duration(&self.cues)
    }
}

/// Generates captions for media through a transcription provider
#[derive(Debug)]
pub struct CaptionService {
    provider: Box<dyn TranscriptionProvider>,
    retry: RetryPolicy,
    options: SegmenterOptions,
    fallback_on_unavailable: bool,
}

impl CaptionService {
    pub fn new(provider: Box<dyn TranscriptionProvider>, retry: RetryPolicy, options: SegmenterOptions) -> Self {
        Self {
            provider,
            retry,
            options,
            fallback_on_unavailable: false,
        }
    }

    /// Build the service and its provider from configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let provider = build_provider(&config.transcription)?;
        Ok(Self::new(
            provider,
            RetryPolicy::from_config(&config.transcription),
            config.captions.segmenter_options(),
        )
        .with_fallback_on_unavailable(config.transcription.common.fallback_on_unavailable))
    }

    /// Serve fallback captions instead of failing when retries run out
    pub fn with_fallback_on_unavailable(mut self, enabled: bool) -> Self {
        self.fallback_on_unavailable = enabled;
        self
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Transcribe `media` and turn the result into cues
    pub async fn generate(&self, media: &MediaInput) -> Result<CaptionResult, AppError> {
        let provider = self.provider.as_ref();
        info!("Transcribing {} with {}", media.file_name, provider.name());

        let response = match self.retry.run(provider.name(), || provider.transcribe(media)).await {
            Ok(response) => response,
            Err(ProviderError::ProviderUnavailable { attempts, message }) if self.fallback_on_unavailable => {
                warn!("{} unavailable after {} attempts ({}), using fallback captions", provider.name(), attempts, message);
                return Ok(CaptionResult::fallback());
            }
            Err(ProviderError::Malformed(e)) => return Err(AppError::Caption(e)),
            Err(e) => return Err(e.into()),
        };

        Ok(self.captions_from_response(response)?)
    }

    /// Normalize and segment a provider response.
    ///
    /// Segment-level responses keep one cue per segment. An empty transcript
    /// yields the placeholder captions.
    pub fn captions_from_response(&self, response: ProviderResponse) -> Result<CaptionResult, CaptionError> {
        let options = if response.is_coarse() {
            SegmenterOptions::coarse()
        } else {
            self.options.clone()
        };

        match normalize(response) {
            Ok(words) => {
                let cues = segment(&words, &options);
                debug!("Built {} cues from {} words", cues.len(), words.len());
                for (index, cue) in cues.iter().enumerate().filter(|(_, c)| !c.is_valid()) {
                    warn!(
                        "Cue {} has no usable span ({:.3}s - {:.3}s) and will not be shown during playback",
                        index + 1, cue.start, cue.end
                    );
                }
                Ok(CaptionResult {
                    cues,
                    source: CaptionSource::Transcribed,
                    transcript: full_text(&words),
                })
            }
            Err(CaptionError::EmptyTranscript) => {
                warn!("Transcript is empty, using placeholder captions");
                Ok(CaptionResult::placeholder())
            }
            Err(e) => Err(e),
        }
    }
}
