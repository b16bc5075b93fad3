/*!
 * Mock transcription provider.
 *
 * Serves the demo captions when no real service is wanted, and simulates
 * different service behaviors for tests:
 * - `MockProvider::working()` - Always succeeds with the demo segments
 * - `MockProvider::intermittent(n)` - Every nth request fails with a 503
 * - `MockProvider::failing()` - Always fails with a server error
 * - `MockProvider::empty()` - Succeeds with no words at all
 */

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use serde_json::Value;

use crate::errors::ProviderError;
use crate::providers::{MediaInput, TranscriptionProvider};
use crate::transcript::{ProviderResponse, RawSegment, TimeUnit};

/// Demo captions as `(start, end, text)`
pub const DEMO_CAPTIONS: [(f64, f64, &str); 4] = [
    (0.0, 2.5, "Welcome to the Remotion Captioning Platform"),
    (2.5, 5.0, "This is a demo caption"),
    (5.0, 7.5, "Upload your video to get started"),
    (7.5, 10.0, "AI-powered captions in Hinglish"),
];

/// Behavior mode for the mock provider
#[derive(Debug, Clone, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds with the demo segments
    Working,
    /// Always succeeds with the given response
    Fixed(ProviderResponse),
    /// Answers with a raw JSON body that still has to be recognized
    RawBody(Value),
    /// Fails with a 503 on every Nth request
    Intermittent { fail_every: usize },
    /// Always fails with a server error
    Failing,
    /// Always rejects the credentials
    Unauthorized,
    /// Returns a response with no words
    Empty,
    /// Simulates slow response (for timeout testing)
    Slow { delay_ms: u64 },
}

/// Mock provider for demos and tests
#[derive(Debug)]
pub struct MockProvider {
    /// Behavior mode
    behavior: MockBehavior,
    /// Request counter, shared between clones
    request_count: Arc<AtomicUsize>,
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Create a working mock provider that serves the demo captions
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create a mock that always answers with `response`
    pub fn with_response(response: ProviderResponse) -> Self {
        Self::new(MockBehavior::Fixed(response))
    }

    /// Create a mock whose answer is read like a real provider body
    pub fn with_body(body: Value) -> Self {
        Self::new(MockBehavior::RawBody(body))
    }

    /// Create an intermittently failing mock provider
    pub fn intermittent(fail_every: usize) -> Self {
        Self::new(MockBehavior::Intermittent { fail_every: fail_every.max(1) })
    }

    /// Create a failing mock provider that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create a mock that rejects every request as unauthorized
    pub fn unauthorized() -> Self {
        Self::new(MockBehavior::Unauthorized)
    }

    /// Create a mock that returns an empty transcript
    pub fn empty() -> Self {
        Self::new(MockBehavior::Empty)
    }

    /// Number of requests received so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// The demo captions as sentence segments
    pub fn demo_response() -> ProviderResponse {
        ProviderResponse::Segments(
            DEMO_CAPTIONS
                .iter()
                .map(|(start, end, text)| RawSegment {
                    start: *start,
                    end: *end,
                    text: text.to_string(),
                })
                .collect(),
        )
    }
}

impl Clone for MockProvider {
    fn clone(&self) -> Self {
        Self {
            behavior: self.behavior.clone(),
            request_count: Arc::clone(&self.request_count),
        }
    }
}

#[async_trait]
impl TranscriptionProvider for MockProvider {
    async fn transcribe(&self, _media: &MediaInput) -> Result<ProviderResponse, ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);

        match &self.behavior {
            MockBehavior::Working => Ok(Self::demo_response()),

            MockBehavior::Fixed(response) => Ok(response.clone()),

            MockBehavior::RawBody(body) => Ok(ProviderResponse::from_json(body, TimeUnit::Seconds, None)?),

            MockBehavior::Intermittent { fail_every } => {
                if count % fail_every == fail_every - 1 {
                    Err(ProviderError::ApiError {
                        message: format!("Simulated intermittent failure (request #{})", count + 1),
                        status_code: 503,
                    })
                } else {
                    Ok(Self::demo_response())
                }
            }

            MockBehavior::Failing => Err(ProviderError::ApiError {
                message: "Simulated provider failure".to_string(),
                status_code: 500,
            }),

            MockBehavior::Unauthorized => Err(ProviderError::from_status(401, "Invalid API key")),

            MockBehavior::Empty => Ok(ProviderResponse::Words {
                words: Vec::new(),
                unit: TimeUnit::Seconds,
            }),

            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(tokio::time::Duration::from_millis(*delay_ms)).await;
                Ok(Self::demo_response())
            }
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}
