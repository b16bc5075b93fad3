/*!
 * Transcript normalization.
 *
 * Transcription providers answer in one of three shapes: word-level timestamps,
 * sentence-level segments, or bare text with no timing at all. This module turns
 * any of them into a single ordered sequence of timed words.
 */

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::CaptionError;

/// A single timed token, in seconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    /// Display text of the token
    pub text: String,
    /// Start time in seconds
    pub start: f64,
    /// End time in seconds
    pub end: f64,
}

impl Word {
    /// Create a word, clamping times so that `end >= start >= 0`
    pub fn new(text: impl Into<String>, start: f64, end: f64) -> Self {
        let start = clamp_time(start);
        let end = clamp_time(end).max(start);
        Self {
            text: text.into(),
            start,
            end,
        }
    }

    /// Duration of the word in seconds
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Ordered words covering a whole media item
pub type Transcript = Vec<Word>;

/// Unit of the timestamps in a word-level response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    #[default]
    Seconds,
    Milliseconds,
}

impl TimeUnit {
    fn to_seconds(self, value: f64) -> f64 {
        match self {
            Self::Seconds => value,
            Self::Milliseconds => value / 1000.0,
        }
    }
}

/// Word entry as providers send it. Whisper uses `word`, AssemblyAI uses `text`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawWord {
    #[serde(alias = "word")]
    pub text: String,
    pub start: f64,
    pub end: f64,
}

/// Sentence-level segment without per-word timing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSegment {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

/// Everything a transcription provider can hand back
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderResponse {
    /// Word-level timestamps
    Words {
        words: Vec<RawWord>,
        unit: TimeUnit,
    },
    /// Coarse sentence-level timing
    Segments(Vec<RawSegment>),
    /// Untimed text plus an estimated media duration in seconds
    Text {
        text: String,
        duration: f64,
    },
}

impl ProviderResponse {
    /// Recognize one of the three response shapes in a raw JSON body.
    ///
    /// Word-level data wins over segments, and segments win over bare text.
    /// A bare text body needs `duration_hint` since there is nothing else to
    /// spread the words over.
    pub fn from_json(value: &Value, unit: TimeUnit, duration_hint: Option<f64>) -> Result<Self, CaptionError> {
        let words = value.get("words").and_then(Value::as_array);
        let segments = value.get("segments").and_then(Value::as_array);
        let text = value.get("text").and_then(Value::as_str);

        if let Some(words) = words.filter(|w| !w.is_empty()) {
            let words = words
                .iter()
                .map(|w| serde_json::from_value::<RawWord>(w.clone()))
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| CaptionError::MalformedProviderResponse(format!("invalid word entry: {}", e)))?;
            return Ok(Self::Words { words, unit });
        }

        if let Some(segments) = segments.filter(|s| !s.is_empty()) {
            let segments = segments
                .iter()
                .map(|s| serde_json::from_value::<RawSegment>(s.clone()))
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| CaptionError::MalformedProviderResponse(format!("invalid segment entry: {}", e)))?;
            return Ok(Self::Segments(segments));
        }

        match (text, duration_hint) {
            (Some(text), Some(duration)) => Ok(Self::Text {
                text: text.to_string(),
                duration,
            }),
            (Some(text), None) if text.trim().is_empty() => Ok(Self::Text {
                text: String::new(),
                duration: 0.0,
            }),
            (Some(_), None) => Err(CaptionError::MalformedProviderResponse(
                "untimed transcript text without a duration estimate".to_string(),
            )),
            (None, _) if words.is_some() || segments.is_some() => Ok(Self::Words {
                words: Vec::new(),
                unit,
            }),
            (None, _) => Err(CaptionError::MalformedProviderResponse(
                "expected one of `words`, `segments` or `text`".to_string(),
            )),
        }
    }

    /// Whether this response carries per-sentence rather than per-word units
    pub fn is_coarse(&self) -> bool {
        matches!(self, Self::Segments(_))
    }
}

/// Convert any provider response into ordered timed words.
///
/// Empty tokens are dropped and the output is sorted by start time. Returns
/// `EmptyTranscript` when nothing is left.
pub fn normalize(response: ProviderResponse) -> Result<Transcript, CaptionError> {
    let mut words: Vec<Word> = match response {
        ProviderResponse::Words { words, unit } => words
            .into_iter()
            .filter_map(|w| {
                let text = w.text.trim();
                if text.is_empty() {
                    None
                } else {
                    Some(Word::new(text, unit.to_seconds(w.start), unit.to_seconds(w.end)))
                }
            })
            .collect(),

        ProviderResponse::Segments(segments) => segments
            .into_iter()
            .filter_map(|s| {
                let text = s.text.trim();
                if text.is_empty() {
                    None
                } else {
                    Some(Word::new(text, s.start, s.end))
                }
            })
            .collect(),

        ProviderResponse::Text { text, duration } => {
            let tokens: Vec<&str> = text.split_whitespace().collect();
            if tokens.is_empty() {
                return Err(CaptionError::EmptyTranscript);
            }
            if !duration.is_finite() || duration <= 0.0 {
                return Err(CaptionError::MalformedProviderResponse(format!(
                    "cannot spread {} words over a duration of {}s",
                    tokens.len(),
                    duration
                )));
            }
            let step = duration / tokens.len() as f64;
            tokens
                .iter()
                .enumerate()
                .map(|(i, token)| Word::new(*token, i as f64 * step, (i + 1) as f64 * step))
                .collect()
        }
    };

    if words.is_empty() {
        warn!("Transcript normalization produced no words");
        return Err(CaptionError::EmptyTranscript);
    }

    // Stable, so words sharing a start keep provider order
    words.sort_by(|a, b| a.start.total_cmp(&b.start));
    debug!("Normalized transcript into {} words", words.len());

    Ok(words)
}

/// Space-joined text of a transcript
pub fn full_text(words: &[Word]) -> String {
    words.iter().map(|w| w.text.as_str()).collect::<Vec<_>>().join(" ")
}

fn clamp_time(t: f64) -> f64 {
    if t.is_finite() && t > 0.0 { t } else { 0.0 }
}
