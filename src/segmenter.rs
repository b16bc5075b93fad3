/*!
 * Caption segmentation.
 *
 * Groups an ordered word sequence into caption cues with a greedy forward scan:
 * a cue closes when it holds `max_words` words, when a word ends a sentence, or
 * when the transcript runs out.
 */

use log::debug;
use serde::{Deserialize, Serialize};

use crate::transcript::Word;

/// Default maximum number of words shown in one caption
pub const DEFAULT_MAX_WORDS: usize = 7;

/// A single timed caption unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cue {
    /// Display text
    pub text: String,
    /// Start time in seconds
    pub start: f64,
    /// End time in seconds
    pub end: f64,
    /// Words the cue was built from, empty for manual or parsed cues
    #[serde(default)]
    pub words: Vec<Word>,
}

impl Cue {
    /// Create a cue without word timing
    pub fn new(text: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            text: text.into(),
            start,
            end,
            words: Vec::new(),
        }
    }

    /// Build a cue spanning a non-empty run of words
    pub fn from_words(words: Vec<Word>) -> Option<Self> {
        let start = words.first()?.start;
        let end = words.last()?.end;
        let text = words.iter().map(|w| w.text.as_str()).collect::<Vec<_>>().join(" ");
        Some(Self { text, start, end, words })
    }

    /// Cue duration in seconds
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Whether the cue has a usable time span
    pub fn is_valid(&self) -> bool {
        self.start.is_finite() && self.end.is_finite() && self.start >= 0.0 && self.end > self.start
    }

    /// Whether `t` falls inside `[start, end)`
    pub fn contains(&self, t: f64) -> bool {
        t >= self.start && t < self.end
    }
}

/// Knobs for the segmentation scan
#[derive(Debug, Clone, PartialEq)]
pub struct SegmenterOptions {
    /// Close a cue once it holds this many words
    pub max_words: usize,
    /// Close a cue after a word ending in `.`, `!` or `?`
    pub split_on_punctuation: bool,
}

impl Default for SegmenterOptions {
    fn default() -> Self {
        Self {
            max_words: DEFAULT_MAX_WORDS,
            split_on_punctuation: true,
        }
    }
}

impl SegmenterOptions {
    /// One cue per unit, used when the "words" are really whole sentences
    pub fn coarse() -> Self {
        Self {
            max_words: 1,
            split_on_punctuation: false,
        }
    }

    pub fn with_max_words(mut self, max_words: usize) -> Self {
        self.max_words = max_words;
        self
    }
}

/// True when the raw token ends a sentence.
///
/// Only the final character is checked, so `"done."` closes a cue but a
/// quoted `"done.""` does not.
pub fn ends_sentence(text: &str) -> bool {
    matches!(text.chars().last(), Some('.' | '!' | '?'))
}

/// Group words into cues
pub fn segment(words: &[Word], options: &SegmenterOptions) -> Vec<Cue> {
    let max_words = options.max_words.max(1);
    let mut cues = Vec::new();
    let mut buffer: Vec<Word> = Vec::with_capacity(max_words);

    for (index, word) in words.iter().enumerate() {
        buffer.push(word.clone());

        let is_last = index == words.len() - 1;
        let full = buffer.len() >= max_words;
        let sentence_end = options.split_on_punctuation && ends_sentence(&word.text);

        if full || sentence_end || is_last {
            if let Some(cue) = Cue::from_words(std::mem::take(&mut buffer)) {
                cues.push(cue);
            }
        }
    }

    debug!("Segmented {} words into {} cues", words.len(), cues.len());
    cues
}
