/*!
 * Playback-time lookup.
 *
 * Maps a playback position to the caption on screen and, for karaoke rendering,
 * to the word currently being highlighted. Everything here is a pure function of
 * `(cues, t)` so it can be re-evaluated every frame.
 */

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

use crate::segmenter::Cue;

/// Frame rate the renderer polls at
pub const DEFAULT_FPS: u32 = 30;

/// Caption rendering mode. Has no effect on cue data.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CaptionStyle {
    #[default]
    Bottom,
    Top,
    Karaoke,
}

impl CaptionStyle {
    pub fn display_name(&self) -> &str {
        match self {
            Self::Bottom => "Bottom Centered",
            Self::Top => "Top News Bar",
            Self::Karaoke => "Karaoke",
        }
    }

    pub fn description(&self) -> &str {
        match self {
            Self::Bottom => "Classic subtitle style",
            Self::Top => "Breaking news style",
            Self::Karaoke => "Word-by-word highlight",
        }
    }

    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::Bottom => "bottom".to_string(),
            Self::Top => "top".to_string(),
            Self::Karaoke => "karaoke".to_string(),
        }
    }
}

impl std::fmt::Display for CaptionStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

impl std::str::FromStr for CaptionStyle {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "bottom" => Ok(Self::Bottom),
            "top" => Ok(Self::Top),
            "karaoke" => Ok(Self::Karaoke),
            _ => Err(anyhow!("Invalid caption style: {}", s)),
        }
    }
}

/// Highlight state of one word in a karaoke caption
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordState {
    Past,
    Active,
    Pending,
}

/// What the renderer draws for a single frame
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionFrame {
    /// Index of the active cue in the list
    pub cue_index: usize,
    /// Text to display
    pub text: String,
    /// Style the caption is drawn in
    pub style: CaptionStyle,
    /// Highlighted word, karaoke only
    pub active_word: Option<usize>,
}

/// Index of the cue covering `t`, if any.
///
/// Cues are sorted and non-overlapping, so the only candidate is the last cue
/// starting at or before `t`.
pub fn active_cue_index(cues: &[Cue], t: f64) -> Option<usize> {
    let after = cues.partition_point(|c| c.start <= t);
    let candidate = after.checked_sub(1)?;
    cues[candidate].contains(t).then_some(candidate)
}

/// The cue with `t ∈ [start, end)`, or `None` in gaps and past the end
pub fn active_cue(cues: &[Cue], t: f64) -> Option<&Cue> {
    active_cue_index(cues, t).map(|i| &cues[i])
}

/// Number of display words in a cue
pub fn display_word_count(cue: &Cue) -> usize {
    cue.text.split_whitespace().count()
}

/// Karaoke word index for `t` within `cue`.
///
/// The span is divided into equal slots per displayed word; individual word
/// timestamps are ignored even when present.
pub fn active_word_index(cue: &Cue, t: f64) -> Option<usize> {
    let n = display_word_count(cue);
    if n == 0 || !cue.contains(t) || cue.duration() <= 0.0 {
        return None;
    }

    let per_word = cue.duration() / n as f64;
    let index = ((t - cue.start) / per_word).floor();
    Some((index.max(0.0) as usize).min(n - 1))
}

/// Display words of `cue` paired with their highlight state at `t`
pub fn word_states(cue: &Cue, t: f64) -> Vec<(String, WordState)> {
    let active = active_word_index(cue, t);
    cue.text
        .split_whitespace()
        .enumerate()
        .map(|(i, word)| {
            let state = match active {
                Some(a) if i < a => WordState::Past,
                Some(a) if i == a => WordState::Active,
                Some(_) => WordState::Pending,
                None if t >= cue.end => WordState::Past,
                None => WordState::Pending,
            };
            (word.to_string(), state)
        })
        .collect()
}

/// Resolve what to draw at playback time `t`
pub fn render_frame(cues: &[Cue], t: f64, style: CaptionStyle) -> Option<CaptionFrame> {
    let cue_index = active_cue_index(cues, t)?;
    let cue = &cues[cue_index];
    let active_word = match style {
        CaptionStyle::Karaoke => active_word_index(cue, t),
        CaptionStyle::Bottom | CaptionStyle::Top => None,
    };

    Some(CaptionFrame {
        cue_index,
        text: cue.text.clone(),
        style,
        active_word,
    })
}

/// Playback time of a frame number
pub fn frame_to_seconds(frame: u64, fps: u32) -> f64 {
    frame as f64 / fps.max(1) as f64
}

/// Length of the captioned media: end of the last cue
pub fn total_duration(cues: &[Cue]) -> f64 {
    cues.last().map(|c| c.end).unwrap_or(0.0)
}

/// Frames needed to cover every cue
pub fn duration_in_frames(cues: &[Cue], fps: u32) -> u64 {
    (total_duration(cues) * fps.max(1) as f64).ceil() as u64
}

/// Format seconds as `MM:SS`
pub fn format_clock(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 { seconds.floor() as u64 } else { 0 };
    format!("{:02}:{:02}", total / 60, total % 60)
}
