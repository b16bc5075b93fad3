use std::fmt;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use regex::Regex;
use once_cell::sync::Lazy;
use anyhow::{Result, Context};
use log::{warn, debug};
use serde::{Deserialize, Serialize};

use crate::errors::CaptionError;
use crate::segmenter::Cue;

// @module: Subtitle serialization and parsing (SRT and WebVTT)

// @const: Cue timing line, either separator, optional hours, trailing VTT settings allowed
static TIMING_LINE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*((?:\d+:)?\d{2}:\d{2}[,.]\d{3})\s*-->\s*((?:\d+:)?\d{2}:\d{2}[,.]\d{3})(?:\s.*)?$")
        .expect("timing line regex is valid")
});

// @const: Single timestamp
static TIMESTAMP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:(\d+):)?(\d{2}):(\d{2})[,.](\d{3})$").expect("timestamp regex is valid")
});

/// Header line every WebVTT file starts with
pub const VTT_HEADER: &str = "WEBVTT";

/// Supported subtitle interchange formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubtitleFormat {
    #[default]
    Srt,
    Vtt,
}

impl SubtitleFormat {
    /// File extension without the dot
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Srt => "srt",
            Self::Vtt => "vtt",
        }
    }

    /// Fractional separator used in timestamps
    pub fn separator(&self) -> char {
        match self {
            Self::Srt => ',',
            Self::Vtt => '.',
        }
    }

    /// Guess the format from a file extension
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, CaptionError> {
        let ext = path.as_ref()
            .extension()
            .map(|e| e.to_string_lossy().to_string())
            .unwrap_or_default();
        ext.parse()
    }
}

impl fmt::Display for SubtitleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}

impl std::str::FromStr for SubtitleFormat {
    type Err = CaptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "srt" => Ok(Self::Srt),
            "vtt" | "webvtt" => Ok(Self::Vtt),
            _ => Err(CaptionError::UnsupportedExportFormat(s.to_string())),
        }
    }
}

/// Convert seconds to whole milliseconds, rounding to nearest
pub fn seconds_to_ms(seconds: f64) -> u64 {
    if seconds.is_finite() && seconds > 0.0 {
        (seconds * 1000.0).round() as u64
    } else {
        0
    }
}

/// Format milliseconds as `HH:MM:SS<sep>mmm`; hours grow past two digits as needed
pub fn format_timestamp(ms: u64, separator: char) -> String {
    let hours = ms / 3_600_000;
    let minutes = (ms % 3_600_000) / 60_000;
    let seconds = (ms % 60_000) / 1_000;
    let millis = ms % 1_000;

    format!("{:02}:{:02}:{:02}{}{:03}", hours, minutes, seconds, separator, millis)
}

/// Parse `HH:MM:SS,mmm`, `HH:MM:SS.mmm` or `MM:SS.mmm` into milliseconds
pub fn parse_timestamp(timestamp: &str) -> Result<u64, CaptionError> {
    let caps = TIMESTAMP_REGEX.captures(timestamp.trim())
        .ok_or_else(|| CaptionError::ParseError(format!("Invalid timestamp format: {}", timestamp)))?;

    let invalid = || CaptionError::ParseError(format!("Invalid time components in timestamp: {}", timestamp));
    let field = |i: usize| -> Result<u64, CaptionError> {
        match caps.get(i) {
            Some(m) => m.as_str().parse().map_err(|_| invalid()),
            None => Ok(0),
        }
    };
    let (hours, minutes, seconds, millis) = (field(1)?, field(2)?, field(3)?, field(4)?);

    if minutes >= 60 || seconds >= 60 {
        return Err(invalid());
    }

    hours
        .checked_mul(3_600_000)
        .and_then(|ms| ms.checked_add(minutes * 60_000 + seconds * 1_000 + millis))
        .ok_or_else(invalid)
}

/// Cue text as SRT and WebVTT can carry it.
///
/// A blank line ends a cue block and surrounding whitespace is not kept by
/// readers, so each line is trimmed and empty lines are dropped. Parsing a
/// rendered document yields exactly this text.
pub fn normalize_cue_text(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn write_block(out: &mut String, seq_num: usize, cue: &Cue, separator: char) {
    let start = format_timestamp(seconds_to_ms(cue.start), separator);
    let end = format_timestamp(seconds_to_ms(cue.end), separator);
    let text = normalize_cue_text(&cue.text);
    if text != cue.text {
        debug!("Normalized text of cue {} for export", seq_num);
    }
    // Writing into a String cannot fail
    let _ = write!(out, "{}\n{} --> {}\n{}\n\n", seq_num, start, end, text);
}

/// Render cues as an SRT document
pub fn to_srt(cues: &[Cue]) -> String {
    let mut out = String::new();
    for (i, cue) in cues.iter().enumerate() {
        write_block(&mut out, i + 1, cue, SubtitleFormat::Srt.separator());
    }
    out
}

/// Render cues as a WebVTT document
pub fn to_vtt(cues: &[Cue]) -> String {
    let mut out = format!("{}\n\n", VTT_HEADER);
    for (i, cue) in cues.iter().enumerate() {
        write_block(&mut out, i + 1, cue, SubtitleFormat::Vtt.separator());
    }
    out
}

/// Render cues in the requested format
pub fn render(cues: &[Cue], format: SubtitleFormat) -> String {
    match format {
        SubtitleFormat::Srt => to_srt(cues),
        SubtitleFormat::Vtt => to_vtt(cues),
    }
}

/// Parse SRT text into cues. Word timing is not recoverable, so `words` stays empty.
pub fn parse_srt(content: &str) -> Result<Vec<Cue>, CaptionError> {
    parse_blocks(content)
}

/// Parse WebVTT text into cues. The `WEBVTT` header is required.
pub fn parse_vtt(content: &str) -> Result<Vec<Cue>, CaptionError> {
    if !strip_bom(content).trim_start().starts_with(VTT_HEADER) {
        return Err(CaptionError::ParseError("Missing WEBVTT header".to_string()));
    }
    parse_blocks(content)
}

/// Parse either format, picking WebVTT when the header is present
pub fn parse(content: &str) -> Result<Vec<Cue>, CaptionError> {
    if detect_format(content) == SubtitleFormat::Vtt {
        parse_vtt(content)
    } else {
        parse_srt(content)
    }
}

/// Sniff the format of subtitle text
pub fn detect_format(content: &str) -> SubtitleFormat {
    if strip_bom(content).trim_start().starts_with(VTT_HEADER) {
        SubtitleFormat::Vtt
    } else {
        SubtitleFormat::Srt
    }
}

fn strip_bom(content: &str) -> &str {
    content.strip_prefix('\u{feff}').unwrap_or(content)
}

/// Shared block parser.
///
/// Outside a cue, any line with a timing arrow opens a new cue and everything
/// else (sequence numbers, VTT identifiers, headers, NOTE blocks) is skipped.
/// Inside a cue, lines are text until a blank line closes it.
fn parse_blocks(content: &str) -> Result<Vec<Cue>, CaptionError> {
    let mut cues = Vec::new();
    let mut current: Option<(u64, u64, Vec<String>)> = None;

    for (line_idx, line) in strip_bom(content).lines().enumerate() {
        let trimmed = line.trim();

        if current.is_some() {
            if trimmed.is_empty() {
                if let Some((start_ms, end_ms, text_lines)) = current.take() {
                    cues.push(make_cue(start_ms, end_ms, &text_lines));
                }
            } else if let Some((_, _, text_lines)) = current.as_mut() {
                text_lines.push(trimmed.to_string());
            }
            continue;
        }

        if !trimmed.contains("-->") {
            continue;
        }

        let caps = TIMING_LINE_REGEX.captures(trimmed).ok_or_else(|| {
            CaptionError::ParseError(format!("Invalid timing line {}: {}", line_idx + 1, trimmed))
        })?;
        let start_ms = parse_timestamp(&caps[1])?;
        let end_ms = parse_timestamp(&caps[2])?;
        current = Some((start_ms, end_ms, Vec::new()));
    }

    if let Some((start_ms, end_ms, text_lines)) = current.as_ref() {
        cues.push(make_cue(*start_ms, *end_ms, text_lines));
    }

    // Sort by start time to ensure correct order
    cues.sort_by(|a, b| a.start.total_cmp(&b.start));

    let invalid = cues.iter().filter(|c| !c.is_valid()).count();
    if invalid > 0 {
        warn!("Found {} subtitle entries with non-positive duration", invalid);
    }
    let overlap_count = cues.windows(2).filter(|pair| pair[0].end > pair[1].start).count();
    if overlap_count > 0 {
        warn!("Found {} overlapping subtitle entries", overlap_count);
    }

    debug!("Parsed {} subtitle entries", cues.len());
    Ok(cues)
}

fn make_cue(start_ms: u64, end_ms: u64, text_lines: &[String]) -> Cue {
    Cue::new(text_lines.join("\n"), start_ms as f64 / 1000.0, end_ms as f64 / 1000.0)
}

/// Cue list with the file it belongs to
#[derive(Debug, Clone)]
pub struct SubtitleCollection {
    /// Source filename
    pub source_file: PathBuf,

    /// Caption cues
    pub cues: Vec<Cue>,
}

impl SubtitleCollection {
    /// Create a collection from cues
    pub fn new(source_file: PathBuf, cues: Vec<Cue>) -> Self {
        SubtitleCollection { source_file, cues }
    }

    /// Load a subtitle file, detecting the format from its contents
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read subtitle file: {}", path.display()))?;
        let cues = parse(&content)
            .with_context(|| format!("Failed to parse subtitle file: {}", path.display()))?;

        Ok(Self::new(path.to_path_buf(), cues))
    }

    /// Serialize in the requested format
    pub fn render(&self, format: SubtitleFormat) -> String {
        render(&self.cues, format)
    }

    /// Write subtitles to a file
    pub fn write_to_file<P: AsRef<Path>>(&self, path: P, format: SubtitleFormat) -> Result<()> {
        let path = path.as_ref();

        // Create parent directory if needed
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        fs::write(path, self.render(format))
            .with_context(|| format!("Failed to write subtitle file: {}", path.display()))?;

        Ok(())
    }
}

impl fmt::Display for SubtitleCollection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Subtitle Collection")?;
        writeln!(f, "Source: {:?}", self.source_file)?;
        writeln!(f, "Entries: {}", self.cues.len())?;
        Ok(())
    }
}
