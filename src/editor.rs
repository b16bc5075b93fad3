/*!
 * Manual caption editing.
 *
 * `CaptionEditor` owns a working copy of a cue list. Edits go through `&mut self`,
 * so there is always a single writer; wrap the editor in a mutex to share it.
 */

use log::debug;

use crate::errors::CaptionError;
use crate::segmenter::Cue;

/// Span given to a newly inserted cue, in seconds
pub const DEFAULT_CUE_SPAN: f64 = 3.0;

/// Text given to a newly inserted cue
pub const PLACEHOLDER_TEXT: &str = "New caption";

/// Which end of a cue a retime touches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeField {
    Start,
    End,
}

/// Problem found by [`CaptionEditor::validate`]
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationIssue {
    /// Cue has `end <= start` or a negative start
    InvalidTiming { index: usize },
    /// Cue `first` ends after cue `second` starts
    Overlap { first: usize, second: usize },
}

/// A cue with a non-negative start and a positive duration
pub fn is_valid_cue(cue: &Cue) -> bool {
    cue.is_valid()
}

/// Working copy of a cue list with undo-all support
#[derive(Debug, Clone)]
pub struct CaptionEditor {
    original: Vec<Cue>,
    cues: Vec<Cue>,
}

impl CaptionEditor {
    pub fn new(cues: Vec<Cue>) -> Self {
        Self {
            original: cues.clone(),
            cues,
        }
    }

    /// Current cues
    pub fn cues(&self) -> &[Cue] {
        &self.cues
    }

    pub fn len(&self) -> usize {
        self.cues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }

    /// Whether the working copy differs from the list the editor started with
    pub fn is_dirty(&self) -> bool {
        self.cues != self.original
    }

    /// Insert a cue after `after_index`, or at the end when `None`.
    ///
    /// Without an explicit cue a placeholder is created that starts where the
    /// preceding cue ends (0 for an empty list) and lasts three seconds.
    /// Returns the index of the inserted cue.
    pub fn insert(&mut self, after_index: Option<usize>, new_cue: Option<Cue>) -> Result<usize, CaptionError> {
        let position = match after_index {
            Some(i) if i >= self.cues.len() => {
                return Err(CaptionError::IndexOutOfRange { index: i, len: self.cues.len() });
            }
            Some(i) => i + 1,
            None => self.cues.len(),
        };

        let cue = match new_cue {
            Some(cue) => {
                if !cue.is_valid() {
                    return Err(CaptionError::InvalidTiming { index: position, start: cue.start, end: cue.end });
                }
                cue
            }
            None => {
                let start = position
                    .checked_sub(1)
                    .map(|prev| self.cues[prev].end)
                    .unwrap_or(0.0);
                Cue::new(PLACEHOLDER_TEXT, start, start + DEFAULT_CUE_SPAN)
            }
        };

        debug!("Inserting cue at {} ({:.3}s - {:.3}s)", position, cue.start, cue.end);
        self.cues.insert(position, cue);
        Ok(position)
    }

    /// Append a placeholder cue after the last one
    pub fn append(&mut self) -> usize {
        let position = self.cues.len();
        let start = self.cues.last().map(|c| c.end).unwrap_or(0.0);
        self.cues.push(Cue::new(PLACEHOLDER_TEXT, start, start + DEFAULT_CUE_SPAN));
        position
    }

    /// Remove the cue at `index`
    pub fn delete(&mut self, index: usize) -> Result<Cue, CaptionError> {
        self.check_index(index)?;
        debug!("Deleting cue {}", index);
        Ok(self.cues.remove(index))
    }

    /// Set one end of a cue.
    ///
    /// Rejects values that would leave `end <= start` or a negative start; the
    /// list is untouched in that case. Neighbouring cues are not checked.
    pub fn retime(&mut self, index: usize, field: TimeField, value: f64) -> Result<(), CaptionError> {
        self.check_index(index)?;

        let cue = &self.cues[index];
        let (start, end) = match field {
            TimeField::Start => (value, cue.end),
            TimeField::End => (cue.start, value),
        };

        if !start.is_finite() || !end.is_finite() || start < 0.0 || end <= start {
            return Err(CaptionError::InvalidTiming { index, start, end });
        }

        let cue = &mut self.cues[index];
        cue.start = start;
        cue.end = end;
        Ok(())
    }

    /// Replace the text of a cue. Word timing no longer matches, so it is dropped.
    pub fn set_text(&mut self, index: usize, text: impl Into<String>) -> Result<(), CaptionError> {
        self.check_index(index)?;
        let cue = &mut self.cues[index];
        cue.text = text.into();
        cue.words.clear();
        Ok(())
    }

    /// Discard every edit
    pub fn reset(&mut self) {
        self.cues = self.original.clone();
    }

    /// Accept the edits and hand back the list
    pub fn commit(self) -> Vec<Cue> {
        self.cues
    }

    /// Report invalid spans and overlaps between neighbours
    pub fn validate(&self) -> Vec<ValidationIssue> {
        let mut issues: Vec<ValidationIssue> = self.cues
            .iter()
            .enumerate()
            .filter(|(_, cue)| !is_valid_cue(cue))
            .map(|(index, _)| ValidationIssue::InvalidTiming { index })
            .collect();

        issues.extend(
            self.cues
                .windows(2)
                .enumerate()
                .filter(|(_, pair)| pair[0].end > pair[1].start)
                .map(|(i, _)| ValidationIssue::Overlap { first: i, second: i + 1 }),
        );

        issues
    }

    fn check_index(&self, index: usize) -> Result<(), CaptionError> {
        if index < self.cues.len() {
            Ok(())
        } else {
            Err(CaptionError::IndexOutOfRange { index, len: self.cues.len() })
        }
    }
}
