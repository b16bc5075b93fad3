/*!
 * Tests for cue list editing
 */

use captioneer::editor::{CaptionEditor, TimeField, ValidationIssue, DEFAULT_CUE_SPAN, PLACEHOLDER_TEXT};
use captioneer::segmenter::Cue;
use captioneer::CaptionError;

fn sample_editor() -> CaptionEditor {
    CaptionEditor::new(vec![
        Cue::new("Welcome", 0.0, 2.5),
        Cue::new("Second", 2.5, 5.0),
        Cue::new("Third", 6.0, 8.0),
    ])
}

#[test]
fn test_insert_afterMiddleCue_shouldStartAtPreviousEnd() {
    let mut editor = sample_editor();
    let index = editor.insert(Some(1), None).unwrap();

    assert_eq!(index, 2);
    assert_eq!(editor.len(), 4);
    let inserted = &editor.cues()[2];
    assert_eq!(inserted.text, PLACEHOLDER_TEXT);
    assert_eq!(inserted.start, 5.0);
    assert_eq!(inserted.end, 5.0 + DEFAULT_CUE_SPAN);
    assert_eq!(editor.cues()[3].text, "Third");
}

#[test]
fn test_insert_intoEmptyList_shouldStartAtZero() {
    let mut editor = CaptionEditor::new(Vec::new());
    assert_eq!(editor.insert(None, None).unwrap(), 0);
    assert_eq!(editor.cues()[0], Cue::new(PLACEHOLDER_TEXT, 0.0, 3.0));
}

#[test]
fn test_insert_withIndexPastEnd_shouldFail() {
    let mut editor = sample_editor();
    let result = editor.insert(Some(3), None);
    assert_eq!(result, Err(CaptionError::IndexOutOfRange { index: 3, len: 3 }));
    assert!(!editor.is_dirty());
}

#[test]
fn test_insert_withSuppliedInvalidCue_shouldReject() {
    let mut editor = sample_editor();
    let result = editor.insert(Some(0), Some(Cue::new("backwards", 4.0, 3.0)));
    assert!(matches!(result, Err(CaptionError::InvalidTiming { .. })));
    assert_eq!(editor.len(), 3);
}

#[test]
fn test_retime_withEndBeforeStart_shouldLeaveListUnchanged() {
    let mut editor = sample_editor();
    let result = editor.retime(0, TimeField::End, 0.0);

    assert!(matches!(result, Err(CaptionError::InvalidTiming { index: 0, .. })));
    assert_eq!(editor.cues()[0].end, 2.5);
    assert!(!editor.is_dirty());
}

#[test]
fn test_retime_withNegativeStart_shouldFail() {
    let mut editor = sample_editor();
    assert!(editor.retime(1, TimeField::Start, -1.0).is_err());
    assert!(editor.retime(1, TimeField::Start, f64::NAN).is_err());
}

#[test]
fn test_retime_intoNeighbour_shouldBeReportedByValidate() {
    let mut editor = sample_editor();
    editor.retime(0, TimeField::End, 3.0).unwrap();

    assert_eq!(editor.validate(), vec![ValidationIssue::Overlap { first: 0, second: 1 }]);
}

#[test]
fn test_delete_shouldReturnRemovedCue() {
    let mut editor = sample_editor();
    let removed = editor.delete(0).unwrap();

    assert_eq!(removed.text, "Welcome");
    assert_eq!(editor.cues()[0].text, "Second");
    assert!(editor.delete(5).is_err());
}

#[test]
fn test_reset_afterEdits_shouldRestoreOriginal() {
    let mut editor = sample_editor();
    editor.set_text(2, "Changed").unwrap();
    editor.append();
    assert!(editor.is_dirty());

    editor.reset();
    assert!(!editor.is_dirty());
    assert_eq!(editor.commit(), sample_editor().commit());
}

#[test]
fn test_commit_afterAppend_shouldHandBackEditedList() {
    let mut editor = sample_editor();
    let index = editor.append();
    let cues = editor.commit();

    assert_eq!(index, 3);
    assert_eq!(cues[3].start, 8.0);
    assert_eq!(cues[3].end, 11.0);
}
