/*!
 * Integration tests for subtitle file workflows: convert, edit and preview
 */

use anyhow::Result;

use captioneer::app_controller::{Controller, EditOperation};
use captioneer::editor::{TimeField, ValidationIssue};
use captioneer::file_utils::FileManager;
use captioneer::segmenter::Cue;
use captioneer::subtitle_processor::{SubtitleCollection, SubtitleFormat};
use captioneer::timeline::CaptionStyle;
use crate::common;

#[test]
fn test_convert_srtToVtt_shouldKeepCues() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let srt = common::create_test_subtitle(temp_dir.path(), "talk.srt")?;

    let output = Controller::convert(&srt, SubtitleFormat::Vtt, None, false)?;
    assert_eq!(output, temp_dir.path().join("talk.vtt"));

    let content = FileManager::read_to_string(&output)?;
    assert!(content.starts_with("WEBVTT\n\n"));
    assert!(content.contains("00:00:05.000 --> 00:00:09.000\nIt contains multiple entries."));

    let original = SubtitleCollection::from_file(&srt)?;
    let converted = SubtitleCollection::from_file(&output)?;
    assert_eq!(original.cues, converted.cues);
    Ok(())
}

#[test]
fn test_convert_withExistingOutput_shouldRequireForce() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let srt = common::create_test_subtitle(temp_dir.path(), "talk.srt")?;
    let target = common::create_test_file(temp_dir.path(), "out.vtt", "old")?;

    assert!(Controller::convert(&srt, SubtitleFormat::Vtt, Some(target.clone()), false).is_err());
    assert_eq!(FileManager::read_to_string(&target)?, "old");

    Controller::convert(&srt, SubtitleFormat::Vtt, Some(target.clone()), true)?;
    assert!(FileManager::read_to_string(&target)?.starts_with("WEBVTT"));
    Ok(())
}

#[test]
fn test_edit_setText_shouldRewriteFileInSameFormat() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let srt = common::create_test_subtitle(temp_dir.path(), "talk.srt")?;

    let issues = Controller::edit(&srt, EditOperation::SetText(1, "Namaste dosto".to_string()))?;
    assert!(issues.is_empty());

    let content = FileManager::read_to_string(&srt)?;
    assert!(!content.starts_with("WEBVTT"));
    let cues = SubtitleCollection::from_file(&srt)?.cues;
    assert_eq!(cues[1], Cue::new("Namaste dosto", 5.0, 9.0));
    Ok(())
}

#[test]
fn test_edit_onVttFile_shouldStayVtt() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let srt = common::create_test_subtitle(temp_dir.path(), "talk.srt")?;
    let vtt = Controller::convert(&srt, SubtitleFormat::Vtt, None, false)?;

    Controller::edit(&vtt, EditOperation::Append)?;

    let content = FileManager::read_to_string(&vtt)?;
    assert!(content.starts_with("WEBVTT"));
    let cues = SubtitleCollection::from_file(&vtt)?.cues;
    assert_eq!(cues.len(), 4);
    assert_eq!(cues[3], Cue::new("New caption", 14.0, 17.0));
    Ok(())
}

#[test]
fn test_edit_retimeIntoNeighbour_shouldSaveAndReportOverlap() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let srt = common::create_test_subtitle(temp_dir.path(), "talk.srt")?;

    let issues = Controller::edit(&srt, EditOperation::Retime(0, TimeField::End, 6.0))?;
    assert_eq!(issues, vec![ValidationIssue::Overlap { first: 0, second: 1 }]);
    assert_eq!(SubtitleCollection::from_file(&srt)?.cues[0].end, 6.0);
    Ok(())
}

#[test]
fn test_edit_withInvalidRetime_shouldLeaveFileUntouched() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let srt = common::create_test_subtitle(temp_dir.path(), "talk.srt")?;

    assert!(Controller::edit(&srt, EditOperation::Retime(2, TimeField::Start, 20.0)).is_err());
    assert!(Controller::edit(&srt, EditOperation::Delete(7)).is_err());
    assert_eq!(FileManager::read_to_string(&srt)?, common::SAMPLE_SRT);
    Ok(())
}

#[test]
fn test_edit_check_shouldNotRewriteFile() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let srt = common::create_test_subtitle(temp_dir.path(), "talk.srt")?;

    let issues = Controller::edit(&srt, EditOperation::Check)?;
    assert!(issues.is_empty());
    assert_eq!(FileManager::read_to_string(&srt)?, common::SAMPLE_SRT);
    Ok(())
}

#[test]
fn test_edit_insertThenDelete_shouldRoundTrip() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let srt = common::create_test_subtitle(temp_dir.path(), "talk.srt")?;
    let before = SubtitleCollection::from_file(&srt)?.cues;

    Controller::edit(&srt, EditOperation::InsertAfter(0))?;
    let inserted = SubtitleCollection::from_file(&srt)?.cues;
    assert_eq!(inserted.len(), 4);
    assert_eq!(inserted[1], Cue::new("New caption", 4.0, 7.0));

    Controller::edit(&srt, EditOperation::Delete(1))?;
    assert_eq!(SubtitleCollection::from_file(&srt)?.cues, before);
    Ok(())
}

#[test]
fn test_preview_shouldResolveCueAndKaraokeWord() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let srt = common::create_test_subtitle(temp_dir.path(), "talk.srt")?;

    let frame = Controller::preview(&srt, 6.0, CaptionStyle::Bottom)?.expect("cue at 6s");
    assert_eq!(frame.cue_index, 1);
    assert_eq!(frame.text, "It contains multiple entries.");
    assert_eq!(frame.active_word, None);

    // "This is a test subtitle." spans 1s..4s, 0.6s per word
    let frame = Controller::preview(&srt, 2.3, CaptionStyle::Karaoke)?.expect("cue at 2.3s");
    assert_eq!(frame.cue_index, 0);
    assert_eq!(frame.active_word, Some(2));

    assert!(Controller::preview(&srt, 4.5, CaptionStyle::Bottom)?.is_none());
    Ok(())
}
