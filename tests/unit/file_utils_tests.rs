/*!
 * Tests for file utility functions
 */

use anyhow::Result;
use std::fs;
use captioneer::file_utils::{format_file_size, FileManager, FileType};
use crate::common;

/// Test directory creation
#[test]
fn test_ensure_dir_withNestedPath_shouldCreateDirectories() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let nested = temp_dir.path().join("a").join("b");

    FileManager::ensure_dir(&nested)?;
    assert!(FileManager::dir_exists(&nested));
    // Second call is a no-op
    FileManager::ensure_dir(&nested)?;
    Ok(())
}

#[test]
fn test_find_media_files_withMixedDirectory_shouldReturnSortedMedia() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let sub = temp_dir.path().join("day2");
    fs::create_dir(&sub)?;

    common::create_fake_video(temp_dir.path(), "b.mp4")?;
    common::create_fake_video(temp_dir.path(), "a.MOV")?;
    common::create_fake_video(&sub, "c.webm")?;
    common::create_test_file(temp_dir.path(), "notes.txt", "hello")?;
    common::create_test_subtitle(temp_dir.path(), "b.srt")?;

    let files = FileManager::find_media_files(temp_dir.path())?;
    let names: Vec<String> = files
        .iter()
        .map(|p| p.strip_prefix(temp_dir.path()).unwrap().to_string_lossy().replace('\\', "/"))
        .collect();
    assert_eq!(names, vec!["a.MOV", "b.mp4", "day2/c.webm"]);

    let subtitles = FileManager::find_files(temp_dir.path(), "srt")?;
    assert_eq!(subtitles.len(), 1);
    Ok(())
}

#[test]
fn test_detect_file_type_shouldUseExtensionThenContent() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let video = common::create_fake_video(temp_dir.path(), "clip.mkv")?;
    let audio = common::create_fake_video(temp_dir.path(), "voice.m4a")?;
    let srt = common::create_test_subtitle(temp_dir.path(), "clip.srt")?;
    let sniffed = common::create_test_file(temp_dir.path(), "captions.txt", common::SAMPLE_SRT)?;
    let other = common::create_test_file(temp_dir.path(), "notes.txt", "just notes")?;

    assert_eq!(FileManager::detect_file_type(&video)?, FileType::Video);
    assert_eq!(FileManager::detect_file_type(&audio)?, FileType::Audio);
    assert_eq!(FileManager::detect_file_type(&srt)?, FileType::Subtitle);
    assert_eq!(FileManager::detect_file_type(&sniffed)?, FileType::Subtitle);
    assert_eq!(FileManager::detect_file_type(&other)?, FileType::Unknown);
    assert!(FileManager::detect_file_type(temp_dir.path().join("missing.mp4")).is_err());
    Ok(())
}

#[test]
fn test_check_file_size_withLimit_shouldRejectLargerFiles() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "clip.mp4", &"x".repeat(2048))?;

    assert_eq!(FileManager::check_file_size(&path, 4096)?, 2048);
    let err = FileManager::check_file_size(&path, 1024).unwrap_err();
    assert!(err.to_string().contains("2 KB"));
    Ok(())
}

#[test]
fn test_write_to_file_withMissingParent_shouldCreateIt() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("out").join("talk.srt");

    FileManager::write_to_file(&path, "content")?;
    assert!(FileManager::file_exists(&path));
    assert_eq!(FileManager::read_to_string(&path)?, "content");
    Ok(())
}

#[test]
fn test_format_file_size_withFractionalMegabytes_shouldRoundToTwoDecimals() {
    assert_eq!(format_file_size(25_000_000), "23.84 MB");
}
