use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

// @module: File and directory utilities

/// Largest media file accepted for captioning
pub const MAX_MEDIA_FILE_SIZE: u64 = 100 * 1024 * 1024;

/// Video containers accepted as input
pub const VIDEO_EXTENSIONS: [&str; 6] = ["mp4", "mov", "avi", "webm", "mkv", "m4v"];

/// Audio-only files the providers also accept
pub const AUDIO_EXTENSIONS: [&str; 5] = ["mp3", "m4a", "wav", "ogg", "flac"];

static SUBTITLE_SNIFF_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^(WEBVTT|(\d{2,}:)?\d{2}:\d{2}[,.]\d{3}\s+-->\s+)").expect("subtitle sniff regex is valid")
});

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_dir()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)
                .with_context(|| format!("Failed to create directory: {:?}", path))?;
        }
        Ok(())
    }

    // @generates: Output path for a caption file, `<stem>.<extension>` inside output_dir
    pub fn generate_output_path<P1: AsRef<Path>, P2: AsRef<Path>>(
        input_file: P1,
        output_dir: P2,
        extension: &str,
    ) -> PathBuf {
        let stem = input_file.as_ref().file_stem().unwrap_or_default();
        let mut output_filename = stem.to_string_lossy().to_string();
        output_filename.push('.');
        output_filename.push_str(extension.trim_start_matches('.'));
        output_dir.as_ref().join(output_filename)
    }

    /// Find files with a specific extension in a directory
    pub fn find_files<P: AsRef<Path>>(dir: P, extension: &str) -> Result<Vec<PathBuf>> {
        let extension = extension.trim_start_matches('.');
        let mut result = Vec::new();

        for entry in WalkDir::new(dir.as_ref()).follow_links(true) {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();

            if path.is_file() && Self::has_extension(path, &[extension]) {
                result.push(path.to_path_buf());
            }
        }

        result.sort();
        Ok(result)
    }

    /// Find every video or audio file below a directory, sorted by path
    pub fn find_media_files<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
        let mut result = Vec::new();

        for entry in WalkDir::new(dir.as_ref()).follow_links(true) {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();

            if path.is_file() && Self::is_media_file(path) {
                result.push(path.to_path_buf());
            }
        }

        result.sort();
        Ok(result)
    }

    /// Read a file to a string
    pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
        fs::read_to_string(&path)
            .with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    /// Read a whole media file
    pub async fn read_bytes<P: AsRef<Path>>(path: P) -> Result<Vec<u8>> {
        tokio::fs::read(&path)
            .await
            .with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    /// Write a string to a file
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        fs::write(&path, content)
            .with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Size of a media file, rejecting anything above `limit`
    pub fn check_file_size<P: AsRef<Path>>(path: P, limit: u64) -> Result<u64> {
        let path = path.as_ref();
        let size = fs::metadata(path)
            .with_context(|| format!("Failed to read metadata: {:?}", path))?
            .len();

        if size > limit {
            return Err(anyhow!(
                "File size ({}) exceeds limit of {}: {:?}",
                format_file_size(size),
                format_file_size(limit),
                path
            ));
        }
        Ok(size)
    }

    /// MIME type sent to providers, by extension
    pub fn mime_type<P: AsRef<Path>>(path: P) -> &'static str {
        let ext = path
            .as_ref()
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "mp4" | "m4v" => "video/mp4",
            "mov" => "video/quicktime",
            "avi" => "video/x-msvideo",
            "webm" => "video/webm",
            "mkv" => "video/x-matroska",
            "mp3" => "audio/mpeg",
            "m4a" => "audio/mp4",
            "wav" => "audio/wav",
            "ogg" => "audio/ogg",
            "flac" => "audio/flac",
            _ => "application/octet-stream",
        }
    }

    /// Whether the path looks like a video or audio file
    pub fn is_media_file<P: AsRef<Path>>(path: P) -> bool {
        let path = path.as_ref();
        Self::has_extension(path, &VIDEO_EXTENSIONS) || Self::has_extension(path, &AUDIO_EXTENSIONS)
    }

    /// Detect if a file is a subtitle (SRT or WebVTT), a video, or an audio file
    pub fn detect_file_type<P: AsRef<Path>>(path: P) -> Result<FileType> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(anyhow!("File does not exist: {:?}", path));
        }

        if Self::has_extension(path, &["srt", "vtt"]) {
            return Ok(FileType::Subtitle);
        }
        if Self::has_extension(path, &VIDEO_EXTENSIONS) {
            return Ok(FileType::Video);
        }
        if Self::has_extension(path, &AUDIO_EXTENSIONS) {
            return Ok(FileType::Audio);
        }

        // Fall back to examining file contents
        if let Ok(content) = fs::read_to_string(path) {
            if SUBTITLE_SNIFF_REGEX.is_match(&content) {
                return Ok(FileType::Subtitle);
            }
        }

        Ok(FileType::Unknown)
    }

    fn has_extension(path: &Path, extensions: &[&str]) -> bool {
        path.extension()
            .map(|ext| {
                let ext = ext.to_string_lossy();
                extensions.iter().any(|e| ext.eq_ignore_ascii_case(e))
            })
            .unwrap_or(false)
    }
}

/// Human readable size: `0 Bytes`, `512 Bytes`, `1.5 KB`, `23.84 MB`
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = (value * 100.0).round() / 100.0;
    format!("{} {}", rounded, UNITS[unit])
}

/// Enum representing different file types
#[derive(Debug, PartialEq, Eq)]
pub enum FileType {
    /// Subtitle file (SRT or WebVTT)
    Subtitle,
    /// Video file
    Video,
    /// Audio-only file
    Audio,
    /// Unknown file type
    Unknown,
}
