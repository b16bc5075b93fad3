use anyhow::{anyhow, Context, Result};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::app_config::Config;
use crate::caption_service::{CaptionService, CaptionSource};
use crate::editor::{CaptionEditor, TimeField, ValidationIssue};
use crate::file_utils::{FileManager, FileType, MAX_MEDIA_FILE_SIZE};
use crate::providers::MediaInput;
use crate::subtitle_processor::{SubtitleCollection, SubtitleFormat};
use crate::timeline::{format_clock, render_frame, word_states, CaptionFrame, CaptionStyle, WordState};

// @module: Application controller for caption generation

/// What happened to a single input file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    /// Captions written to this path
    Written(PathBuf),
    /// Output already existed and overwriting was not requested
    Skipped(PathBuf),
}

/// Counts for a folder run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FolderSummary {
    pub processed: usize,
    pub skipped: usize,
    pub errors: usize,
}

/// A single manual edit applied to a subtitle file
#[derive(Debug, Clone, PartialEq)]
pub enum EditOperation {
    /// Add a placeholder cue after the last one
    Append,
    /// Add a placeholder cue after the given index
    InsertAfter(usize),
    /// Remove a cue
    Delete(usize),
    /// Replace a cue's text
    SetText(usize, String),
    /// Move one end of a cue
    Retime(usize, TimeField, f64),
    /// Only report problems
    Check,
}

/// Main application controller for caption generation
#[derive(Debug)]
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: Transcription pipeline
    service: CaptionService,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        let service = CaptionService::from_config(&config)
            .context("Failed to create transcription provider")?;
        Ok(Self { config, service })
    }

    /// Create a controller around an existing pipeline
    pub fn with_service(config: Config, service: CaptionService) -> Self {
        Self { config, service }
    }

    pub fn export_format(&self) -> SubtitleFormat {
        self.config.captions.export_format
    }

    /// Generate captions for one media file and write them into `output_dir`
    pub async fn run(&self, input_file: PathBuf, output_dir: PathBuf, force_overwrite: bool) -> Result<FileOutcome> {
        let multi_progress = MultiProgress::new();
        self.run_with_progress(&input_file, &output_dir, &multi_progress, force_overwrite).await
    }

    async fn run_with_progress(
        &self,
        input_file: &Path,
        output_dir: &Path,
        multi_progress: &MultiProgress,
        force_overwrite: bool,
    ) -> Result<FileOutcome> {
        let start_time = std::time::Instant::now();

        if !input_file.exists() {
            return Err(anyhow!("Input file does not exist: {:?}", input_file));
        }

        let format = self.export_format();
        let output_path = FileManager::generate_output_path(input_file, output_dir, format.extension());
        if output_path.exists() && !force_overwrite {
            warn!("Skipping file, captions already exist (use -f to force overwrite): {}", output_path.display());
            return Ok(FileOutcome::Skipped(output_path));
        }

        match FileManager::detect_file_type(input_file)? {
            FileType::Video | FileType::Audio => {}
            FileType::Subtitle => {
                return Err(anyhow!("{:?} is already a subtitle file, use `convert` instead", input_file));
            }
            FileType::Unknown => return Err(anyhow!("Unsupported media file: {:?}", input_file)),
        }

        let size = FileManager::check_file_size(input_file, MAX_MEDIA_FILE_SIZE)?;
        debug!("Input {} is {}", input_file.display(), crate::file_utils::format_file_size(size));

        FileManager::ensure_dir(output_dir)?;
        let media = MediaInput::from_file(input_file).await?;

        let spinner = multi_progress.add(ProgressBar::new_spinner());
        let style = ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        spinner.set_style(style);
        spinner.set_message(format!("Transcribing {} with {}", media.file_name, self.service.provider_name()));
        spinner.enable_steady_tick(Duration::from_millis(100));

        let result = self.service.generate(&media).await;
        spinner.finish_and_clear();
        let result = result.with_context(|| format!("Failed to generate captions for {}", input_file.display()))?;

        match result.source {
            CaptionSource::Transcribed => {}
            CaptionSource::Placeholder => warn!("No speech found in {}, wrote placeholder captions", input_file.display()),
            CaptionSource::Fallback => warn!("Provider unavailable for {}, wrote fallback captions", input_file.display()),
        }

        let collection = SubtitleCollection::new(input_file.to_path_buf(), result.cues);
        collection.write_to_file(&output_path, format)?;

        info!(
            "Success: {} ({} cues, {}, {} style) in {}",
            output_path.display(),
            collection.cues.len(),
            format_clock(crate::timeline::total_duration(&collection.cues)),
            self.config.captions.style.display_name(),
            Self::format_duration(start_time.elapsed())
        );

        Ok(FileOutcome::Written(output_path))
    }

    /// Run the workflow in folder mode, processing every media file below a directory.
    /// Files that already have captions are skipped.
    pub async fn run_folder(&self, input_dir: PathBuf, force_overwrite: bool) -> Result<FolderSummary> {
        let start_time = std::time::Instant::now();

        if !input_dir.is_dir() {
            return Err(anyhow!("Input directory does not exist: {:?}", input_dir));
        }

        let media_files = FileManager::find_media_files(&input_dir)?;
        if media_files.is_empty() {
            return Err(anyhow!("No video files found in directory: {:?}", input_dir));
        }

        let multi_progress = MultiProgress::new();
        let folder_pb = multi_progress.add(ProgressBar::new(media_files.len() as u64));
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files ({percent}%) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        folder_pb.set_style(template_result);

        let mut summary = FolderSummary::default();

        for media_file in &media_files {
            let file_name = media_file.file_name()
                .map(|f| f.to_string_lossy().to_string())
                .unwrap_or_else(|| "unknown".to_string());
            folder_pb.set_message(format!("Processing: {}", file_name));

            let output_dir = media_file.parent().map(Path::to_path_buf).unwrap_or_else(|| input_dir.clone());

            match self.run_with_progress(media_file, &output_dir, &multi_progress, force_overwrite).await {
                Ok(FileOutcome::Written(_)) => summary.processed += 1,
                Ok(FileOutcome::Skipped(_)) => summary.skipped += 1,
                Err(e) => {
                    error!("Error processing file {}: {:#}", file_name, e);
                    summary.errors += 1;
                }
            }

            folder_pb.inc(1);
        }

        folder_pb.finish_with_message("Folder processing complete");

        info!(
            "Folder processing completed in {}: {} processed, {} skipped, {} errors",
            Self::format_duration(start_time.elapsed()),
            summary.processed,
            summary.skipped,
            summary.errors
        );

        Ok(summary)
    }

    /// Re-serialize a subtitle file in another format
    pub fn convert(input_file: &Path, format: SubtitleFormat, output: Option<PathBuf>, force_overwrite: bool) -> Result<PathBuf> {
        let collection = SubtitleCollection::from_file(input_file)?;

        let output_path = output.unwrap_or_else(|| {
            let dir = input_file.parent().unwrap_or_else(|| Path::new(""));
            FileManager::generate_output_path(input_file, dir, format.extension())
        });

        if output_path.exists() && !force_overwrite {
            return Err(anyhow!("Output file already exists: {:?} (use -f to force overwrite)", output_path));
        }

        collection.write_to_file(&output_path, format)?;
        info!("Converted {} cues to {}", collection.cues.len(), output_path.display());
        Ok(output_path)
    }

    /// Apply one edit to a subtitle file in place, keeping its format.
    ///
    /// Returns the validation issues remaining after the edit.
    pub fn edit(input_file: &Path, operation: EditOperation) -> Result<Vec<ValidationIssue>> {
        let collection = SubtitleCollection::from_file(input_file)?;
        let content = FileManager::read_to_string(input_file)?;
        let format = crate::subtitle_processor::detect_format(&content);

        let mut editor = CaptionEditor::new(collection.cues);
        match operation {
            EditOperation::Append => {
                editor.append();
            }
            EditOperation::InsertAfter(index) => {
                editor.insert(Some(index), None)?;
            }
            EditOperation::Delete(index) => {
                editor.delete(index)?;
            }
            EditOperation::SetText(index, text) => editor.set_text(index, text)?,
            EditOperation::Retime(index, field, value) => editor.retime(index, field, value)?,
            EditOperation::Check => {}
        }

        let issues = editor.validate();
        for issue in &issues {
            match issue {
                ValidationIssue::InvalidTiming { index } => warn!("Cue {} has an invalid time span", index + 1),
                ValidationIssue::Overlap { first, second } => warn!("Cue {} overlaps cue {}", first + 1, second + 1),
            }
        }

        if editor.is_dirty() {
            let cues = editor.commit();
            SubtitleCollection::new(input_file.to_path_buf(), cues).write_to_file(input_file, format)?;
            info!("Saved {}", input_file.display());
        }

        Ok(issues)
    }

    /// Resolve what would be on screen at `time` seconds
    pub fn preview(input_file: &Path, time: f64, style: CaptionStyle) -> Result<Option<CaptionFrame>> {
        let collection = SubtitleCollection::from_file(input_file)?;
        let frame = render_frame(&collection.cues, time, style);

        match &frame {
            Some(frame) if style == CaptionStyle::Karaoke => {
                let cue = &collection.cues[frame.cue_index];
                let line: Vec<String> = word_states(cue, time)
                    .into_iter()
                    .map(|(word, state)| match state {
                        WordState::Active => format!("[{}]", word),
                        WordState::Past | WordState::Pending => word,
                    })
                    .collect();
                info!("{} #{}: {}", format_clock(time), frame.cue_index + 1, line.join(" "));
            }
            Some(frame) => info!("{} #{} ({}): {}", format_clock(time), frame.cue_index + 1, style.display_name(), frame.text),
            None => info!("{} no caption", format_clock(time)),
        }

        Ok(frame)
    }

    // Format duration in a human-readable format (HH:MM:SS)
    fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
