// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::{Path, PathBuf};

use captioneer::app_config::{self, Config, TranscriptionProviderType};
use captioneer::app_controller::{Controller, EditOperation};
use captioneer::editor::TimeField;
use captioneer::subtitle_processor::SubtitleFormat;
use captioneer::timeline::CaptionStyle;

/// CLI Wrapper for TranscriptionProviderType to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliProvider {
    Whisper,
    #[value(name = "assemblyai")]
    AssemblyAI,
    Gemini,
    Mock,
}

impl From<CliProvider> for TranscriptionProviderType {
    fn from(cli_provider: CliProvider) -> Self {
        match cli_provider {
            CliProvider::Whisper => TranscriptionProviderType::Whisper,
            CliProvider::AssemblyAI => TranscriptionProviderType::AssemblyAI,
            CliProvider::Gemini => TranscriptionProviderType::Gemini,
            CliProvider::Mock => TranscriptionProviderType::Mock,
        }
    }
}

/// CLI Wrapper for SubtitleFormat to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliFormat {
    Srt,
    Vtt,
}

impl From<CliFormat> for SubtitleFormat {
    fn from(cli_format: CliFormat) -> Self {
        match cli_format {
            CliFormat::Srt => SubtitleFormat::Srt,
            CliFormat::Vtt => SubtitleFormat::Vtt,
        }
    }
}

/// CLI Wrapper for CaptionStyle to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliStyle {
    Bottom,
    Top,
    Karaoke,
}

impl From<CliStyle> for CaptionStyle {
    fn from(cli_style: CliStyle) -> Self {
        match cli_style {
            CliStyle::Bottom => CaptionStyle::Bottom,
            CliStyle::Top => CaptionStyle::Top,
            CliStyle::Karaoke => CaptionStyle::Karaoke,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

/// Edit actions, cue numbers are 1-based as in the subtitle file
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliEditAction {
    /// Add a 3 second placeholder cue at the end
    Append,
    /// Add a placeholder cue after CUE
    Insert,
    /// Remove CUE
    Delete,
    /// Replace the text of CUE with VALUE
    Text,
    /// Set the start of CUE to VALUE seconds
    Start,
    /// Set the end of CUE to VALUE seconds
    End,
    /// Report invalid or overlapping cues
    Check,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate captions for a video file or directory (default command)
    #[command(alias = "gen")]
    Generate(GenerateArgs),

    /// Convert a subtitle file between SRT and WebVTT
    Convert {
        /// Subtitle file to convert
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Target format
        #[arg(long, value_enum)]
        format: CliFormat,

        /// Output path (defaults to the input name with the new extension)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Force overwrite of existing output files
        #[arg(short, long)]
        force_overwrite: bool,
    },

    /// Edit a subtitle file in place
    Edit {
        /// Subtitle file to edit
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Edit to apply
        #[arg(value_enum)]
        action: CliEditAction,

        /// Cue number (1-based)
        #[arg(value_name = "CUE")]
        cue: Option<usize>,

        /// New text or time in seconds
        #[arg(value_name = "VALUE")]
        value: Option<String>,
    },

    /// Show the caption on screen at a playback time
    Preview {
        /// Subtitle file to inspect
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Playback time in seconds
        #[arg(long)]
        at: f64,

        /// Caption style
        #[arg(short, long, value_enum, default_value = "bottom")]
        style: CliStyle,
    },

    /// Generate shell completions for captioneer
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct GenerateArgs {
    /// Input video file or directory to process
    #[arg(value_name = "INPUT_PATH")]
    input_path: PathBuf,

    #[command(flatten)]
    options: GenerateOptions,
}

#[derive(clap::Args, Debug, Clone)]
struct GenerateOptions {
    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,

    /// Transcription provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliProvider>,

    /// Model name to use for transcription
    #[arg(short, long)]
    model: Option<String>,

    /// Subtitle format to write
    #[arg(long, value_enum)]
    format: Option<CliFormat>,

    /// Caption style
    #[arg(short, long, value_enum)]
    style: Option<CliStyle>,

    /// Maximum words per caption
    #[arg(long)]
    max_words: Option<usize>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// Captioneer - timed captions for your videos
///
/// Transcribes video files with a speech-to-text provider and writes SRT or
/// WebVTT captions next to them.
#[derive(Parser, Debug)]
#[command(name = "captioneer")]
#[command(version)]
#[command(about = "AI-powered video captioning tool")]
#[command(long_about = "Captioneer transcribes video files and turns the speech into timed captions.

EXAMPLES:
    captioneer talk.mp4                         # Caption using default config
    captioneer -f talk.mp4                      # Force overwrite existing captions
    captioneer -p assemblyai talk.mp4           # Use a specific provider
    captioneer --format vtt --max-words 5 talk.mp4
    captioneer --log-level debug /videos/       # Process an entire directory
    captioneer convert talk.srt --format vtt    # Convert between formats
    captioneer edit talk.srt text 3 \"Namaste\"   # Replace the text of cue 3
    captioneer preview talk.srt --at 12.5 -s karaoke
    captioneer completions bash > captioneer.bash

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically. API keys left empty in the file are read from
    OPENAI_API_KEY, ASSEMBLYAI_API_KEY or GEMINI_API_KEY.

SUPPORTED PROVIDERS:
    whisper    - OpenAI Whisper (word-level timestamps, 25 MB upload limit)
    assemblyai - AssemblyAI (word-level timestamps)
    gemini     - Google Gemini (sentence-level timestamps)
    mock       - Offline demo captions")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Input video file or directory to process
    #[arg(value_name = "INPUT_PATH")]
    input_path: Option<PathBuf>,

    #[command(flatten)]
    options: GenerateOptions,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI colour and marker for a log level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("1;31", "❌"),
            Level::Warn => ("1;33", "🚧"),
            Level::Info => ("1;32", " "),
            Level::Debug => ("1;36", "🔍"),
            Level::Trace => ("1;35", "📋"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (colour, marker) = Self::style_for_level(record.level());
            let _ = writeln!(
                std::io::stderr(),
                "\x1B[{}m{} {} {}\x1B[0m",
                colour, now, marker, record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // The logger accepts everything; log::set_max_level does the filtering
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "captioneer", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Generate(args)) => run_generate(args.input_path, args.options).await,
        Some(Commands::Convert { input, format, output, force_overwrite }) => {
            Controller::convert(&input, format.into(), output, force_overwrite)?;
            Ok(())
        }
        Some(Commands::Edit { file, action, cue, value }) => run_edit(&file, action, cue, value),
        Some(Commands::Preview { file, at, style }) => {
            Controller::preview(&file, at, style.into())?;
            Ok(())
        }
        None => {
            // Default behavior - use top-level args
            let input_path = cli.input_path.ok_or_else(|| {
                anyhow!("INPUT_PATH is required when no subcommand is specified")
            })?;
            run_generate(input_path, cli.options).await
        }
    }
}

async fn run_generate(input_path: PathBuf, options: GenerateOptions) -> Result<()> {
    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = &options.log_level {
        let level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    let (mut config, created) = Config::load_or_create(&options.config_path)?;
    if created {
        warn!("Config file not found at '{}', created default config.", options.config_path);
    }

    // Override config with CLI options if provided
    if let Some(provider) = &options.provider {
        config.transcription.provider = provider.clone().into();
    }
    if let Some(model) = &options.model {
        config.transcription.active_provider_config_mut().model = model.clone();
    }
    if let Some(format) = options.format {
        config.captions.export_format = format.into();
    }
    if let Some(style) = options.style {
        config.captions.style = style.into();
    }
    if let Some(max_words) = options.max_words {
        config.captions.max_words_per_cue = max_words;
    }
    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }

    config.validate()
        .context("Configuration validation failed")?;

    // If log level was not set via command line, update it from config now
    if options.log_level.is_none() {
        log::set_max_level(config.log_level.to_level_filter());
    }

    let controller = Controller::with_config(config)?;

    if input_path.is_file() {
        let output_dir = input_path.parent().unwrap_or(Path::new(".")).to_path_buf();
        controller.run(input_path, output_dir, options.force_overwrite).await?;
    } else if input_path.is_dir() {
        let summary = controller.run_folder(input_path, options.force_overwrite).await?;
        if summary.errors > 0 {
            return Err(anyhow!("{} file(s) failed", summary.errors));
        }
    } else {
        return Err(anyhow!("Input path does not exist: {:?}", input_path));
    }

    Ok(())
}

fn run_edit(file: &Path, action: CliEditAction, cue: Option<usize>, value: Option<String>) -> Result<()> {
    let cue_index = || -> Result<usize> {
        match cue {
            Some(n) if n >= 1 => Ok(n - 1),
            Some(_) => Err(anyhow!("Cue numbers start at 1")),
            None => Err(anyhow!("This edit needs a CUE number")),
        }
    };
    let value = || value.clone().ok_or_else(|| anyhow!("This edit needs a VALUE"));
    let seconds = || -> Result<f64> {
        let raw = value()?;
        raw.trim().parse::<f64>().with_context(|| format!("Not a time in seconds: {}", raw))
    };

    let operation = match action {
        CliEditAction::Append => EditOperation::Append,
        CliEditAction::Insert => EditOperation::InsertAfter(cue_index()?),
        CliEditAction::Delete => EditOperation::Delete(cue_index()?),
        CliEditAction::Text => EditOperation::SetText(cue_index()?, value()?),
        CliEditAction::Start => EditOperation::Retime(cue_index()?, TimeField::Start, seconds()?),
        CliEditAction::End => EditOperation::Retime(cue_index()?, TimeField::End, seconds()?),
        CliEditAction::Check => EditOperation::Check,
    };

    let issues = Controller::edit(file, operation)?;
    if !issues.is_empty() {
        warn!("{} caption issue(s) remain in {}", issues.len(), file.display());
    }
    Ok(())
}
