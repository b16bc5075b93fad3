/*!
 * Tests for app configuration functionality
 */

use anyhow::Result;
use captioneer::app_config::{Config, LogLevel, ProviderConfig, TranscriptionProviderType};
use captioneer::subtitle_processor::SubtitleFormat;
use captioneer::timeline::CaptionStyle;
use crate::common;

/// Test default configuration values
#[test]
fn test_default_config_shouldHaveExpectedValues() {
    let config = Config::default();

    assert_eq!(config.transcription.provider, TranscriptionProviderType::Whisper);
    assert_eq!(config.transcription.get_model(), "whisper-1");
    assert_eq!(config.transcription.common.retry_count, 2);
    assert_eq!(config.transcription.common.retry_backoff_ms, 1000);
    assert!(!config.transcription.common.fallback_on_unavailable);
    assert_eq!(config.captions.max_words_per_cue, 7);
    assert!(config.captions.split_on_punctuation);
    assert_eq!(config.captions.style, CaptionStyle::Bottom);
    assert_eq!(config.captions.export_format, SubtitleFormat::Srt);
    assert_eq!(config.log_level, LogLevel::Info);
}

#[test]
fn test_loadOrCreate_withMissingFile_shouldWriteDefaults() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("conf.json");

    let (config, created) = Config::load_or_create(&path)?;
    assert!(created);
    assert!(path.exists());
    assert_eq!(config.captions.max_words_per_cue, 7);

    let (_, created_again) = Config::load_or_create(&path)?;
    assert!(!created_again);
    Ok(())
}

#[test]
fn test_loadOrCreate_withPartialFile_shouldFillDefaults() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(
        temp_dir.path(),
        "conf.json",
        r#"{
            "transcription": {"provider": "assemblyai"},
            "captions": {"max_words_per_cue": 4, "style": "karaoke", "export_format": "vtt"},
            "log_level": "debug"
        }"#,
    )?;

    let (config, created) = Config::load_or_create(&path)?;
    assert!(!created);
    assert_eq!(config.transcription.provider, TranscriptionProviderType::AssemblyAI);
    assert_eq!(config.transcription.get_model(), "best");
    assert_eq!(config.transcription.get_timeout_secs(), 300);
    assert_eq!(config.captions.segmenter_options().max_words, 4);
    assert_eq!(config.captions.style, CaptionStyle::Karaoke);
    assert_eq!(config.captions.export_format, SubtitleFormat::Vtt);
    assert_eq!(config.log_level, LogLevel::Debug);
    Ok(())
}

#[test]
fn test_loadOrCreate_withInvalidJson_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "conf.json", "{ not json")?;
    assert!(Config::load_or_create(&path).is_err());
    Ok(())
}

#[test]
fn test_save_thenLoad_shouldKeepProviderSettings() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("conf.json");

    let mut config = Config::default();
    config.transcription.provider = TranscriptionProviderType::Gemini;
    config.transcription.active_provider_config_mut().model = "gemini-1.5-pro".to_string();
    config.save(&path)?;

    let (loaded, _) = Config::load_or_create(&path)?;
    assert_eq!(loaded.transcription.provider, TranscriptionProviderType::Gemini);
    assert_eq!(loaded.transcription.get_model(), "gemini-1.5-pro");
    assert_eq!(loaded.transcription.get_max_upload_bytes(), 20 * 1024 * 1024);
    Ok(())
}

#[test]
fn test_validate_withMockProvider_shouldNotNeedKey() {
    let config = common::mock_config(SubtitleFormat::Srt);
    assert!(config.validate().is_ok());
}

#[test]
fn test_validate_withZeroMaxWords_shouldFail() {
    let mut config = common::mock_config(SubtitleFormat::Srt);
    config.captions.max_words_per_cue = 0;
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_withBadEndpoint_shouldFail() {
    let mut config = Config::default();
    let whisper = config.transcription.active_provider_config_mut();
    whisper.api_key = "sk-test".to_string();
    whisper.endpoint = "not a url".to_string();
    assert!(config.validate().is_err());

    config.transcription.active_provider_config_mut().endpoint = "https://api.openai.com/v1".to_string();
    assert!(config.validate().is_ok());
}

#[test]
fn test_providerType_fromStr_shouldAcceptAliases() {
    assert_eq!("openai".parse::<TranscriptionProviderType>().unwrap(), TranscriptionProviderType::Whisper);
    assert_eq!("AssemblyAI".parse::<TranscriptionProviderType>().unwrap(), TranscriptionProviderType::AssemblyAI);
    assert!("deepgram".parse::<TranscriptionProviderType>().is_err());
}

#[test]
fn test_providerConfig_new_shouldUseProviderDefaults() {
    let mock = ProviderConfig::new(TranscriptionProviderType::Mock);
    assert_eq!(mock.provider_type, "mock");
    assert_eq!(mock.timeout_secs, 5);
    assert!(mock.endpoint.is_empty());

    let whisper = ProviderConfig::new(TranscriptionProviderType::Whisper);
    assert_eq!(whisper.max_upload_bytes, 25 * 1024 * 1024);
}

/// The caption style is reporting metadata and must not change how cues are built
#[test]
fn test_captionConfig_style_shouldNotAffectSegmenterOptions() {
    let mut config = Config::default();
    let bottom = config.captions.segmenter_options();

    config.captions.style = CaptionStyle::Karaoke;
    let karaoke = config.captions.segmenter_options();

    assert_eq!(bottom.max_words, karaoke.max_words);
    assert_eq!(bottom.split_on_punctuation, karaoke.split_on_punctuation);
}
