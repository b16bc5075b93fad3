/*!
 * Tests for provider plumbing: media input, provider construction and retries
 */

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use anyhow::Result;
use captioneer::app_config::{TranscriptionConfig, TranscriptionProviderType};
use captioneer::providers::{build_provider, MediaInput, MockProvider, RetryPolicy, TranscriptionProvider};
use captioneer::transcript::ProviderResponse;
use captioneer::ProviderError;
use crate::common;

#[tokio::test]
async fn test_mediaInput_fromFile_shouldReadBytesAndMime() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_fake_video(temp_dir.path(), "talk.mov")?;

    let media = MediaInput::from_file(&path).await?;
    assert_eq!(media.file_name, "talk.mov");
    assert_eq!(media.mime_type, "video/quicktime");
    assert_eq!(media.size(), 8);
    Ok(())
}

#[test]
fn test_mediaInput_checkSize_overLimit_shouldBeFileTooLarge() {
    let media = MediaInput::new(vec![0u8; 10], "clip.mp4", "video/mp4");
    assert!(media.check_size(10).is_ok());
    assert!(matches!(media.check_size(9), Err(ProviderError::FileTooLarge { .. })));
}

#[test]
fn test_buildProvider_withMock_shouldServeDemoSegments() -> Result<()> {
    let config = TranscriptionConfig {
        provider: TranscriptionProviderType::Mock,
        ..TranscriptionConfig::default()
    };

    let provider = build_provider(&config)?;
    assert_eq!(provider.name(), "mock");

    let media = MediaInput::new(vec![1, 2, 3], "clip.mp4", "video/mp4");
    let response = tokio_test::block_on(provider.transcribe(&media))?;
    assert!(matches!(response, ProviderResponse::Segments(ref s) if s.len() == 4));
    Ok(())
}

#[test]
fn test_buildProvider_withConfiguredKey_shouldUseProviderName() -> Result<()> {
    let mut config = TranscriptionConfig {
        provider: TranscriptionProviderType::AssemblyAI,
        ..TranscriptionConfig::default()
    };
    config.active_provider_config_mut().api_key = "test-key".to_string();

    assert_eq!(build_provider(&config)?.name(), "assemblyai");
    Ok(())
}

#[test]
fn test_retryPolicy_delayFor_shouldDoubleEachRetry() {
    let policy = RetryPolicy::default();
    assert_eq!(policy.delay_for(0), Duration::from_millis(1000));
    assert_eq!(policy.delay_for(1), Duration::from_millis(2000));
    assert_eq!(RetryPolicy::new(2, 50).delay_for(2), Duration::from_millis(200));
}

#[tokio::test]
async fn test_retryPolicy_run_withRecoveringOperation_shouldSucceed() {
    let counter = AtomicUsize::new(0);
    let calls = &counter;

    let result = RetryPolicy::new(2, 1)
        .run("test", || async move {
            if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(ProviderError::ConnectionError("reset".to_string()))
            } else {
                Ok("done")
            }
        })
        .await;

    assert_eq!(result.unwrap(), "done");
    assert_eq!(counter.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_retryPolicy_run_withServerErrors_shouldGiveUpAsUnavailable() {
    let provider = MockProvider::failing();
    let media = MediaInput::new(vec![0u8; 4], "clip.mp4", "video/mp4");

    let result = RetryPolicy::new(1, 1).run(provider.name(), || provider.transcribe(&media)).await;

    assert!(matches!(result, Err(ProviderError::ProviderUnavailable { attempts: 2, .. })));
    assert_eq!(provider.request_count(), 2);
}

#[tokio::test]
async fn test_retryPolicy_run_withPermanentError_shouldNotRetry() {
    let provider = MockProvider::unauthorized();
    let media = MediaInput::new(vec![0u8; 4], "clip.mp4", "video/mp4");

    let result = RetryPolicy::new(3, 1).run(provider.name(), || provider.transcribe(&media)).await;

    assert!(matches!(result, Err(ProviderError::AuthenticationError(_))));
    assert_eq!(provider.request_count(), 1);
}
