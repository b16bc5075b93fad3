/*!
 * Tests for the transcript -> cues -> playback pipeline
 */

use serde_json::json;

use captioneer::segmenter::{segment, Cue, SegmenterOptions};
use captioneer::timeline::{
    active_cue, active_word_index, duration_in_frames, frame_to_seconds, render_frame, word_states,
    CaptionStyle, WordState, DEFAULT_FPS,
};
use captioneer::transcript::{full_text, normalize, ProviderResponse, TimeUnit};
use captioneer::CaptionError;
use crate::common;

/// Whisper answers in seconds with `word` keys
#[test]
fn test_fromJson_withWhisperBody_shouldReadWordTimestamps() {
    let body = json!({
        "text": "Namaste dosto. Kaise ho?",
        "duration": 2.0,
        "words": [
            {"word": "Namaste", "start": 0.0, "end": 0.5},
            {"word": "dosto.", "start": 0.5, "end": 1.0},
            {"word": "Kaise", "start": 1.1, "end": 1.4},
            {"word": "ho?", "start": 1.4, "end": 1.8}
        ]
    });

    let response = ProviderResponse::from_json(&body, TimeUnit::Seconds, Some(2.0)).unwrap();
    let words = normalize(response).unwrap();

    assert_eq!(words.len(), 4);
    assert_eq!(full_text(&words), "Namaste dosto. Kaise ho?");

    let cues = segment(&words, &SegmenterOptions::default());
    assert_eq!(cues.len(), 2);
    assert_eq!(cues[0].text, "Namaste dosto.");
    assert_eq!(cues[1].start, 1.1);
    assert_eq!(cues[1].end, 1.8);
}

/// AssemblyAI answers in milliseconds with `text` keys
#[test]
fn test_fromJson_withMillisecondBody_shouldConvertToSeconds() {
    let body = json!({
        "words": [
            {"text": "Hello", "start": 250, "end": 750},
            {"text": "there", "start": 800, "end": 1300}
        ]
    });

    let response = ProviderResponse::from_json(&body, TimeUnit::Milliseconds, None).unwrap();
    let words = normalize(response).unwrap();

    assert_eq!(words[0].start, 0.25);
    assert_eq!(words[1].end, 1.3);
}

#[test]
fn test_fromJson_withUnknownShape_shouldBeMalformed() {
    let body = json!({"status": "ok"});
    let result = ProviderResponse::from_json(&body, TimeUnit::Seconds, None);
    assert!(matches!(result, Err(CaptionError::MalformedProviderResponse(_))));
}

#[test]
fn test_normalize_withUntimedText_shouldSpreadWordsEvenly() {
    let response = ProviderResponse::Text { text: "a b c d".to_string(), duration: 4.0 };
    let words = normalize(response).unwrap();

    assert_eq!(words.len(), 4);
    assert_eq!(words[2].start, 2.0);
    assert_eq!(words[2].end, 3.0);

    let cues = segment(&words, &SegmenterOptions::default());
    assert_eq!(cues, vec![Cue::from_words(words).unwrap()]);
    assert_eq!(cues[0].end, 4.0);
}

#[test]
fn test_normalize_withOnlyBlankWords_shouldBeEmptyTranscript() {
    let body = json!({"words": [{"word": "  ", "start": 0.0, "end": 1.0}]});
    let response = ProviderResponse::from_json(&body, TimeUnit::Seconds, None).unwrap();
    assert_eq!(normalize(response), Err(CaptionError::EmptyTranscript));
}

#[test]
fn test_segment_withSmallerMaxWords_shouldRespectLimit() {
    let words = common::words_from(&["one", "two", "three", "four", "five"], 0.4);
    let cues = segment(&words, &SegmenterOptions::default().with_max_words(2));

    let texts: Vec<&str> = cues.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(texts, vec!["one two", "three four", "five"]);
    assert!(cues.windows(2).all(|pair| pair[0].end <= pair[1].start));
}

#[test]
fn test_segment_withEmptyInput_shouldReturnNoCues() {
    assert!(segment(&[], &SegmenterOptions::default()).is_empty());
}

#[test]
fn test_activeCue_atCueBoundary_shouldPreferLaterCue() {
    let cues = vec![Cue::new("first", 0.0, 2.0), Cue::new("second", 2.0, 4.0)];
    assert_eq!(active_cue(&cues, 2.0).unwrap().text, "second");
    assert_eq!(active_cue(&cues, 1.999).unwrap().text, "first");
    assert!(active_cue(&cues, 4.0).is_none());
}

#[test]
fn test_karaoke_withFourWordCue_shouldHighlightByEqualSlots() {
    let cue = Cue::new("one two three four", 0.0, 4.0);

    assert_eq!(active_word_index(&cue, 0.0), Some(0));
    assert_eq!(active_word_index(&cue, 2.5), Some(2));
    assert_eq!(active_word_index(&cue, 3.99), Some(3));

    let states: Vec<WordState> = word_states(&cue, 2.5).into_iter().map(|(_, s)| s).collect();
    assert_eq!(states, vec![WordState::Past, WordState::Past, WordState::Active, WordState::Pending]);
}

#[test]
fn test_renderFrame_withNonKaraokeStyle_shouldNotHighlight() {
    let cues = vec![Cue::new("Breaking news", 1.0, 3.0)];

    let frame = render_frame(&cues, 2.0, CaptionStyle::Top).unwrap();
    assert_eq!(frame.text, "Breaking news");
    assert_eq!(frame.active_word, None);

    let frame = render_frame(&cues, 2.0, CaptionStyle::Karaoke).unwrap();
    assert_eq!(frame.active_word, Some(1));

    assert!(render_frame(&cues, 0.5, CaptionStyle::Bottom).is_none());
}

#[test]
fn test_frames_atDefaultRate_shouldCoverLastCue() {
    let cues = vec![Cue::new("a", 0.0, 2.5), Cue::new("b", 2.5, 10.0)];
    assert_eq!(frame_to_seconds(45, DEFAULT_FPS), 1.5);
    assert_eq!(duration_in_frames(&cues, DEFAULT_FPS), 300);
}
