//! End-to-end session flows over the simulated provider and encoder.
//!
//! All timing runs under tokio's paused clock, so wall-clock assertions
//! are exact.

use std::sync::Arc;
use std::time::Duration;

use reelkit_common::config::{AudioSource, RecordingConfiguration};
use reelkit_common::error::{ReelkitError, ReelkitResult};
use reelkit_recorder::simulated::SimulatedEncoderFactory;
use reelkit_recorder::{
    Encoder, EncoderFactory, EncoderSettings, EncodingFormat, ScreenRecorder, Segment,
};
use reelkit_sources::simulated::SimulatedProvider;
use reelkit_sources::{CombinedSource, SourceRole};

/// Bytes per full 500 ms segment at the default 1 Mbps video bitrate.
const SEGMENT_BYTES: usize = 62_500;

fn config(audio: AudioSource, webcam: bool) -> RecordingConfiguration {
    RecordingConfiguration {
        audio_source: audio,
        use_webcam: webcam,
    }
}

fn recorder_with(provider: &SimulatedProvider) -> ScreenRecorder {
    ScreenRecorder::new(
        Box::new(provider.clone()),
        Arc::new(SimulatedEncoderFactory::new()),
    )
}

/// Let spawned session tasks run to quiescence on the current-thread
/// runtime.
async fn settle() {
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
}

#[tokio::test(start_paused = true)]
async fn records_and_produces_a_complete_artifact() {
    let provider = SimulatedProvider::new();
    let recorder = recorder_with(&provider);

    let warnings = recorder
        .start(config(AudioSource::System, false))
        .await
        .unwrap();
    assert!(warnings.is_empty());
    assert!(recorder.state().is_recording);

    tokio::time::advance(Duration::from_secs(3)).await;
    let artifact = recorder.stop().unwrap();

    assert_eq!(artifact.duration_seconds, 3);
    assert_eq!(artifact.mime_type, "video/webm;codecs=vp8,opus");
    // Six 500 ms segments, none dropped or duplicated.
    assert_eq!(artifact.payload.len(), 6 * SEGMENT_BYTES);
    assert!(provider.all_stopped());
    assert!(!recorder.state().is_recording);
}

#[tokio::test(start_paused = true)]
async fn pause_time_is_excluded_from_duration() {
    let provider = SimulatedProvider::new();
    let recorder = recorder_with(&provider);

    recorder
        .start(config(AudioSource::System, false))
        .await
        .unwrap();

    tokio::time::advance(Duration::from_secs(5)).await;
    recorder.pause().unwrap();
    assert!(recorder.state().is_paused);

    tokio::time::advance(Duration::from_secs(3)).await;
    // Elapsed time is frozen while paused.
    assert_eq!(recorder.state().duration_seconds, 5);

    recorder.resume().unwrap();
    tokio::time::advance(Duration::from_secs(2)).await;

    let artifact = recorder.stop().unwrap();
    assert_eq!(artifact.duration_seconds, 7);
    // 7 s of net recording at 500 ms cadence.
    assert_eq!(artifact.payload.len(), 14 * SEGMENT_BYTES);
}

#[tokio::test(start_paused = true)]
async fn redundant_pause_and_resume_are_no_ops() {
    let provider = SimulatedProvider::new();
    let recorder = recorder_with(&provider);

    recorder
        .start(config(AudioSource::None, false))
        .await
        .unwrap();

    // Resume while recording: no-op.
    recorder.resume().unwrap();

    tokio::time::advance(Duration::from_secs(2)).await;
    recorder.pause().unwrap();
    tokio::time::advance(Duration::from_secs(3)).await;
    // Pause while paused: no-op, no duration drift.
    recorder.pause().unwrap();
    tokio::time::advance(Duration::from_secs(2)).await;
    recorder.resume().unwrap();
    tokio::time::advance(Duration::from_secs(1)).await;

    let artifact = recorder.stop().unwrap();
    assert_eq!(artifact.duration_seconds, 3);
}

#[tokio::test(start_paused = true)]
async fn controls_require_an_active_session() {
    let provider = SimulatedProvider::new();
    let recorder = recorder_with(&provider);

    assert!(matches!(
        recorder.stop(),
        Err(ReelkitError::NoActiveSession { .. })
    ));
    assert!(matches!(
        recorder.pause(),
        Err(ReelkitError::NoActiveSession { .. })
    ));
    assert!(matches!(
        recorder.resume(),
        Err(ReelkitError::NoActiveSession { .. })
    ));
    // Nothing was ever requested from the platform.
    assert!(provider.opened_roles().is_empty());
}

#[tokio::test(start_paused = true)]
async fn second_start_fails_fast_and_leaves_the_session_running() {
    let provider = SimulatedProvider::new();
    let recorder = recorder_with(&provider);

    recorder
        .start(config(AudioSource::System, false))
        .await
        .unwrap();
    tokio::time::advance(Duration::from_secs(1)).await;

    let err = recorder
        .start(config(AudioSource::System, false))
        .await
        .unwrap_err();
    assert!(matches!(err, ReelkitError::SessionAlreadyActive { .. }));

    tokio::time::advance(Duration::from_secs(1)).await;
    let artifact = recorder.stop().unwrap();
    assert_eq!(artifact.duration_seconds, 2);
}

#[tokio::test(start_paused = true)]
async fn microphone_denial_degrades_to_a_warning() {
    let provider = SimulatedProvider::new().deny_microphone();
    let recorder = recorder_with(&provider);

    let warnings = recorder
        .start(config(AudioSource::Both, true))
        .await
        .unwrap();

    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].role, SourceRole::Microphone);
    assert!(recorder.state().is_recording);
    assert_eq!(
        provider.opened_roles(),
        vec![SourceRole::Display, SourceRole::Camera]
    );

    recorder.stop().unwrap();
    assert!(provider.all_stopped());
}

#[tokio::test(start_paused = true)]
async fn display_denial_aborts_with_nothing_retained() {
    let provider = SimulatedProvider::new().deny_display();
    let recorder = recorder_with(&provider);

    let err = recorder
        .start(config(AudioSource::Both, true))
        .await
        .unwrap_err();

    assert!(matches!(err, ReelkitError::SourceDenied { .. }));
    assert!(provider.opened_roles().is_empty());
    assert!(!recorder.state().is_recording);

    // The failed attempt does not leave the recorder stuck in an
    // acquiring state.
    let err = recorder
        .start(config(AudioSource::Both, true))
        .await
        .unwrap_err();
    assert!(matches!(err, ReelkitError::SourceDenied { .. }));
}

#[tokio::test(start_paused = true)]
async fn no_supported_format_releases_acquired_sources() {
    let provider = SimulatedProvider::new();
    let recorder = ScreenRecorder::new(
        Box::new(provider.clone()),
        Arc::new(SimulatedEncoderFactory::unsupported()),
    );

    let err = recorder
        .start(config(AudioSource::System, false))
        .await
        .unwrap_err();

    assert!(matches!(err, ReelkitError::NoSupportedFormat { .. }));
    // The display had already been granted; it must not stay open.
    assert_eq!(provider.opened_roles(), vec![SourceRole::Display]);
    assert!(provider.all_stopped());
}

#[tokio::test(start_paused = true)]
async fn external_display_end_finalizes_the_session() {
    let provider = SimulatedProvider::new();
    let recorder = recorder_with(&provider);

    recorder
        .start(config(AudioSource::Both, true))
        .await
        .unwrap();
    tokio::time::advance(Duration::from_secs(2)).await;

    provider.end_display();
    settle().await;

    // The session finalized itself and released everything, including the
    // still-open microphone and camera.
    assert!(!recorder.state().is_recording);
    assert!(provider.all_stopped());

    // The artifact survives for the caller to collect.
    let artifact = recorder.stop().unwrap();
    assert_eq!(artifact.duration_seconds, 2);
    assert_eq!(artifact.payload.len(), 4 * SEGMENT_BYTES);

    // Collected once.
    assert!(matches!(
        recorder.stop(),
        Err(ReelkitError::NoActiveSession { .. })
    ));
}

#[tokio::test(start_paused = true)]
async fn overlay_lives_with_the_camera_session() {
    let provider = SimulatedProvider::new();
    let recorder = recorder_with(&provider);

    recorder
        .start(config(AudioSource::None, true))
        .await
        .unwrap();

    let dragged = recorder.with_overlay(|overlay| {
        let origin = overlay.position();
        overlay.pointer_down(origin);
        overlay.pointer_move(reelkit_sources::Position {
            x: origin.x + 40.0,
            y: origin.y - 25.0,
        });
        overlay.pointer_up();
        overlay.position()
    });
    assert!(dragged.is_some());

    recorder.stop().unwrap();
    assert!(recorder.with_overlay(|o| o.position()).is_none());
}

#[tokio::test(start_paused = true)]
async fn no_overlay_without_a_camera() {
    let provider = SimulatedProvider::new().deny_camera();
    let recorder = recorder_with(&provider);

    let warnings = recorder
        .start(config(AudioSource::None, true))
        .await
        .unwrap();

    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].role, SourceRole::Camera);
    assert!(recorder.with_overlay(|o| o.position()).is_none());
    recorder.stop().unwrap();
}

#[tokio::test(start_paused = true)]
async fn ticks_publish_snapshots_to_subscribers() {
    let provider = SimulatedProvider::new();
    let recorder = recorder_with(&provider);
    let mut updates = recorder.subscribe();

    recorder
        .start(config(AudioSource::System, false))
        .await
        .unwrap();

    tokio::time::advance(Duration::from_millis(3100)).await;
    settle().await;

    let snapshot = *updates.borrow_and_update();
    assert!(snapshot.is_recording);
    assert_eq!(snapshot.duration_seconds, 3);

    recorder.stop().unwrap();
    settle().await;
    assert!(!updates.borrow_and_update().is_recording);
}

// An encoder whose flush fails, for the finalization error path.
struct FailingEncoder;

impl Encoder for FailingEncoder {
    fn start(&mut self) -> ReelkitResult<()> {
        Ok(())
    }

    fn pause(&mut self) -> ReelkitResult<()> {
        Ok(())
    }

    fn resume(&mut self) -> ReelkitResult<()> {
        Ok(())
    }

    fn take_segments(&mut self) -> Vec<Segment> {
        Vec::new()
    }

    fn finalize(&mut self) -> ReelkitResult<Vec<Segment>> {
        Err(ReelkitError::capture("container flush failed"))
    }
}

struct FailingEncoderFactory;

impl EncoderFactory for FailingEncoderFactory {
    fn supports(&self, _format: &EncodingFormat) -> bool {
        true
    }

    fn create(
        &self,
        _source: &CombinedSource,
        _format: &EncodingFormat,
        _settings: &EncoderSettings,
    ) -> ReelkitResult<Box<dyn Encoder>> {
        Ok(Box::new(FailingEncoder))
    }
}

#[tokio::test(start_paused = true)]
async fn finalization_failure_still_releases_sources() {
    let provider = SimulatedProvider::new();
    let recorder = ScreenRecorder::new(Box::new(provider.clone()), Arc::new(FailingEncoderFactory));

    recorder
        .start(config(AudioSource::Both, true))
        .await
        .unwrap();
    tokio::time::advance(Duration::from_secs(1)).await;

    let err = recorder.stop().unwrap_err();
    assert!(matches!(err, ReelkitError::Finalization { .. }));

    // Release ran before the error surfaced.
    assert!(provider.all_stopped());
    assert!(!recorder.state().is_recording);
}
