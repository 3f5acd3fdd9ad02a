//! Encoding session state machine and time accounting.

use reelkit_common::clock::RecordingClock;
use reelkit_common::error::{ReelkitError, ReelkitResult};
use reelkit_sources::CombinedSource;
use serde::{Deserialize, Serialize};

use crate::encoder::{
    select_format, Artifact, Encoder, EncoderFactory, EncoderSettings, EncodingFormat, Segment,
};

/// State of a recording session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No session in progress.
    Idle,
    /// Sources are being requested from the platform.
    Acquiring,
    /// Encoding in progress.
    Recording,
    /// Encoding suspended.
    Paused,
    /// Encoder being flushed into the artifact.
    Finalizing,
}

/// Why a session is being finalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The caller asked to stop.
    Caller,
    /// The mandatory display source ended outside the session's control.
    SourceEnded,
}

/// The state surface pushed to UI consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateSnapshot {
    pub is_recording: bool,
    pub is_paused: bool,
    pub duration_seconds: u64,
}

impl StateSnapshot {
    pub fn idle() -> Self {
        Self {
            is_recording: false,
            is_paused: false,
            duration_seconds: 0,
        }
    }
}

/// One recording attempt: encoder lifecycle, segment accumulation, and
/// pause-aware elapsed time.
///
/// `segments` is append-only while recording; the artifact is the
/// concatenation of segments in arrival order.
pub struct EncodingSession {
    state: SessionState,
    clock: Option<RecordingClock>,
    format: Option<EncodingFormat>,
    encoder: Option<Box<dyn Encoder>>,
    segments: Vec<Segment>,
}

impl EncodingSession {
    pub fn new() -> Self {
        Self {
            state: SessionState::Idle,
            clock: None,
            format: None,
            encoder: None,
            segments: Vec::new(),
        }
    }

    /// Current session state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Whether a recording is in progress (recording or paused).
    pub fn is_active(&self) -> bool {
        matches!(self.state, SessionState::Recording | SessionState::Paused)
    }

    /// Current state as pushed to consumers.
    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            is_recording: self.state == SessionState::Recording,
            is_paused: self.state == SessionState::Paused,
            duration_seconds: self.clock.as_ref().map(|c| c.recorded_secs()).unwrap_or(0),
        }
    }

    /// Mark the session as acquiring sources. Caller must have verified the
    /// session was idle.
    pub fn mark_acquiring(&mut self) {
        self.state = SessionState::Acquiring;
    }

    /// Drop any in-flight state and return to idle without producing an
    /// artifact. Used on acquisition and encoder-init failures.
    pub fn reset_idle(&mut self) {
        self.state = SessionState::Idle;
        self.clock = None;
        self.format = None;
        self.encoder = None;
        self.segments.clear();
    }

    /// Probe for a supported format, create the encoder, and start
    /// recording.
    pub fn begin(
        &mut self,
        factory: &dyn EncoderFactory,
        source: &CombinedSource,
        settings: &EncoderSettings,
    ) -> ReelkitResult<()> {
        let result = self.try_begin(factory, source, settings);
        if result.is_err() {
            self.reset_idle();
        }
        result
    }

    fn try_begin(
        &mut self,
        factory: &dyn EncoderFactory,
        source: &CombinedSource,
        settings: &EncoderSettings,
    ) -> ReelkitResult<()> {
        let format = select_format(factory)?;
        tracing::info!(mime = %format.mime_type(), "Selected encoding format");

        let mut encoder = factory.create(source, &format, settings)?;
        encoder.start()?;

        self.encoder = Some(encoder);
        self.format = Some(format);
        self.clock = Some(RecordingClock::start());
        self.segments.clear();
        self.state = SessionState::Recording;
        Ok(())
    }

    /// Drain encoded segments produced so far and append the non-empty
    /// ones, in arrival order. Only collects while recording; nothing
    /// arrives while paused.
    pub fn poll_segments(&mut self) {
        if self.state != SessionState::Recording {
            return;
        }
        if let Some(encoder) = self.encoder.as_mut() {
            for segment in encoder.take_segments() {
                if !segment.is_empty() {
                    self.segments.push(segment);
                }
            }
        }
    }

    /// Pause recording. No-op when already paused; `NoActiveSession` when
    /// there is nothing to pause. Returns whether the state changed.
    pub fn pause(&mut self) -> ReelkitResult<bool> {
        match self.state {
            SessionState::Recording => {
                if let Some(encoder) = self.encoder.as_mut() {
                    encoder.pause()?;
                }
                if let Some(clock) = self.clock.as_mut() {
                    clock.pause();
                }
                self.state = SessionState::Paused;
                Ok(true)
            }
            SessionState::Paused => Ok(false),
            _ => Err(ReelkitError::no_active_session(
                "pause requires an active recording",
            )),
        }
    }

    /// Resume a paused recording. No-op when already recording;
    /// `NoActiveSession` when there is nothing to resume. Returns whether
    /// the state changed.
    pub fn resume(&mut self) -> ReelkitResult<bool> {
        match self.state {
            SessionState::Paused => {
                if let Some(encoder) = self.encoder.as_mut() {
                    encoder.resume()?;
                }
                if let Some(clock) = self.clock.as_mut() {
                    clock.resume();
                }
                self.state = SessionState::Recording;
                Ok(true)
            }
            SessionState::Recording => Ok(false),
            _ => Err(ReelkitError::no_active_session(
                "resume requires a paused recording",
            )),
        }
    }

    /// Finalize the session into its artifact.
    ///
    /// Serves both caller-initiated stop and the external end of the
    /// display source; the transition is identical for both reasons. On
    /// error the session still returns to idle with nothing retained;
    /// source release is the facade's unconditional follow-up either way.
    pub fn finalize(&mut self, reason: StopReason) -> ReelkitResult<Artifact> {
        if !self.is_active() {
            return Err(ReelkitError::no_active_session("no recording in progress"));
        }
        self.state = SessionState::Finalizing;

        let Some(mut encoder) = self.encoder.take() else {
            self.reset_idle();
            return Err(ReelkitError::no_active_session("no active encoder"));
        };

        // Segments still in flight, then the encoder's own flush.
        for segment in encoder.take_segments() {
            if !segment.is_empty() {
                self.segments.push(segment);
            }
        }
        let tail = match encoder.finalize() {
            Ok(tail) => tail,
            Err(e) => {
                self.reset_idle();
                return Err(ReelkitError::finalization(format!(
                    "encoder flush failed: {e}"
                )));
            }
        };
        for segment in tail {
            if !segment.is_empty() {
                self.segments.push(segment);
            }
        }

        let duration_seconds = self.clock.as_ref().map(|c| c.recorded_secs()).unwrap_or(0);
        let mime_type = self
            .format
            .as_ref()
            .map(|f| f.mime_type())
            .unwrap_or_else(|| "video/webm".to_string());

        let segments = std::mem::take(&mut self.segments);
        let segment_count = segments.len();
        let mut payload = Vec::with_capacity(segments.iter().map(Segment::len).sum());
        for segment in segments {
            payload.extend(segment.data);
        }

        tracing::info!(
            ?reason,
            duration_seconds,
            segment_count,
            payload_bytes = payload.len(),
            "Recording finalized"
        );

        self.reset_idle();
        Ok(Artifact {
            payload,
            mime_type,
            duration_seconds,
        })
    }
}

impl Default for EncodingSession {
    fn default() -> Self {
        Self::new()
    }
}
