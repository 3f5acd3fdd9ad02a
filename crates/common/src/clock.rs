//! Clock and timing utilities for recording sessions.
//!
//! A recording is anchored to a monotonic epoch captured when encoding
//! starts. Pauses are accounted for explicitly: while paused the clock is
//! frozen, and the pause interval is added to an accumulated total on
//! resume, so `recorded()` always reports net recording time.
//!
//! `tokio::time::Instant` is used throughout so sessions behave correctly
//! under tokio's paused test clock.

use std::time::Duration;

use tokio::time::Instant;

/// A pause-aware monotonic clock for one recording session.
#[derive(Debug, Clone)]
pub struct RecordingClock {
    /// The instant recording started.
    epoch: Instant,

    /// Wall-clock time at epoch (ISO 8601 string).
    epoch_wall: String,

    /// When the current pause began, if paused.
    paused_at: Option<Instant>,

    /// Total time spent in completed pauses.
    accumulated_pause: Duration,
}

impl RecordingClock {
    /// Create a new recording clock anchored to now.
    pub fn start() -> Self {
        Self {
            epoch: Instant::now(),
            epoch_wall: chrono::Utc::now().to_rfc3339(),
            paused_at: None,
            accumulated_pause: Duration::ZERO,
        }
    }

    /// Begin a pause. Returns `false` if the clock was already paused.
    pub fn pause(&mut self) -> bool {
        if self.paused_at.is_some() {
            return false;
        }
        self.paused_at = Some(Instant::now());
        true
    }

    /// End the current pause, folding its length into the accumulated
    /// total. Returns `false` if the clock was not paused.
    pub fn resume(&mut self) -> bool {
        match self.paused_at.take() {
            Some(started) => {
                self.accumulated_pause += started.elapsed();
                true
            }
            None => false,
        }
    }

    /// Whether the clock is currently paused.
    pub fn is_paused(&self) -> bool {
        self.paused_at.is_some()
    }

    /// Net recording time: elapsed since epoch minus all pauses. Frozen
    /// while paused.
    pub fn recorded(&self) -> Duration {
        let end = self.paused_at.unwrap_or_else(Instant::now);
        end.duration_since(self.epoch)
            .saturating_sub(self.accumulated_pause)
    }

    /// Net recording time in whole seconds, rounded down.
    pub fn recorded_secs(&self) -> u64 {
        self.recorded().as_secs()
    }

    /// Wall-clock time at recording start.
    pub fn epoch_wall(&self) -> &str {
        &self.epoch_wall
    }

    /// The underlying epoch instant.
    pub fn epoch(&self) -> Instant {
        self.epoch
    }
}
