//! A deterministic in-process encoder.
//!
//! Produces byte-pattern segments on the configured cadence, derived from
//! its own pause-aware clock rather than a background task, so delivery is
//! race-free and exact under tokio's paused test clock. Used by tests and
//! the CLI demo.

use reelkit_common::clock::RecordingClock;
use reelkit_common::error::{ReelkitError, ReelkitResult};
use reelkit_sources::CombinedSource;

use crate::encoder::{Encoder, EncoderFactory, EncoderSettings, EncodingFormat, Segment};

/// Factory for [`SimulatedEncoder`]s. Supports every preferred format
/// unless built with [`SimulatedEncoderFactory::unsupported`].
pub struct SimulatedEncoderFactory {
    supported: bool,
}

impl SimulatedEncoderFactory {
    pub fn new() -> Self {
        Self { supported: true }
    }

    /// A factory that supports no format at all, for exercising the
    /// `NoSupportedFormat` path.
    pub fn unsupported() -> Self {
        Self { supported: false }
    }
}

impl Default for SimulatedEncoderFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl EncoderFactory for SimulatedEncoderFactory {
    fn supports(&self, _format: &EncodingFormat) -> bool {
        self.supported
    }

    fn create(
        &self,
        source: &CombinedSource,
        _format: &EncodingFormat,
        settings: &EncoderSettings,
    ) -> ReelkitResult<Box<dyn Encoder>> {
        if source.tracks.is_empty() {
            return Err(ReelkitError::capture("combined source has no tracks"));
        }
        Ok(Box::new(SimulatedEncoder::new(settings)))
    }
}

/// Deterministic [`Encoder`] implementation.
pub struct SimulatedEncoder {
    interval_ms: u64,
    bytes_per_second: u64,
    clock: Option<RecordingClock>,
    emitted: u64,
    finished: bool,
}

impl SimulatedEncoder {
    fn new(settings: &EncoderSettings) -> Self {
        Self {
            interval_ms: settings.segment_interval.as_millis().max(1) as u64,
            bytes_per_second: u64::from(settings.video_bits_per_second) / 8,
            clock: None,
            emitted: 0,
            finished: false,
        }
    }

    fn segment_for_span(&self, index: u64, span_ms: u64) -> Segment {
        let size = (self.bytes_per_second * span_ms / 1000).max(1) as usize;
        Segment {
            data: vec![(index % 251) as u8; size],
        }
    }

    /// Segments owed for recording time that has elapsed since the last
    /// drain.
    fn drain_due(&mut self) -> Vec<Segment> {
        let Some(clock) = &self.clock else {
            return Vec::new();
        };
        let due = clock.recorded().as_millis() as u64 / self.interval_ms;
        let mut out = Vec::new();
        while self.emitted < due {
            out.push(self.segment_for_span(self.emitted, self.interval_ms));
            self.emitted += 1;
        }
        out
    }
}

impl Encoder for SimulatedEncoder {
    fn start(&mut self) -> ReelkitResult<()> {
        if self.clock.is_some() {
            return Err(ReelkitError::capture("encoder already started"));
        }
        self.clock = Some(RecordingClock::start());
        Ok(())
    }

    fn pause(&mut self) -> ReelkitResult<()> {
        match self.clock.as_mut() {
            Some(clock) => {
                clock.pause();
                Ok(())
            }
            None => Err(ReelkitError::capture("encoder not started")),
        }
    }

    fn resume(&mut self) -> ReelkitResult<()> {
        match self.clock.as_mut() {
            Some(clock) => {
                clock.resume();
                Ok(())
            }
            None => Err(ReelkitError::capture("encoder not started")),
        }
    }

    fn take_segments(&mut self) -> Vec<Segment> {
        if self.finished {
            return Vec::new();
        }
        self.drain_due()
    }

    fn finalize(&mut self) -> ReelkitResult<Vec<Segment>> {
        if self.clock.is_none() {
            return Err(ReelkitError::capture("encoder not started"));
        }
        if self.finished {
            return Ok(Vec::new());
        }
        let mut tail = self.drain_due();

        // Flush the fractional remainder past the last full segment.
        let recorded_ms = self
            .clock
            .as_ref()
            .map(|c| c.recorded().as_millis() as u64)
            .unwrap_or(0);
        let remainder_ms = recorded_ms - self.emitted * self.interval_ms;
        if remainder_ms > 0 {
            tail.push(self.segment_for_span(self.emitted, remainder_ms));
        }
        self.finished = true;
        Ok(tail)
    }
}
