//! Encoder seams and the format preference list.
//!
//! The session probes a preference-ordered list of container/codec
//! combinations and hands the combined source to the first one the
//! installed [`EncoderFactory`] supports. Encoded output is pulled as
//! discrete segments and concatenated into the final artifact.

use std::time::Duration;

use reelkit_common::config::RecordingDefaults;
use reelkit_common::error::{ReelkitError, ReelkitResult};
use reelkit_sources::CombinedSource;

/// A container/codec combination the encoder can be asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodingFormat {
    /// Container name, e.g. `webm`.
    pub container: &'static str,

    /// Video and audio codec pair, or `None` for the container default.
    pub codecs: Option<(&'static str, &'static str)>,
}

impl EncodingFormat {
    /// MIME type string for this format.
    pub fn mime_type(&self) -> String {
        match self.codecs {
            Some((video, audio)) => format!("video/{};codecs={},{}", self.container, video, audio),
            None => format!("video/{}", self.container),
        }
    }
}

/// Formats to probe, most preferred first.
pub const PREFERRED_FORMATS: [EncodingFormat; 4] = [
    EncodingFormat {
        container: "webm",
        codecs: Some(("vp8", "opus")),
    },
    EncodingFormat {
        container: "webm",
        codecs: Some(("vp9", "opus")),
    },
    EncodingFormat {
        container: "webm",
        codecs: Some(("h264", "opus")),
    },
    EncodingFormat {
        container: "webm",
        codecs: None,
    },
];

/// Encoder tuning for one session.
#[derive(Debug, Clone, Copy)]
pub struct EncoderSettings {
    /// Target video bitrate (bits per second).
    pub video_bits_per_second: u32,

    /// Target audio bitrate (bits per second).
    pub audio_bits_per_second: u32,

    /// How often an encoded segment should be produced.
    pub segment_interval: Duration,
}

impl From<&RecordingDefaults> for EncoderSettings {
    fn from(defaults: &RecordingDefaults) -> Self {
        Self {
            video_bits_per_second: defaults.video_bits_per_second,
            audio_bits_per_second: defaults.audio_bits_per_second,
            segment_interval: Duration::from_millis(defaults.segment_interval_ms),
        }
    }
}

impl Default for EncoderSettings {
    fn default() -> Self {
        Self::from(&RecordingDefaults::default())
    }
}

/// One encoded chunk of output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub data: Vec<u8>,
}

impl Segment {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// The finalized recording output.
#[derive(Debug, Clone)]
pub struct Artifact {
    /// All segments concatenated in arrival order.
    pub payload: Vec<u8>,

    /// MIME type of the payload.
    pub mime_type: String,

    /// Net recording time in whole seconds.
    pub duration_seconds: u64,
}

/// An active encoder over one combined source.
///
/// Output is pulled: `take_segments` drains every segment produced since
/// the last call, in production order. Nothing is produced while paused.
pub trait Encoder: Send {
    /// Begin encoding.
    fn start(&mut self) -> ReelkitResult<()>;

    /// Suspend segment production.
    fn pause(&mut self) -> ReelkitResult<()>;

    /// Resume segment production.
    fn resume(&mut self) -> ReelkitResult<()>;

    /// Drain segments produced since the last drain.
    fn take_segments(&mut self) -> Vec<Segment>;

    /// Stop encoding and flush. Returns any trailing segments; after this
    /// the encoder produces nothing.
    fn finalize(&mut self) -> ReelkitResult<Vec<Segment>>;
}

/// Creates encoders and answers format-support probes.
pub trait EncoderFactory: Send + Sync {
    /// Whether this factory can encode the given format on this host.
    fn supports(&self, format: &EncodingFormat) -> bool;

    /// Create an encoder for the combined source.
    fn create(
        &self,
        source: &CombinedSource,
        format: &EncodingFormat,
        settings: &EncoderSettings,
    ) -> ReelkitResult<Box<dyn Encoder>>;
}

/// Pick the first supported format from the preference list.
pub fn select_format(factory: &dyn EncoderFactory) -> ReelkitResult<EncodingFormat> {
    PREFERRED_FORMATS
        .iter()
        .copied()
        .find(|f| factory.supports(f))
        .ok_or_else(|| {
            ReelkitError::no_supported_format("no preferred container/codec combination is usable")
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mime_types_render_codecs() {
        assert_eq!(PREFERRED_FORMATS[0].mime_type(), "video/webm;codecs=vp8,opus");
        assert_eq!(PREFERRED_FORMATS[3].mime_type(), "video/webm");
    }

    #[test]
    fn settings_follow_recording_defaults() {
        let settings = EncoderSettings::default();
        assert_eq!(settings.video_bits_per_second, 1_000_000);
        assert_eq!(settings.audio_bits_per_second, 128_000);
        assert_eq!(settings.segment_interval, Duration::from_millis(500));
    }
}
