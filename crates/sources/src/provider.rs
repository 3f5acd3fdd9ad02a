//! The platform seam for source acquisition.
//!
//! A [`SourceProvider`] is whatever grants access to live capture: a
//! desktop portal, device APIs, or the in-tree simulated provider. The
//! acquirer is written entirely against this trait.

use reelkit_common::error::ReelkitResult;

use crate::overlay::Bounds;
use crate::source::MediaSource;

/// Constraints for an audio track request.
#[derive(Debug, Clone, Copy)]
pub struct AudioConstraints {
    pub echo_cancellation: bool,
    pub noise_suppression: bool,
    pub auto_gain_control: bool,
    pub sample_rate: u32,
    pub channel_count: u32,
}

impl AudioConstraints {
    /// Constraints for desktop/system audio captured jointly with the
    /// screen surface: processing off, stereo.
    pub fn system() -> Self {
        Self {
            echo_cancellation: false,
            noise_suppression: false,
            auto_gain_control: false,
            sample_rate: 44_100,
            channel_count: 2,
        }
    }

    /// Constraints for a microphone: voice processing on.
    pub fn microphone() -> Self {
        Self {
            echo_cancellation: true,
            noise_suppression: true,
            auto_gain_control: true,
            sample_rate: 44_100,
            channel_count: 1,
        }
    }
}

/// Request for the mandatory screen surface.
#[derive(Debug, Clone, Copy)]
pub struct DisplayRequest {
    /// Ideal capture width.
    pub width: u32,
    /// Ideal capture height.
    pub height: u32,
    /// Ideal frame rate.
    pub frame_rate: u32,
    /// System audio to request jointly with the surface, if any.
    pub audio: Option<AudioConstraints>,
}

impl DisplayRequest {
    pub fn new(capture_audio: bool) -> Self {
        Self {
            width: 1920,
            height: 1080,
            frame_rate: 30,
            audio: capture_audio.then(AudioConstraints::system),
        }
    }
}

/// Request for the optional camera feed.
#[derive(Debug, Clone, Copy)]
pub struct CameraRequest {
    /// Ideal capture width.
    pub width: u32,
    /// Ideal capture height.
    pub height: u32,
    /// Ideal frame rate.
    pub frame_rate: u32,
}

impl Default for CameraRequest {
    fn default() -> Self {
        Self {
            width: 320,
            height: 180,
            frame_rate: 30,
        }
    }
}

/// Abstract interface to the platform's capture grants.
///
/// Each `open_*` call suspends until the platform grants or refuses
/// access; no resources beyond already-granted sources are held while a
/// request is pending.
#[async_trait::async_trait]
pub trait SourceProvider: Send + Sync {
    /// Request the screen surface (and, optionally, joint system audio).
    async fn open_display(&self, request: &DisplayRequest) -> ReelkitResult<Box<dyn MediaSource>>;

    /// Request a microphone track.
    async fn open_microphone(
        &self,
        constraints: &AudioConstraints,
    ) -> ReelkitResult<Box<dyn MediaSource>>;

    /// Request a camera feed.
    async fn open_camera(&self, request: &CameraRequest) -> ReelkitResult<Box<dyn MediaSource>>;

    /// Viewport dimensions the overlay widget is confined to.
    fn viewport(&self) -> Bounds;
}
