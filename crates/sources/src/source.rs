//! Live media sources and the combined track set handed to the encoder.

use reelkit_common::error::ReelkitResult;
use serde::Serialize;
use tokio::sync::watch;

/// The role a source plays in the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceRole {
    /// The captured screen surface (mandatory).
    Display,
    /// Microphone input (optional).
    Microphone,
    /// Webcam feed (optional).
    Camera,
}

/// The kind of a single media track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackKind {
    Video,
    Audio,
}

/// One live track exposed by a source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackInfo {
    /// Stable identifier within the session.
    pub id: String,

    /// Video or audio.
    pub kind: TrackKind,

    /// Role of the source that produced it.
    pub role: SourceRole,
}

/// A live capture source held for the duration of one session.
///
/// Implementations wrap whatever the platform hands out (a portal stream, a
/// device node, a test double). `stop` must be idempotent: stopping an
/// already-stopped source is a no-op.
pub trait MediaSource: Send {
    /// The role of this source.
    fn role(&self) -> SourceRole;

    /// The live tracks this source contributes.
    fn tracks(&self) -> Vec<TrackInfo>;

    /// Stop the source and release the underlying capture. Idempotent.
    fn stop(&mut self) -> ReelkitResult<()>;

    /// Whether the source has been stopped.
    fn is_stopped(&self) -> bool;

    /// A signal that flips to `true` if the source ends outside the
    /// session's control. Only the display source is expected to provide
    /// one.
    fn ended(&self) -> Option<watch::Receiver<bool>> {
        None
    }
}

/// An ordered set of acquired sources, owned exclusively by one session.
///
/// Every source in the set is stopped exactly once, on normal stop or on
/// any error path; `release` may be called repeatedly and on a partially
/// populated set.
pub struct SourceSet {
    sources: Vec<Box<dyn MediaSource>>,
}

impl SourceSet {
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
        }
    }

    /// Add a source. Acquisition order is preserved.
    pub fn push(&mut self, source: Box<dyn MediaSource>) {
        self.sources.push(source);
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Roles present in the set, in acquisition order.
    pub fn roles(&self) -> Vec<SourceRole> {
        self.sources.iter().map(|s| s.role()).collect()
    }

    pub fn has_role(&self, role: SourceRole) -> bool {
        self.sources.iter().any(|s| s.role() == role)
    }

    /// The camera video track, if a camera source was acquired.
    pub fn camera_track(&self) -> Option<TrackInfo> {
        self.sources
            .iter()
            .filter(|s| s.role() == SourceRole::Camera)
            .flat_map(|s| s.tracks())
            .find(|t| t.kind == TrackKind::Video)
    }

    /// The external-end signal of the display source, if it exposes one.
    pub fn display_ended(&self) -> Option<watch::Receiver<bool>> {
        self.sources
            .iter()
            .find(|s| s.role() == SourceRole::Display)
            .and_then(|s| s.ended())
    }

    /// Merge all tracks into the combined source handed to the encoder.
    ///
    /// Order: display video, display audio, microphone audio, camera video.
    /// The order matters only for deterministic downstream behavior.
    pub fn combined(&self) -> CombinedSource {
        let mut tracks = Vec::new();
        for role in [SourceRole::Display, SourceRole::Microphone, SourceRole::Camera] {
            for source in self.sources.iter().filter(|s| s.role() == role) {
                let mut source_tracks = source.tracks();
                source_tracks.sort_by_key(|t| match t.kind {
                    TrackKind::Video => 0,
                    TrackKind::Audio => 1,
                });
                tracks.extend(source_tracks);
            }
        }
        CombinedSource { tracks }
    }

    /// Stop every source in the set. Safe to call repeatedly; a stop
    /// failure is logged and does not prevent the remaining sources from
    /// being stopped.
    pub fn release(&mut self) {
        for source in &mut self.sources {
            if source.is_stopped() {
                continue;
            }
            if let Err(e) = source.stop() {
                tracing::warn!(role = ?source.role(), error = %e, "Failed to stop source");
            }
        }
    }
}

impl Default for SourceSet {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for SourceSet {
    fn drop(&mut self) {
        self.release();
    }
}

/// The single multiplexed source handed to the encoder: all acquired
/// tracks in merge order.
#[derive(Debug, Clone)]
pub struct CombinedSource {
    pub tracks: Vec<TrackInfo>,
}

impl CombinedSource {
    pub fn has_video(&self) -> bool {
        self.tracks.iter().any(|t| t.kind == TrackKind::Video)
    }

    pub fn has_audio(&self) -> bool {
        self.tracks.iter().any(|t| t.kind == TrackKind::Audio)
    }
}
