//! A deterministic in-process source provider.
//!
//! Stands in for platform capture in tests and the CLI demo: grants or
//! denies each role per configuration, counts underlying stops so release
//! semantics can be asserted, and lets a test end the display source from
//! the outside to exercise the external-interruption path.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use reelkit_common::error::{ReelkitError, ReelkitResult};
use tokio::sync::watch;

use crate::overlay::Bounds;
use crate::provider::{AudioConstraints, CameraRequest, DisplayRequest, SourceProvider};
use crate::source::{MediaSource, SourceRole, TrackInfo, TrackKind};

struct SourceRecord {
    role: SourceRole,
    stopped: Arc<AtomicBool>,
    platform_stops: Arc<AtomicUsize>,
}

struct Shared {
    deny_display: bool,
    deny_microphone: bool,
    deny_camera: bool,
    viewport: Bounds,
    log: Mutex<Vec<SourceRecord>>,
    display_end: Mutex<Option<watch::Sender<bool>>>,
}

/// Deterministic [`SourceProvider`] for tests and demos.
///
/// Clones share state, so a test can keep a handle while the recorder owns
/// the boxed provider.
#[derive(Clone)]
pub struct SimulatedProvider {
    shared: Arc<Shared>,
}

impl SimulatedProvider {
    /// A provider that grants every request, with a 1280x720 viewport.
    pub fn new() -> Self {
        Self::build(false, false, false)
    }

    fn build(deny_display: bool, deny_microphone: bool, deny_camera: bool) -> Self {
        Self {
            shared: Arc::new(Shared {
                deny_display,
                deny_microphone,
                deny_camera,
                viewport: Bounds {
                    width: 1280.0,
                    height: 720.0,
                },
                log: Mutex::new(Vec::new()),
                display_end: Mutex::new(None),
            }),
        }
    }

    /// Refuse the mandatory display request.
    pub fn deny_display(self) -> Self {
        Self::build(true, self.shared.deny_microphone, self.shared.deny_camera)
    }

    /// Refuse microphone requests.
    pub fn deny_microphone(self) -> Self {
        Self::build(self.shared.deny_display, true, self.shared.deny_camera)
    }

    /// Refuse camera requests.
    pub fn deny_camera(self) -> Self {
        Self::build(self.shared.deny_display, self.shared.deny_microphone, true)
    }

    /// Roles granted so far, in acquisition order.
    pub fn opened_roles(&self) -> Vec<SourceRole> {
        self.shared.log.lock().unwrap().iter().map(|r| r.role).collect()
    }

    /// How many times the underlying capture for `role` was actually
    /// stopped. Stays at 1 no matter how often release runs.
    pub fn platform_stops(&self, role: SourceRole) -> usize {
        self.shared
            .log
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.role == role)
            .map(|r| r.platform_stops.load(Ordering::SeqCst))
            .sum()
    }

    /// Whether every granted source has been stopped.
    pub fn all_stopped(&self) -> bool {
        self.shared
            .log
            .lock()
            .unwrap()
            .iter()
            .all(|r| r.stopped.load(Ordering::SeqCst))
    }

    /// End the current display source from the outside, as if the captured
    /// surface went away.
    pub fn end_display(&self) {
        if let Some(tx) = self.shared.display_end.lock().unwrap().as_ref() {
            tx.send(true).ok();
        }
    }

    fn register(
        &self,
        role: SourceRole,
        tracks: Vec<TrackInfo>,
        ended: Option<watch::Receiver<bool>>,
    ) -> SimulatedSource {
        let stopped = Arc::new(AtomicBool::new(false));
        let platform_stops = Arc::new(AtomicUsize::new(0));
        self.shared.log.lock().unwrap().push(SourceRecord {
            role,
            stopped: stopped.clone(),
            platform_stops: platform_stops.clone(),
        });
        SimulatedSource {
            role,
            tracks,
            stopped,
            platform_stops,
            ended,
        }
    }
}

impl Default for SimulatedProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl SourceProvider for SimulatedProvider {
    async fn open_display(&self, request: &DisplayRequest) -> ReelkitResult<Box<dyn MediaSource>> {
        if self.shared.deny_display {
            return Err(ReelkitError::capture("screen capture request refused"));
        }
        let (tx, rx) = watch::channel(false);
        *self.shared.display_end.lock().unwrap() = Some(tx);

        let mut tracks = vec![TrackInfo {
            id: "display:video".to_string(),
            kind: TrackKind::Video,
            role: SourceRole::Display,
        }];
        if request.audio.is_some() {
            tracks.push(TrackInfo {
                id: "display:audio".to_string(),
                kind: TrackKind::Audio,
                role: SourceRole::Display,
            });
        }
        Ok(Box::new(self.register(SourceRole::Display, tracks, Some(rx))))
    }

    async fn open_microphone(
        &self,
        _constraints: &AudioConstraints,
    ) -> ReelkitResult<Box<dyn MediaSource>> {
        if self.shared.deny_microphone {
            return Err(ReelkitError::capture("microphone access refused"));
        }
        let tracks = vec![TrackInfo {
            id: "microphone:audio".to_string(),
            kind: TrackKind::Audio,
            role: SourceRole::Microphone,
        }];
        Ok(Box::new(self.register(SourceRole::Microphone, tracks, None)))
    }

    async fn open_camera(&self, _request: &CameraRequest) -> ReelkitResult<Box<dyn MediaSource>> {
        if self.shared.deny_camera {
            return Err(ReelkitError::capture("camera access refused"));
        }
        let tracks = vec![TrackInfo {
            id: "camera:video".to_string(),
            kind: TrackKind::Video,
            role: SourceRole::Camera,
        }];
        Ok(Box::new(self.register(SourceRole::Camera, tracks, None)))
    }

    fn viewport(&self) -> Bounds {
        self.shared.viewport
    }
}

/// A granted source backed by nothing but bookkeeping.
pub struct SimulatedSource {
    role: SourceRole,
    tracks: Vec<TrackInfo>,
    stopped: Arc<AtomicBool>,
    platform_stops: Arc<AtomicUsize>,
    ended: Option<watch::Receiver<bool>>,
}

impl MediaSource for SimulatedSource {
    fn role(&self) -> SourceRole {
        self.role
    }

    fn tracks(&self) -> Vec<TrackInfo> {
        self.tracks.clone()
    }

    fn stop(&mut self) -> ReelkitResult<()> {
        if !self.stopped.swap(true, Ordering::SeqCst) {
            self.platform_stops.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }

    fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    fn ended(&self) -> Option<watch::Receiver<bool>> {
        self.ended.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stop_is_counted_once() {
        let provider = SimulatedProvider::new();
        let mut source = provider
            .open_display(&DisplayRequest::new(true))
            .await
            .unwrap();

        source.stop().unwrap();
        source.stop().unwrap();

        assert!(source.is_stopped());
        assert_eq!(provider.platform_stops(SourceRole::Display), 1);
    }

    #[tokio::test]
    async fn end_display_flips_the_signal() {
        let provider = SimulatedProvider::new();
        let source = provider
            .open_display(&DisplayRequest::new(false))
            .await
            .unwrap();

        let mut ended = source.ended().unwrap();
        assert!(!*ended.borrow());

        provider.end_display();
        ended.changed().await.unwrap();
        assert!(*ended.borrow());
    }
}
