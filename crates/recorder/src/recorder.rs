//! The session facade collaborators interact with.
//!
//! One `ScreenRecorder` runs at most one session at a time. It sequences
//! acquisition and encoding, owns the 1-second tick that refreshes elapsed
//! time and drains encoder output, and watches the display source so an
//! external end runs the same finalize path as a caller stop. Sources are
//! released on every exit path, including failures during finalization.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use reelkit_common::config::{RecordingConfiguration, RecordingDefaults};
use reelkit_common::error::{ReelkitError, ReelkitResult};
use reelkit_sources::{
    AcquiredSources, OverlayWidget, SourceAcquirer, SourceProvider, SourceWarning,
};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::encoder::{Artifact, EncoderFactory, EncoderSettings};
use crate::notifier::StateNotifier;
use crate::session::{EncodingSession, SessionState, StateSnapshot, StopReason};

struct RecorderInner {
    session: EncodingSession,
    acquired: Option<AcquiredSources>,
    tasks: Vec<JoinHandle<()>>,
    completed: Option<Artifact>,
}

impl RecorderInner {
    /// Finalize the session and tear everything down. Source release and
    /// task shutdown happen unconditionally, before any finalization error
    /// can surface.
    fn finish(&mut self, reason: StopReason) -> ReelkitResult<Artifact> {
        let result = self.session.finalize(reason);
        if let Some(mut acquired) = self.acquired.take() {
            acquired.release();
        }
        for task in self.tasks.drain(..) {
            task.abort();
        }
        result
    }
}

/// The recording session engine.
///
/// An explicit session object: create one per control surface with an
/// injected [`SourceProvider`] and [`EncoderFactory`], no process-wide
/// state. The at-most-one-active-session invariant is enforced by the
/// `start` guard.
pub struct ScreenRecorder {
    acquirer: SourceAcquirer,
    encoders: Arc<dyn EncoderFactory>,
    settings: EncoderSettings,
    tick_interval: Duration,
    notifier: Arc<StateNotifier>,
    inner: Arc<Mutex<RecorderInner>>,
}

impl ScreenRecorder {
    pub fn new(provider: Box<dyn SourceProvider>, encoders: Arc<dyn EncoderFactory>) -> Self {
        Self::with_defaults(provider, encoders, &RecordingDefaults::default())
    }

    pub fn with_defaults(
        provider: Box<dyn SourceProvider>,
        encoders: Arc<dyn EncoderFactory>,
        defaults: &RecordingDefaults,
    ) -> Self {
        Self {
            acquirer: SourceAcquirer::new(provider),
            encoders,
            settings: EncoderSettings::from(defaults),
            tick_interval: Duration::from_millis(defaults.tick_interval_ms),
            notifier: Arc::new(StateNotifier::new()),
            inner: Arc::new(Mutex::new(RecorderInner {
                session: EncodingSession::new(),
                acquired: None,
                tasks: Vec::new(),
                completed: None,
            })),
        }
    }

    /// Start a recording session.
    ///
    /// Acquires sources, probes for an encoding format, and begins
    /// encoding. Optional-source denials are returned as warnings; any
    /// fatal failure releases whatever was acquired and propagates. Fails
    /// with `SessionAlreadyActive` while a session is running.
    pub async fn start(
        &self,
        config: RecordingConfiguration,
    ) -> ReelkitResult<Vec<SourceWarning>> {
        {
            let mut inner = self.inner.lock().unwrap();
            if inner.session.state() != SessionState::Idle {
                return Err(ReelkitError::session_already_active(
                    "a recording session is already running",
                ));
            }
            if inner.completed.take().is_some() {
                tracing::warn!("Discarding unclaimed artifact from an interrupted session");
            }
            inner.session.mark_acquiring();
        }

        let mut acquired = match self.acquirer.acquire(&config).await {
            Ok(acquired) => acquired,
            Err(e) => {
                let mut inner = self.inner.lock().unwrap();
                inner.session.reset_idle();
                drop(inner);
                self.notifier.notify(StateSnapshot::idle());
                return Err(e);
            }
        };

        let mut inner = self.inner.lock().unwrap();
        if let Err(e) =
            inner
                .session
                .begin(self.encoders.as_ref(), &acquired.combined, &self.settings)
        {
            acquired.release();
            drop(inner);
            self.notifier.notify(StateSnapshot::idle());
            return Err(e);
        }

        let warnings = acquired.warnings.clone();
        let ended = acquired.sources.display_ended();
        inner.acquired = Some(acquired);

        inner.tasks.push(spawn_tick(
            self.inner.clone(),
            self.notifier.clone(),
            self.tick_interval,
        ));
        if let Some(ended) = ended {
            inner.tasks.push(spawn_end_watcher(
                ended,
                self.inner.clone(),
                self.notifier.clone(),
            ));
        }

        let snapshot = inner.session.snapshot();
        drop(inner);
        tracing::info!("Recording started");
        self.notifier.notify(snapshot);
        Ok(warnings)
    }

    /// Pause recording. No-op when already paused; `NoActiveSession` when
    /// nothing is recording.
    pub fn pause(&self) -> ReelkitResult<()> {
        let snapshot = {
            let mut inner = self.inner.lock().unwrap();
            if !inner.session.pause()? {
                return Ok(());
            }
            inner.session.snapshot()
        };
        tracing::info!("Recording paused");
        self.notifier.notify(snapshot);
        Ok(())
    }

    /// Resume a paused recording. No-op when already recording;
    /// `NoActiveSession` when nothing is recording.
    pub fn resume(&self) -> ReelkitResult<()> {
        let snapshot = {
            let mut inner = self.inner.lock().unwrap();
            if !inner.session.resume()? {
                return Ok(());
            }
            inner.session.snapshot()
        };
        tracing::info!("Recording resumed");
        self.notifier.notify(snapshot);
        Ok(())
    }

    /// Stop the session and return its artifact.
    ///
    /// The only cancellation path: always produces an artifact from
    /// whatever was captured. If the session was already finalized by an
    /// external interruption, the retained artifact is returned. Sources
    /// are released before any finalization error is surfaced.
    pub fn stop(&self) -> ReelkitResult<Artifact> {
        let (result, snapshot) = {
            let mut inner = self.inner.lock().unwrap();
            if !inner.session.is_active() {
                if let Some(artifact) = inner.completed.take() {
                    return Ok(artifact);
                }
                return Err(ReelkitError::no_active_session("no recording in progress"));
            }
            let result = inner.finish(StopReason::Caller);
            (result, inner.session.snapshot())
        };
        self.notifier.notify(snapshot);
        match &result {
            Ok(artifact) => tracing::info!(
                duration_seconds = artifact.duration_seconds,
                "Recording stopped"
            ),
            Err(e) => tracing::error!(error = %e, "Recording stop failed"),
        }
        result
    }

    /// Current state.
    pub fn state(&self) -> StateSnapshot {
        self.inner.lock().unwrap().session.snapshot()
    }

    /// Subscribe to state changes. The receiver immediately holds the last
    /// known snapshot; every transition and every tick publishes.
    pub fn subscribe(&self) -> watch::Receiver<StateSnapshot> {
        self.notifier.subscribe()
    }

    /// Run a closure against the camera overlay, if the active session has
    /// one. This is how a rendering layer feeds pointer events in.
    pub fn with_overlay<R>(&self, f: impl FnOnce(&mut OverlayWidget) -> R) -> Option<R> {
        let mut inner = self.inner.lock().unwrap();
        inner
            .acquired
            .as_mut()
            .and_then(|a| a.overlay.as_mut())
            .map(f)
    }
}

/// The periodic tick: refreshes elapsed time, drains encoder output, and
/// always publishes a snapshot. Elapsed time stays frozen while paused.
fn spawn_tick(
    inner: Arc<Mutex<RecorderInner>>,
    notifier: Arc<StateNotifier>,
    period: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first tick completes immediately.
        interval.tick().await;
        loop {
            interval.tick().await;
            let snapshot = {
                let mut inner = inner.lock().unwrap();
                if !inner.session.is_active() {
                    break;
                }
                inner.session.poll_segments();
                inner.session.snapshot()
            };
            notifier.notify(snapshot);
        }
    })
}

/// Watches the display source's end signal and, if it fires mid-session,
/// runs the same finalize path as a caller stop. The artifact is retained
/// for the next `stop` call.
fn spawn_end_watcher(
    mut ended: watch::Receiver<bool>,
    inner: Arc<Mutex<RecorderInner>>,
    notifier: Arc<StateNotifier>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            if *ended.borrow() {
                break;
            }
            if ended.changed().await.is_err() {
                return;
            }
        }
        let snapshot = {
            let mut inner = inner.lock().unwrap();
            if !inner.session.is_active() {
                return;
            }
            tracing::warn!("Display source ended outside the session, finalizing");
            match inner.finish(StopReason::SourceEnded) {
                Ok(artifact) => inner.completed = Some(artifact),
                Err(e) => tracing::error!(error = %e, "Finalization after source end failed"),
            }
            inner.session.snapshot()
        };
        notifier.notify(snapshot);
    })
}
