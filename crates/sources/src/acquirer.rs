//! Source acquisition sequencing.
//!
//! The display surface is requested first and is mandatory; microphone and
//! camera follow and are best-effort. Optional denials are reported as
//! warnings, never as failures.

use reelkit_common::config::RecordingConfiguration;
use reelkit_common::error::{ReelkitError, ReelkitResult};
use serde::Serialize;

use crate::overlay::OverlayWidget;
use crate::provider::{AudioConstraints, CameraRequest, DisplayRequest, SourceProvider};
use crate::source::{CombinedSource, SourceRole, SourceSet};

/// A non-fatal acquisition failure for an optional source, reported to the
/// caller alongside a successful start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceWarning {
    pub role: SourceRole,
    pub message: String,
}

/// Everything acquired for one session. Exclusively owned by the session;
/// torn down together when it ends, however it ends.
pub struct AcquiredSources {
    pub sources: SourceSet,
    pub combined: CombinedSource,
    pub overlay: Option<OverlayWidget>,
    pub warnings: Vec<SourceWarning>,
}

impl AcquiredSources {
    /// Stop every source and destroy the overlay. Idempotent, and safe on
    /// a partially populated set.
    pub fn release(&mut self) {
        self.sources.release();
        if self.overlay.take().is_some() {
            tracing::debug!("Camera overlay destroyed");
        }
    }
}

/// Acquires and releases the live sources for a session.
pub struct SourceAcquirer {
    provider: Box<dyn SourceProvider>,
}

impl SourceAcquirer {
    pub fn new(provider: Box<dyn SourceProvider>) -> Self {
        Self { provider }
    }

    /// Acquire all sources the configuration asks for.
    ///
    /// Fails with `SourceDenied` if the display surface is refused; nothing
    /// is retained in that case. Microphone and camera refusals degrade to
    /// [`SourceWarning`]s.
    pub async fn acquire(
        &self,
        config: &RecordingConfiguration,
    ) -> ReelkitResult<AcquiredSources> {
        let mut sources = SourceSet::new();
        let mut warnings = Vec::new();

        let display_request = DisplayRequest::new(config.wants_system_audio());
        let display = self
            .provider
            .open_display(&display_request)
            .await
            .map_err(|e| {
                ReelkitError::source_denied(format!("display capture refused: {e}"))
            })?;
        sources.push(display);
        tracing::info!(
            system_audio = config.wants_system_audio(),
            "Display source acquired"
        );

        if config.wants_microphone() {
            match self
                .provider
                .open_microphone(&AudioConstraints::microphone())
                .await
            {
                Ok(mic) => {
                    sources.push(mic);
                    tracing::info!("Microphone source acquired");
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Microphone access denied, continuing without it");
                    warnings.push(SourceWarning {
                        role: SourceRole::Microphone,
                        message: e.to_string(),
                    });
                }
            }
        }

        if config.use_webcam {
            match self.provider.open_camera(&CameraRequest::default()).await {
                Ok(camera) => {
                    sources.push(camera);
                    tracing::info!("Camera source acquired");
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Camera access denied, continuing without it");
                    warnings.push(SourceWarning {
                        role: SourceRole::Camera,
                        message: e.to_string(),
                    });
                }
            }
        }

        let overlay = sources
            .camera_track()
            .map(|track| OverlayWidget::new(track, self.provider.viewport()));
        let combined = sources.combined();

        Ok(AcquiredSources {
            sources,
            combined,
            overlay,
            warnings,
        })
    }
}
