//! ReelKit Recording Engine
//!
//! Drives one recording session end to end: source acquisition through the
//! acquirer, encoder lifecycle and pause-aware time accounting in the
//! encoding session, and state notification for UI consumers. The
//! [`ScreenRecorder`] facade is the single entry point collaborators use.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │                 ScreenRecorder                   │
//! │  ┌───────────────┐   ┌────────────────────────┐  │
//! │  │ SourceAcquirer│──▶│    EncodingSession     │  │
//! │  │ (sources +    │   │ (format, segments,     │  │
//! │  │  overlay)     │   │  pause accounting)     │  │
//! │  └───────────────┘   └───────────┬────────────┘  │
//! │                                  │ tick / events │
//! │                      ┌───────────▼────────────┐  │
//! │                      │     StateNotifier      │  │
//! │                      └────────────────────────┘  │
//! └──────────────────────────────────────────────────┘
//! ```

pub mod encoder;
pub mod notifier;
pub mod recorder;
pub mod session;
pub mod simulated;

pub use encoder::*;
pub use notifier::*;
pub use recorder::*;
pub use session::*;
