//! ReelKit Source Acquisition
//!
//! Acquires the live media sources for a recording session (the mandatory
//! screen surface plus optional microphone and camera) and merges their
//! tracks into one combined source for the encoder. Owns the draggable
//! camera overlay widget for the lifetime of the session.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────┐
//! │                SourceAcquirer                  │
//! │  ┌─────────┐  ┌────────────┐  ┌─────────┐      │
//! │  │ Display │  │ Microphone │  │ Camera  │      │
//! │  │ (must)  │  │ (optional) │  │(optional)│     │
//! │  └────┬────┘  └─────┬──────┘  └────┬────┘      │
//! │       │             │              │           │
//! │       ▼             ▼              ▼           │
//! │  ┌──────────────────────────┐ ┌─────────────┐  │
//! │  │      CombinedSource      │ │OverlayWidget│  │
//! │  └──────────────────────────┘ └─────────────┘  │
//! └────────────────────────────────────────────────┘
//! ```

pub mod acquirer;
pub mod overlay;
pub mod provider;
pub mod simulated;
pub mod source;

pub use acquirer::*;
pub use overlay::{clamp_position, Bounds, OverlayWidget, Position, Size};
pub use provider::*;
pub use source::*;
