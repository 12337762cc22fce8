//! Prelude for rcin-capture.
//!
//! This module re-exports the most commonly used types for convenient importing.
//!
//! # Example
//!
//! ```rust
//! use rcin_capture::prelude::*;
//!
//! let config = ReceiverConfig::builder()
//!     .pins(&[0, 1, 2, 3])
//!     .pulse_window(PulseWindow::CAPTURE)
//!     .initial_value_us(CENTER_US)
//!     .build()
//!     .expect("valid configuration");
//! let engine = CaptureEngine::new(&config);
//! assert_eq!(engine.reading(0).width_us, CENTER_US);
//! ```

pub use crate::channel::{Edge, EdgeCaptureChannel, EdgeOutcome, ExpectedEdge};
pub use crate::config::{
    CENTER_US, DEFAULT_TIMEOUT_WRAPS, MAX_CHANNELS, NO_SIGNAL_US, PulseWindow, ReceiverConfig,
    ReceiverConfigBuilder,
};
pub use crate::decoder::ReceiverDecoder;
pub use crate::engine::CaptureEngine;
pub use crate::error::{CaptureError, CaptureResult};
pub use crate::snapshot::{ChannelReading, ChannelSnapshot};
pub use crate::stats::{CaptureCounters, CaptureStats};
pub use crate::validator::PulseValidator;
