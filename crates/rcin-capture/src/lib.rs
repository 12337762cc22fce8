//! # rcin-capture
//!
//! Edge capture core shared by every RC receiver decoding strategy.
//!
//! This crate provides a `#![no_std]` capture layer with:
//! - `EdgeCaptureChannel`, the per-channel rise/fall state machine
//! - `PulseValidator` with configurable pulse and frame-gap windows
//! - `ChannelSnapshot`, torn-free readings shared with the main loop
//! - `CaptureEngine`, the channel bank backends drive from interrupt context
//! - `ReceiverDecoder`, the consumer-facing capability trait
//!
//! ## Real-Time Safety
//!
//! - **No heap allocations**; every channel is allocated at construction
//! - **Bounded interrupt work**: one channel per edge, the channel count per
//!   timer wrap
//! - Runtime capture faults are counted, never returned as errors
//!
//! ## Channel Lifecycle
//!
//! ```text
//! initialize ──► stale, initial value
//!                  │ rise + fall inside window
//!                  ▼
//!                live ◄──── rejected pulse keeps last value
//!                  │ no edges for `timeout_wraps` timer wraps
//!                  ▼
//!                stale, NO_SIGNAL_US
//! ```
//!
//! ## Example
//!
//! ```rust
//! use rcin_capture::prelude::*;
//! use rcin_timer::TimerState;
//!
//! let config = ReceiverConfig::builder().pins(&[4, 5]).build().expect("valid configuration");
//! let engine = CaptureEngine::new(&config);
//! let timer = TimerState {
//!     count_resolution: 65_536,
//!     prescale_shift: 3,
//!     input_clock_hz: 16_000_000,
//!     running: true,
//! };
//!
//! critical_section::with(|cs| {
//!     // Pulse straddling a counter wrap: 7536 ticks = 3768 us, implausible
//!     engine.on_edge(cs, 0, Edge::Rising, 60_000, &timer);
//!     engine.on_edge(cs, 0, Edge::Falling, 2_000, &timer);
//! });
//! assert!(engine.reading(0).stale);
//! assert_eq!(engine.stats().rejected_width, 1);
//! ```

#![no_std]
#![deny(
    unsafe_op_in_unsafe_fn,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic_in_result_fn,
    clippy::panic,
    missing_docs,
    missing_debug_implementations
)]
#![warn(clippy::pedantic)]
#![cfg_attr(docsrs, feature(doc_cfg))]

#[cfg(any(feature = "std", test))]
extern crate std;

pub mod channel;
pub mod config;
pub mod decoder;
pub mod engine;
pub mod error;
pub mod prelude;
pub mod snapshot;
pub mod stats;
pub mod validator;

pub use channel::{Edge, EdgeCaptureChannel, EdgeOutcome, ExpectedEdge};
pub use config::{
    CENTER_US, DEFAULT_TIMEOUT_WRAPS, MAX_CHANNELS, NO_SIGNAL_US, PulseWindow, ReceiverConfig,
    ReceiverConfigBuilder,
};
pub use decoder::ReceiverDecoder;
pub use engine::CaptureEngine;
pub use error::{CaptureError, CaptureResult};
pub use snapshot::{ChannelReading, ChannelSnapshot};
pub use stats::{CaptureCounters, CaptureStats};
pub use validator::PulseValidator;
