//! # rcin-timer
//!
//! Free-running hardware counter service for RC receiver decoding.
//!
//! This crate provides a `#![no_std]` timer layer with:
//! - `FreeRunningCounter` trait wrapping the hardware count register
//! - `TimerService` for init/start/stop/reset and race-free reads
//! - `SimulatedCounter` for host testing without hardware
//! - Wraparound-safe interval arithmetic shared by every decoder backend
//!
//! ## Real-Time Safety
//!
//! - **No heap allocations** anywhere in the crate
//! - **No blocking operations**; `read_now_safe()` retries a bounded number of times
//! - Tick→microsecond conversion is pure and side-effect free
//!
//! ## Wraparound
//!
//! ```text
//!   0                reference          resolution
//!   |--- now ----------|-------------------|
//!   elapsed = (resolution - reference) + now
//! ```
//!
//! ## Example
//!
//! ```rust
//! use rcin_timer::prelude::*;
//!
//! // 16 MHz part with a 16-bit counter
//! let counter = SimulatedCounter::new(16_000_000, 65_536);
//! let mut timer = TimerService::new(counter);
//!
//! let setup = timer.init_free_running(Prescaler::Div8).expect("valid setup");
//! assert_eq!(setup.top, 65_535);
//!
//! timer.start();
//! timer.counter().advance(3000);
//! assert_eq!(timer.micros_safe(), 1500);
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

pub mod counter;
pub mod error;
pub mod interval;
pub mod prelude;
pub mod prescale;
pub mod service;
pub mod sim;

pub use counter::FreeRunningCounter;
pub use error::{TimerError, TimerResult};
pub use interval::{TimerState, elapsed_ticks};
pub use prescale::{Prescaler, TimerSetup, select_prescaler};
pub use service::TimerService;
pub use sim::SimulatedCounter;
