//! Prelude for rcin-timer.
//!
//! This module re-exports the most commonly used types for convenient importing.
//!
//! # Example
//!
//! ```rust
//! use rcin_timer::prelude::*;
//!
//! let mut timer = TimerService::new(SimulatedCounter::avr_16bit());
//! timer.init_free_running(Prescaler::Div8).expect("valid setup");
//! timer.start();
//! ```

pub use crate::counter::FreeRunningCounter;
pub use crate::error::{TimerError, TimerResult};
pub use crate::interval::{TimerState, elapsed_ticks};
pub use crate::prescale::{Prescaler, TimerSetup, select_prescaler};
pub use crate::service::{STABLE_READ_ATTEMPTS, TimerService};
pub use crate::sim::SimulatedCounter;
