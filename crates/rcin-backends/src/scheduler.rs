//! Channel scheduling policies.
//!
//! Three policies share the channel engine:
//!
//! | Policy        | Armed channels | Decoder               |
//! |---------------|----------------|-----------------------|
//! | Always-armed  | all            | `PinChangeDecoder`    |
//! | Time-division | one at a time  | `TimeDivisionDecoder` |
//! | Per-pin       | all, hardware latched | `InputCaptureDecoder` |
//!
//! Only time-division needs explicit state, kept in [`RoundRobin`].

/// Round-robin cursor over `count` channels.
///
/// # Example
///
/// ```rust
/// use rcin_backends::RoundRobin;
///
/// let cursor = RoundRobin::new(3);
/// let order: Vec<usize> = core::iter::successors(Some(cursor), |c| Some(c.advanced()))
///     .take(4)
///     .map(|c| c.active())
///     .collect();
/// assert_eq!(order, [0, 1, 2, 0]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundRobin {
    active: usize,
    count: usize,
}

impl RoundRobin {
    /// Cursor on channel 0 of `count` (at least one).
    #[must_use]
    pub const fn new(count: usize) -> Self {
        Self {
            active: 0,
            count: if count == 0 { 1 } else { count },
        }
    }

    /// Channel currently holding the shared resource.
    #[must_use]
    pub const fn active(&self) -> usize {
        self.active
    }

    /// Number of channels in the rotation.
    #[must_use]
    pub const fn count(&self) -> usize {
        self.count
    }

    /// Cursor moved to the next channel, wrapping to 0.
    #[must_use]
    pub const fn advanced(self) -> Self {
        let next = self.active + 1;
        Self {
            active: if next >= self.count { 0 } else { next },
            count: self.count,
        }
    }
}
