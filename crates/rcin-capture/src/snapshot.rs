//! Torn-free channel readings shared with the consumer.
//!
//! The interrupt context publishes a [`ChannelReading`] per channel; the
//! main loop reads it back. Each slot is a `critical_section::Mutex`, so a
//! reader never observes a width from one update paired with a stale flag
//! from another, whatever the target's native word size.

use core::cell::Cell;
use core::fmt;

use critical_section::{CriticalSection, Mutex};

use crate::config::{MAX_CHANNELS, NO_SIGNAL_US};

/// Consumer-visible state of one channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelReading {
    /// Last accepted pulse width in microseconds, or the initial/no-signal
    /// value.
    pub width_us: u16,
    /// Whether no valid pulse is currently known.
    pub stale: bool,
}

impl ChannelReading {
    /// Reading of a dead or never-measured channel.
    pub const NO_SIGNAL: Self = Self::initial(NO_SIGNAL_US);

    /// Stale reading carrying `width_us`.
    #[must_use]
    pub const fn initial(width_us: u16) -> Self {
        Self {
            width_us,
            stale: true,
        }
    }

    /// Fresh reading of a just-accepted pulse.
    #[must_use]
    pub const fn live(width_us: u16) -> Self {
        Self {
            width_us,
            stale: false,
        }
    }
}

impl Default for ChannelReading {
    fn default() -> Self {
        Self::NO_SIGNAL
    }
}

/// Per-channel published readings.
///
/// # Real-Time Safety
///
/// - `publish_in()` / `read_in()`: one slot access, for callers already
///   inside a critical section (interrupt handlers)
/// - `publish()` / `read()`: open their own short critical section
///
/// Neither side blocks or fails. Out-of-range indices read as the
/// configured initial value and are ignored on publish.
///
/// # Example
///
/// ```rust
/// use rcin_capture::{ChannelReading, ChannelSnapshot};
///
/// let snapshot = ChannelSnapshot::new(4, 1_500);
/// assert_eq!(snapshot.read(2), ChannelReading::initial(1_500));
///
/// snapshot.publish(2, ChannelReading::live(1_720));
/// assert_eq!(snapshot.width_us(2), 1_720);
/// assert!(!snapshot.is_stale(2));
///
/// // Unconfigured channel
/// assert_eq!(snapshot.width_us(6), 1_500);
/// ```
pub struct ChannelSnapshot {
    slots: [Mutex<Cell<ChannelReading>>; MAX_CHANNELS],
    channel_count: usize,
    initial: ChannelReading,
}

impl ChannelSnapshot {
    /// Create a snapshot of `channel_count` channels, all reading
    /// `initial_value_us` and stale.
    #[must_use]
    pub fn new(channel_count: usize, initial_value_us: u16) -> Self {
        let initial = ChannelReading::initial(initial_value_us);
        Self {
            slots: core::array::from_fn(|_| Mutex::new(Cell::new(initial))),
            channel_count: channel_count.min(MAX_CHANNELS),
            initial,
        }
    }

    fn slot(&self, index: usize) -> Option<&Mutex<Cell<ChannelReading>>> {
        if index < self.channel_count {
            self.slots.get(index)
        } else {
            None
        }
    }

    /// Publish a reading. Returns `false` for an unconfigured index.
    pub fn publish(&self, index: usize, reading: ChannelReading) -> bool {
        critical_section::with(|cs| self.publish_in(cs, index, reading))
    }

    /// Publish a reading inside an already-held critical section.
    pub fn publish_in(
        &self,
        cs: CriticalSection<'_>,
        index: usize,
        reading: ChannelReading,
    ) -> bool {
        match self.slot(index) {
            Some(slot) => {
                slot.borrow(cs).set(reading);
                true
            }
            None => false,
        }
    }

    /// Read one channel.
    #[must_use]
    pub fn read(&self, index: usize) -> ChannelReading {
        critical_section::with(|cs| self.read_in(cs, index))
    }

    /// Read one channel inside an already-held critical section.
    #[must_use]
    pub fn read_in(&self, cs: CriticalSection<'_>, index: usize) -> ChannelReading {
        self.slot(index)
            .map_or(self.initial, |slot| slot.borrow(cs).get())
    }

    /// Read every channel in one critical section, so the returned readings
    /// belong to the same instant. Unconfigured entries hold the initial
    /// value.
    #[must_use]
    pub fn read_all(&self) -> [ChannelReading; MAX_CHANNELS] {
        critical_section::with(|cs| core::array::from_fn(|index| self.read_in(cs, index)))
    }

    /// Pulse width of one channel in microseconds.
    #[must_use]
    pub fn width_us(&self, index: usize) -> u16 {
        self.read(index).width_us
    }

    /// Whether one channel is stale.
    #[must_use]
    pub fn is_stale(&self, index: usize) -> bool {
        self.read(index).stale
    }

    /// Restore every channel to the initial reading.
    pub fn reset_in(&self, cs: CriticalSection<'_>) {
        for slot in &self.slots {
            slot.borrow(cs).set(self.initial);
        }
    }

    /// Number of configured channels.
    #[must_use]
    pub fn channel_count(&self) -> usize {
        self.channel_count
    }

    /// Reading reported before the first measurement.
    #[must_use]
    pub fn initial(&self) -> ChannelReading {
        self.initial
    }
}

impl fmt::Debug for ChannelSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChannelSnapshot")
            .field("channel_count", &self.channel_count)
            .field("initial", &self.initial)
            .finish_non_exhaustive()
    }
}
