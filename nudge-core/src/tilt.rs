//! Tilt events: threshold policy and the cross-core mailbox.
//!
//! The detector runs on its own core and the report pipeline on another.
//! They share nothing except a [`TiltMailbox`], a single slot per direction
//! with "newest wins" semantics: the producer stores, the consumer swaps the
//! slot back to `false`. An event that is overwritten before the consumer
//! looks at it is lost, never duplicated.

use portable_atomic::{AtomicBool, Ordering};

/// Detector thresholds and settle intervals.
///
/// Customize this at compile-time by creating your own const.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TiltConfig {
    /// |X| must exceed this to raise a left or right nudge.
    pub lateral_threshold: i16,
    /// |Y| must exceed this to raise an up nudge.
    pub up_threshold: i16,
    /// Blocking delay after a left or right nudge.
    pub lateral_settle_ms: u32,
    /// Blocking delay after an up nudge.
    pub up_settle_ms: u32,
}

/// Thresholds tuned for the ICM-20948 at +-16 g.
pub const DEFAULT_TILT_CONFIG: TiltConfig = TiltConfig {
    lateral_threshold: 8000,
    up_threshold: 2500,
    lateral_settle_ms: 100,
    up_settle_ms: 250,
};

/// One set of directional nudges.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TiltEvents {
    pub left: bool,
    pub right: bool,
    pub up: bool,
}

impl TiltEvents {
    /// No nudges.
    pub const NONE: Self = Self {
        left: false,
        right: false,
        up: false,
    };

    /// Apply the threshold policy to one `[x, y, z]` sample.
    ///
    /// Axes are evaluated independently. A value exactly on a threshold
    /// does not raise an event.
    #[must_use]
    pub fn classify(sample: [i16; 3], config: &TiltConfig) -> Self {
        let [x, y, _] = sample;
        let lateral = i32::from(config.lateral_threshold);
        let up = i32::from(config.up_threshold);
        Self {
            left: i32::from(x) < -lateral,
            right: i32::from(x) > lateral,
            up: i32::from(y).abs() > up,
        }
    }

    /// Total settle interval owed for the raised events.
    #[must_use]
    pub fn settle_ms(&self, config: &TiltConfig) -> u32 {
        let mut total = 0;
        if self.left {
            total += config.lateral_settle_ms;
        }
        if self.right {
            total += config.lateral_settle_ms;
        }
        if self.up {
            total += config.up_settle_ms;
        }
        total
    }

    #[inline]
    #[must_use]
    pub const fn any(&self) -> bool {
        self.left || self.right || self.up
    }
}

/// Decode a 6-byte accelerometer burst into `[x, y, z]`.
///
/// Each axis is a big-endian `i16`.
#[inline]
#[must_use]
pub fn decode_accel(raw: [u8; 6]) -> [i16; 3] {
    [
        i16::from_be_bytes([raw[0], raw[1]]),
        i16::from_be_bytes([raw[2], raw[3]]),
        i16::from_be_bytes([raw[4], raw[5]]),
    ]
}

/// Single-slot, lock-free mailbox per tilt direction.
///
/// Intended for one producer (the detector) and one consumer (the stick
/// emulator). Safe to place in a `static`.
#[derive(Debug)]
pub struct TiltMailbox {
    left: AtomicBool,
    right: AtomicBool,
    up: AtomicBool,
}

impl TiltMailbox {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            left: AtomicBool::new(false),
            right: AtomicBool::new(false),
            up: AtomicBool::new(false),
        }
    }

    /// Overwrite every slot with the given events.
    ///
    /// Slots not raised in `events` are cleared, dropping anything the
    /// consumer has not taken yet.
    pub fn post(&self, events: TiltEvents) {
        self.left.store(events.left, Ordering::Release);
        self.right.store(events.right, Ordering::Release);
        self.up.store(events.up, Ordering::Release);
    }

    /// Take all pending events, leaving every slot empty.
    pub fn take(&self) -> TiltEvents {
        TiltEvents {
            left: self.left.swap(false, Ordering::AcqRel),
            right: self.right.swap(false, Ordering::AcqRel),
            up: self.up.swap(false, Ordering::AcqRel),
        }
    }

    /// Look at pending events without consuming them.
    #[must_use]
    pub fn peek(&self) -> TiltEvents {
        TiltEvents {
            left: self.left.load(Ordering::Acquire),
            right: self.right.load(Ordering::Acquire),
            up: self.up.load(Ordering::Acquire),
        }
    }
}

impl Default for TiltMailbox {
    fn default() -> Self {
        Self::new()
    }
}

/// Cooperative stop request for long-running loops.
///
/// Production firmware never raises it; tests use it to end the detector.
#[derive(Debug)]
pub struct StopSignal {
    stopped: AtomicBool,
}

impl StopSignal {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            stopped: AtomicBool::new(false),
        }
    }

    /// Ask the loop to exit at its next iteration boundary.
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::Release);
    }

    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }
}

impl Default for StopSignal {
    fn default() -> Self {
        Self::new()
    }
}
