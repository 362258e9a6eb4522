//! The 20-byte XInput input report and its two button bitmasks.

use core::ops::{BitOr, BitOrAssign};

/// Size of the input report on the wire, in bytes.
pub const REPORT_SIZE: usize = 20;

/// First button byte: d-pad, start/back and thumb clicks.
///
/// None of these are wired on the nudge gamepad, so this mask is always
/// transmitted as zero. The constants exist so the layout is explicit.
///
/// # Example
///
/// ```
/// use xinput_proto::ButtonsLow;
///
/// let buttons = ButtonsLow::START | ButtonsLow::BACK;
/// assert!(buttons.contains(ButtonsLow::START));
/// assert!(!buttons.contains(ButtonsLow::DPAD_UP));
/// ```
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonsLow(pub u8);

impl ButtonsLow {
    pub const DPAD_UP: Self = Self(1 << 0);
    pub const DPAD_DOWN: Self = Self(1 << 1);
    pub const DPAD_LEFT: Self = Self(1 << 2);
    pub const DPAD_RIGHT: Self = Self(1 << 3);
    pub const START: Self = Self(1 << 4);
    pub const BACK: Self = Self(1 << 5);
    pub const LEFT_THUMB: Self = Self(1 << 6);
    pub const RIGHT_THUMB: Self = Self(1 << 7);

    /// No buttons pressed.
    pub const NONE: Self = Self(0);

    /// Check if the given button(s) are pressed.
    #[inline]
    #[must_use]
    pub const fn contains(self, button: Self) -> bool {
        (self.0 & button.0) == button.0
    }

    /// Set or clear button(s).
    #[inline]
    pub fn set(&mut self, button: Self, pressed: bool) {
        if pressed {
            self.0 |= button.0;
        } else {
            self.0 &= !button.0;
        }
    }

    /// Get the raw byte.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u8 {
        self.0
    }
}

/// Second button byte: shoulders and face buttons.
///
/// Bits 2 and 3 are unused and always zero.
///
/// # Example
///
/// ```
/// use xinput_proto::ButtonsHigh;
///
/// let buttons = ButtonsHigh::A | ButtonsHigh::LEFT_SHOULDER;
/// assert_eq!(buttons.raw(), 0b0001_0001);
/// ```
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonsHigh(pub u8);

impl ButtonsHigh {
    pub const LEFT_SHOULDER: Self = Self(1 << 0);
    pub const RIGHT_SHOULDER: Self = Self(1 << 1);
    pub const A: Self = Self(1 << 4);
    pub const B: Self = Self(1 << 5);
    pub const X: Self = Self(1 << 6);
    pub const Y: Self = Self(1 << 7);

    /// No buttons pressed.
    pub const NONE: Self = Self(0);

    /// Check if the given button(s) are pressed.
    #[inline]
    #[must_use]
    pub const fn contains(self, button: Self) -> bool {
        (self.0 & button.0) == button.0
    }

    /// Set or clear button(s).
    #[inline]
    pub fn set(&mut self, button: Self, pressed: bool) {
        if pressed {
            self.0 |= button.0;
        } else {
            self.0 &= !button.0;
        }
    }

    /// Get the raw byte.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u8 {
        self.0
    }
}

impl BitOr for ButtonsLow {
    type Output = Self;

    #[inline]
    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for ButtonsLow {
    #[inline]
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitOr for ButtonsHigh {
    type Output = Self;

    #[inline]
    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for ButtonsHigh {
    #[inline]
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Current controller state in XInput report layout.
///
/// ```text
/// offset  size  field
/// 0       1     report id (0)
/// 1       1     report size (20)
/// 2       1     buttons low
/// 3       1     buttons high
/// 4       1     left trigger
/// 5       1     right trigger
/// 6       2     left stick X  (i16 LE)
/// 8       2     left stick Y  (i16 LE)
/// 10      2     right stick X (i16 LE)
/// 12      2     right stick Y (i16 LE)
/// 14      6     reserved (zero)
/// ```
///
/// The id, size and reserved bytes are not stored; [`Report::to_bytes`]
/// emits them as constants so they can never drift.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Report {
    pub buttons_low: ButtonsLow,
    pub buttons_high: ButtonsHigh,
    pub left_trigger: u8,
    pub right_trigger: u8,
    pub left_x: i16,
    pub left_y: i16,
    pub right_x: i16,
    pub right_y: i16,
}

impl Report {
    /// Report id byte.
    pub const ID: u8 = 0x00;

    /// Size byte, always [`REPORT_SIZE`].
    pub const SIZE: u8 = REPORT_SIZE as u8;

    /// Zeroed report: no buttons, sticks centered, triggers released.
    #[must_use]
    pub const fn neutral() -> Self {
        Self {
            buttons_low: ButtonsLow::NONE,
            buttons_high: ButtonsHigh::NONE,
            left_trigger: 0,
            right_trigger: 0,
            left_x: 0,
            left_y: 0,
            right_x: 0,
            right_y: 0,
        }
    }

    /// Serialize into the wire layout.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; REPORT_SIZE] {
        let mut buf = [0u8; REPORT_SIZE];
        buf[0] = Self::ID;
        buf[1] = Self::SIZE;
        buf[2] = self.buttons_low.raw();
        buf[3] = self.buttons_high.raw();
        buf[4] = self.left_trigger;
        buf[5] = self.right_trigger;
        buf[6..8].copy_from_slice(&self.left_x.to_le_bytes());
        buf[8..10].copy_from_slice(&self.left_y.to_le_bytes());
        buf[10..12].copy_from_slice(&self.right_x.to_le_bytes());
        buf[12..14].copy_from_slice(&self.right_y.to_le_bytes());
        buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neutral_report_bytes() {
        let bytes = Report::neutral().to_bytes();
        assert_eq!(bytes[0], 0x00);
        assert_eq!(bytes[1], 20);
        assert!(bytes[2..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_report_layout() {
        let report = Report {
            buttons_low: ButtonsLow::START,
            buttons_high: ButtonsHigh::A | ButtonsHigh::RIGHT_SHOULDER,
            left_trigger: 0x11,
            right_trigger: 0x22,
            left_x: i16::MIN,
            left_y: i16::MAX,
            right_x: 0x0102,
            right_y: -2,
        };
        let bytes = report.to_bytes();

        assert_eq!(bytes[1], 20);
        assert_eq!(bytes[2], 0b0001_0000);
        assert_eq!(bytes[3], 0b0001_0010);
        assert_eq!(bytes[4], 0x11);
        assert_eq!(bytes[5], 0x22);
        assert_eq!(&bytes[6..8], &[0x00, 0x80]);
        assert_eq!(&bytes[8..10], &[0xFF, 0x7F]);
        assert_eq!(&bytes[10..12], &[0x02, 0x01]);
        assert_eq!(&bytes[12..14], &[0xFE, 0xFF]);
        assert_eq!(&bytes[14..], &[0u8; 6]);
    }

    #[test]
    fn test_buttons_high_unused_bits() {
        let all = ButtonsHigh::LEFT_SHOULDER
            | ButtonsHigh::RIGHT_SHOULDER
            | ButtonsHigh::A
            | ButtonsHigh::B
            | ButtonsHigh::X
            | ButtonsHigh::Y;
        assert_eq!(all.raw() & 0b0000_1100, 0);
    }

    #[test]
    fn test_buttons_set_clear() {
        let mut buttons = ButtonsHigh::NONE;
        buttons.set(ButtonsHigh::B, true);
        assert!(buttons.contains(ButtonsHigh::B));
        buttons.set(ButtonsHigh::B, false);
        assert_eq!(buttons, ButtonsHigh::NONE);

        let mut low = ButtonsLow::NONE;
        low |= ButtonsLow::DPAD_LEFT;
        assert!(low.contains(ButtonsLow::DPAD_LEFT));
        low.set(ButtonsLow::DPAD_LEFT, false);
        assert_eq!(low.raw(), 0);
    }
}
