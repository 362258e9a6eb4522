//! Left-stick emulation from discrete tilt events.
//!
//! Each nudge snaps an axis to its extreme and holds it there for a fixed
//! number of ticks before it falls back to center. The right stick and both
//! triggers are not driven and stay neutral.

use crate::tilt::{TiltEvents, TiltMailbox};
use xinput_proto::Report;

/// Stick emulation settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StickConfig {
    /// Ticks an axis stays deflected after a nudge.
    pub hold_ticks: u32,
}

/// Hold length used by the cabinet firmware.
pub const DEFAULT_STICK_CONFIG: StickConfig = StickConfig { hold_ticks: 50_000 };

/// Per-axis hold timers for the left stick.
#[derive(Debug, Clone)]
pub struct StickEmulator {
    config: StickConfig,
    hold_x: u32,
    hold_y: u32,
}

impl StickEmulator {
    #[must_use]
    pub const fn new(config: StickConfig) -> Self {
        Self {
            config,
            hold_x: 0,
            hold_y: 0,
        }
    }

    /// Take pending events from `mailbox` and advance one tick.
    pub fn update(&mut self, report: &mut Report, mailbox: &TiltMailbox) {
        let events = mailbox.take();
        self.apply(report, events);
    }

    /// Advance one tick with the given events.
    ///
    /// Left is applied before right, so if both are set in the same tick
    /// the stick ends up at the right extreme.
    pub fn apply(&mut self, report: &mut Report, events: TiltEvents) {
        if self.hold_x == 0 {
            report.left_x = 0;
        }
        if self.hold_y == 0 {
            report.left_y = 0;
        }

        if events.left {
            report.left_x = i16::MIN;
            self.hold_x = self.config.hold_ticks;
        }
        if events.right {
            report.left_x = i16::MAX;
            self.hold_x = self.config.hold_ticks;
        }
        if events.up {
            report.left_y = i16::MAX;
            self.hold_y = self.config.hold_ticks;
        }

        self.hold_x = self.hold_x.saturating_sub(1);
        self.hold_y = self.hold_y.saturating_sub(1);
    }

    /// Remaining hold ticks as `(x, y)`.
    #[must_use]
    pub const fn hold_remaining(&self) -> (u32, u32) {
        (self.hold_x, self.hold_y)
    }
}

impl Default for StickEmulator {
    fn default() -> Self {
        Self::new(DEFAULT_STICK_CONFIG)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOLD: u32 = 5;

    fn emulator() -> StickEmulator {
        StickEmulator::new(StickConfig { hold_ticks: HOLD })
    }

    const LEFT: TiltEvents = TiltEvents {
        left: true,
        right: false,
        up: false,
    };

    #[test]
    fn test_hold_length_then_neutral() {
        let mut stick = emulator();
        let mut report = Report::neutral();

        stick.apply(&mut report, LEFT);
        assert_eq!(report.left_x, i16::MIN);

        // The event tick counts as the first held tick.
        for _ in 1..HOLD {
            stick.apply(&mut report, TiltEvents::NONE);
            assert_eq!(report.left_x, i16::MIN);
        }
        assert_eq!(stick.hold_remaining(), (0, 0));

        stick.apply(&mut report, TiltEvents::NONE);
        assert_eq!(report.left_x, 0);
    }

    #[test]
    fn test_right_wins_tie() {
        for _ in 0..3 {
            let mut stick = emulator();
            let mut report = Report::neutral();
            stick.apply(
                &mut report,
                TiltEvents {
                    left: true,
                    right: true,
                    up: false,
                },
            );
            assert_eq!(report.left_x, i16::MAX);
        }
    }

    #[test]
    fn test_new_event_resets_timer() {
        let mut stick = emulator();
        let mut report = Report::neutral();

        stick.apply(&mut report, LEFT);
        stick.apply(&mut report, TiltEvents::NONE);
        stick.apply(
            &mut report,
            TiltEvents {
                right: true,
                ..TiltEvents::NONE
            },
        );
        assert_eq!(report.left_x, i16::MAX);
        assert_eq!(stick.hold_remaining().0, HOLD - 1);
    }

    #[test]
    fn test_axes_independent() {
        let mut stick = emulator();
        let mut report = Report::neutral();

        stick.apply(
            &mut report,
            TiltEvents {
                up: true,
                ..TiltEvents::NONE
            },
        );
        assert_eq!(report.left_y, i16::MAX);
        assert_eq!(report.left_x, 0);
        assert_eq!(stick.hold_remaining(), (0, HOLD - 1));
    }

    #[test]
    fn test_update_consumes_mailbox() {
        let mailbox = TiltMailbox::new();
        mailbox.post(LEFT);

        let mut stick = emulator();
        let mut report = Report::neutral();
        stick.update(&mut report, &mailbox);

        assert_eq!(report.left_x, i16::MIN);
        assert_eq!(mailbox.peek(), TiltEvents::NONE);
    }

    #[test]
    fn test_right_stick_and_triggers_untouched() {
        let mut stick = emulator();
        let mut report = Report::neutral();
        stick.apply(
            &mut report,
            TiltEvents {
                left: true,
                right: false,
                up: true,
            },
        );
        assert_eq!(report.right_x, 0);
        assert_eq!(report.right_y, 0);
        assert_eq!(report.left_trigger, 0);
        assert_eq!(report.right_trigger, 0);
    }
}
