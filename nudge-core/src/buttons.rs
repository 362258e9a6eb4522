//! Physical button sampling into the report's button bitmasks.

use embedded_hal::digital::InputPin;
use xinput_proto::{ButtonsHigh, ButtonsLow, Report};

/// Raw pin levels of the three cabinet buttons (`true` = high).
///
/// The inputs are active-low with pull-ups, so a released button reads high.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonLevels {
    pub launch: bool,
    pub left_flipper: bool,
    pub right_flipper: bool,
}

impl ButtonLevels {
    /// All buttons released.
    pub const RELEASED: Self = Self {
        launch: true,
        left_flipper: true,
        right_flipper: true,
    };
}

/// Clear both bitmasks and write the mapped bits for the given levels.
///
/// launch -> A, left flipper -> left shoulder, right flipper -> right shoulder.
pub fn sample_levels(report: &mut Report, levels: ButtonLevels) {
    let mut high = ButtonsHigh::NONE;
    high.set(ButtonsHigh::A, !levels.launch);
    high.set(ButtonsHigh::LEFT_SHOULDER, !levels.left_flipper);
    high.set(ButtonsHigh::RIGHT_SHOULDER, !levels.right_flipper);

    report.buttons_low = ButtonsLow::NONE;
    report.buttons_high = high;
}

/// The three cabinet buttons.
pub struct PhysicalButtons<L, LF, RF> {
    launch: L,
    left_flipper: LF,
    right_flipper: RF,
}

impl<L: InputPin, LF: InputPin, RF: InputPin> PhysicalButtons<L, LF, RF> {
    pub fn new(launch: L, left_flipper: LF, right_flipper: RF) -> Self {
        Self {
            launch,
            left_flipper,
            right_flipper,
        }
    }

    /// Read the pins. A pin that fails to read counts as released.
    pub fn levels(&mut self) -> ButtonLevels {
        ButtonLevels {
            launch: self.launch.is_high().unwrap_or(true),
            left_flipper: self.left_flipper.is_high().unwrap_or(true),
            right_flipper: self.right_flipper.is_high().unwrap_or(true),
        }
    }

    /// Sample all buttons into `report`.
    pub fn sample(&mut self, report: &mut Report) {
        let levels = self.levels();
        sample_levels(report, levels);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use embedded_hal::digital::{ErrorType, InputPin};

    struct MockPin {
        high: bool,
    }

    impl ErrorType for MockPin {
        type Error = Infallible;
    }

    impl InputPin for MockPin {
        fn is_high(&mut self) -> Result<bool, Self::Error> {
            Ok(self.high)
        }

        fn is_low(&mut self) -> Result<bool, Self::Error> {
            Ok(!self.high)
        }
    }

    #[derive(Debug)]
    struct PinFault;

    impl embedded_hal::digital::Error for PinFault {
        fn kind(&self) -> embedded_hal::digital::ErrorKind {
            embedded_hal::digital::ErrorKind::Other
        }
    }

    struct FaultyPin;

    impl ErrorType for FaultyPin {
        type Error = PinFault;
    }

    impl InputPin for FaultyPin {
        fn is_high(&mut self) -> Result<bool, Self::Error> {
            Err(PinFault)
        }

        fn is_low(&mut self) -> Result<bool, Self::Error> {
            Err(PinFault)
        }
    }

    #[test]
    fn test_all_level_combinations() {
        for bits in 0u8..8 {
            let levels = ButtonLevels {
                launch: bits & 1 != 0,
                left_flipper: bits & 2 != 0,
                right_flipper: bits & 4 != 0,
            };
            let mut report = Report::neutral();
            report.buttons_low = ButtonsLow(0xFF);
            report.buttons_high = ButtonsHigh(0xFF);

            sample_levels(&mut report, levels);

            let mut expected = 0u8;
            if !levels.launch {
                expected |= ButtonsHigh::A.raw();
            }
            if !levels.left_flipper {
                expected |= ButtonsHigh::LEFT_SHOULDER.raw();
            }
            if !levels.right_flipper {
                expected |= ButtonsHigh::RIGHT_SHOULDER.raw();
            }
            assert_eq!(report.buttons_high.raw(), expected, "levels {:?}", levels);
            assert_eq!(report.buttons_low.raw(), 0);
        }
    }

    #[test]
    fn test_sample_from_pins() {
        let mut buttons = PhysicalButtons::new(
            MockPin { high: false },
            MockPin { high: true },
            MockPin { high: false },
        );
        let mut report = Report::neutral();
        buttons.sample(&mut report);
        assert_eq!(
            report.buttons_high,
            ButtonsHigh::A | ButtonsHigh::RIGHT_SHOULDER
        );
    }

    #[test]
    fn test_faulty_pin_reads_released() {
        let mut buttons =
            PhysicalButtons::new(FaultyPin, MockPin { high: false }, MockPin { high: true });
        assert_eq!(
            buttons.levels(),
            ButtonLevels {
                launch: true,
                left_flipper: false,
                right_flipper: true,
            }
        );
    }

    #[test]
    fn test_released_levels_clear_report() {
        let mut report = Report::neutral();
        report.buttons_high = ButtonsHigh::B;
        sample_levels(&mut report, ButtonLevels::RELEASED);
        assert_eq!(report.buttons_high, ButtonsHigh::NONE);
    }
}
