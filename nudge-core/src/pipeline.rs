//! ReportPipeline: one pass of the report loop.

use crate::buttons::{sample_levels, ButtonLevels, PhysicalButtons};
use crate::class::ClassDriver;
use crate::scheduler::{SendOutcome, TransmissionScheduler};
use crate::stick::StickEmulator;
use crate::tilt::TiltMailbox;
use crate::transport::Transport;
use embedded_hal::digital::InputPin;
use xinput_proto::Report;

/// Source of the button bitmasks.
///
/// This trait abstracts where button state comes from, so the pipeline can
/// be driven from real pins on the device and from fixed levels in tests.
pub trait ButtonSampler {
    /// Overwrite both button bitmasks of `report`.
    fn sample(&mut self, report: &mut Report);
}

impl<L: InputPin, LF: InputPin, RF: InputPin> ButtonSampler for PhysicalButtons<L, LF, RF> {
    fn sample(&mut self, report: &mut Report) {
        PhysicalButtons::sample(self, report);
    }
}

impl ButtonSampler for ButtonLevels {
    fn sample(&mut self, report: &mut Report) {
        sample_levels(report, *self);
    }
}

/// Owns the report and drives it from buttons and tilt events to the host.
///
/// Every [`tick`](Self::tick) samples the buttons, advances the stick
/// emulator and gives the scheduler a chance to submit the report.
pub struct ReportPipeline<'a, B> {
    buttons: B,
    stick: StickEmulator,
    scheduler: TransmissionScheduler,
    report: Report,
    mailbox: &'a TiltMailbox,
    driver: &'a ClassDriver,
}

impl<'a, B: ButtonSampler> ReportPipeline<'a, B> {
    pub fn new(
        buttons: B,
        stick: StickEmulator,
        scheduler: TransmissionScheduler,
        mailbox: &'a TiltMailbox,
        driver: &'a ClassDriver,
    ) -> Self {
        Self {
            buttons,
            stick,
            scheduler,
            report: Report::neutral(),
            mailbox,
            driver,
        }
    }

    /// Run one iteration at monotonic time `now_ms`.
    pub fn tick<T: Transport>(&mut self, now_ms: u64, transport: &mut T) -> SendOutcome {
        self.buttons.sample(&mut self.report);
        self.stick.update(&mut self.report, self.mailbox);
        self.scheduler
            .poll(now_ms, transport, self.driver.endpoint_in(), &self.report)
    }

    /// Current report contents.
    pub fn report(&self) -> &Report {
        &self.report
    }

    /// Get a mutable reference to the button sampler.
    pub fn buttons_mut(&mut self) -> &mut B {
        &mut self.buttons
    }

    pub fn stick(&self) -> &StickEmulator {
        &self.stick
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::scheduler::mock::MockTransport;
    use crate::stick::StickConfig;
    use crate::tilt::TiltEvents;
    use crate::transport::EndpointRegistry;
    use xinput_proto::{ButtonsHigh, EndpointDescriptor, XINPUT_INTERFACE};

    struct AcceptAll;

    impl EndpointRegistry for AcceptAll {
        fn open_endpoint(&mut self, _endpoint: &EndpointDescriptor) -> bool {
            true
        }
    }

    fn open_driver() -> ClassDriver {
        let mut driver = ClassDriver::new();
        driver.init();
        driver
            .open(&mut AcceptAll, &XINPUT_INTERFACE, XINPUT_INTERFACE.len() as u16)
            .unwrap();
        driver
    }

    fn pipeline<'a>(mailbox: &'a TiltMailbox, driver: &'a ClassDriver) -> ReportPipeline<'a, ButtonLevels> {
        ReportPipeline::new(
            ButtonLevels::RELEASED,
            StickEmulator::new(StickConfig { hold_ticks: 3 }),
            TransmissionScheduler::default(),
            mailbox,
            driver,
        )
    }

    #[test]
    fn test_tick_sends_buttons_and_stick() {
        let mailbox = TiltMailbox::new();
        let driver = open_driver();
        let mut pipe = pipeline(&mailbox, &driver);
        let mut usb = MockTransport::ready();

        pipe.buttons_mut().launch = false;
        mailbox.post(TiltEvents {
            right: true,
            ..TiltEvents::NONE
        });

        assert_eq!(pipe.tick(0, &mut usb), SendOutcome::Sent);
        let (_, bytes) = usb.submitted[0];
        assert_eq!(bytes[3], ButtonsHigh::A.raw());
        assert_eq!(&bytes[6..8], &i16::MAX.to_le_bytes());
    }

    #[test]
    fn test_tick_before_open_not_ready() {
        let mailbox = TiltMailbox::new();
        let driver = ClassDriver::new();
        let mut pipe = pipeline(&mailbox, &driver);
        let mut usb = MockTransport::ready();

        assert_eq!(pipe.tick(0, &mut usb), SendOutcome::NotReady);
        assert!(usb.submitted.is_empty());
    }

    #[test]
    fn test_stick_decays_between_sends() {
        let mailbox = TiltMailbox::new();
        let driver = open_driver();
        let mut pipe = pipeline(&mailbox, &driver);
        let mut usb = MockTransport::ready();

        mailbox.post(TiltEvents {
            left: true,
            ..TiltEvents::NONE
        });
        // Several loop passes inside one millisecond still count as ticks.
        for _ in 0..3 {
            pipe.tick(0, &mut usb);
            assert_eq!(pipe.report().left_x, i16::MIN);
        }
        pipe.tick(0, &mut usb);
        assert_eq!(pipe.report().left_x, 0);
        assert_eq!(usb.submitted.len(), 1);
    }
}
