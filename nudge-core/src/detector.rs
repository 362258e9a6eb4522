//! Tilt detector loop.
//!
//! Owns the accelerometer and a blocking delay and is meant to run alone on
//! its own core. Each iteration samples once, posts the classified events to
//! the mailbox and then blocks for the settle interval of whatever it raised,
//! which debounces a single physical nudge.

use crate::imu::{reg, Icm20948, ImuError};
use crate::tilt::{StopSignal, TiltConfig, TiltEvents, TiltMailbox};
use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

/// Error type for the detector loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DetectorError<E> {
    /// The accelerometer could not be brought up.
    Init(ImuError<E>),
}

pub struct TiltDetector<I2C, D> {
    imu: Icm20948<I2C>,
    delay: D,
    config: TiltConfig,
}

impl<I2C: I2c, D: DelayNs> TiltDetector<I2C, D> {
    pub fn new(imu: Icm20948<I2C>, delay: D, config: TiltConfig) -> Self {
        Self { imu, delay, config }
    }

    /// Bring up the accelerometer and log its identity.
    ///
    /// The identity read is diagnostic only; a mismatch or a failed read
    /// does not fail initialization.
    pub fn init(&mut self) -> Result<(), DetectorError<I2C::Error>> {
        self.imu.init(&mut self.delay).map_err(DetectorError::Init)?;

        match self.imu.who_am_i() {
            Ok(reg::DEVICE_ID) => info!("WHO_AM_I: {=u8:#x}", reg::DEVICE_ID),
            Ok(id) => warn!("WHO_AM_I: {=u8:#x} (expected 0xEA)", id),
            Err(_) => warn!("WHO_AM_I read failed"),
        }
        Ok(())
    }

    /// Sample once, publish the result and settle.
    ///
    /// The events are posted before the settle delay so the consumer sees a
    /// nudge as soon as it is detected.
    pub fn step(&mut self, mailbox: &TiltMailbox) -> Result<TiltEvents, ImuError<I2C::Error>> {
        let sample = self.imu.read_accel()?;
        let events = TiltEvents::classify(sample, &self.config);
        mailbox.post(events);

        if events.any() {
            trace!("tilt {} {} {}", events.left, events.right, events.up);
            self.delay.delay_ms(events.settle_ms(&self.config));
        }
        Ok(events)
    }

    /// Initialize, then detect until `stop` is raised.
    ///
    /// A failed sample read skips that iteration and leaves the mailbox as
    /// it was.
    pub fn run(
        &mut self,
        mailbox: &TiltMailbox,
        stop: &StopSignal,
    ) -> Result<(), DetectorError<I2C::Error>> {
        self.init()?;

        while !stop.is_stopped() {
            if self.step(mailbox).is_err() {
                warn!("accelerometer read failed");
            }
        }
        Ok(())
    }

    /// Decompose into the driver and delay.
    pub fn into_parts(self) -> (Icm20948<I2C>, D) {
        (self.imu, self.delay)
    }
}
