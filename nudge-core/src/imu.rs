//! Minimal ICM-20948 accelerometer driver over a blocking I2C bus.
//!
//! Only what tilt detection needs: reset, full-scale range selection,
//! the identity register and burst reads of the three acceleration axes.
//! Registers live in four banks; everything except `ACCEL_CONFIG` is in
//! bank 0, which is restored after configuration.

use crate::tilt::decode_accel;
use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

/// Register addresses and bit patterns.
pub mod reg {
    /// Identity register (bank 0).
    pub const WHO_AM_I: u8 = 0x00;
    /// Power management 1 (bank 0).
    pub const PWR_MGMT_1: u8 = 0x06;
    /// Power management 2 (bank 0). Reads zero once the reset has settled.
    pub const PWR_MGMT_2: u8 = 0x07;
    /// First of six acceleration output bytes (bank 0).
    pub const ACCEL_XOUT_H: u8 = 0x2D;
    /// Accelerometer configuration (bank 2).
    pub const ACCEL_CONFIG: u8 = 0x14;
    /// Bank select, present in every bank.
    pub const REG_BANK_SEL: u8 = 0x7F;

    /// `PWR_MGMT_1`: device reset, sleep, auto clock source.
    pub const PWR_RESET: u8 = 0b1100_0001;
    /// `PWR_MGMT_1`: awake, auto clock source.
    pub const PWR_WAKE: u8 = 0b0000_0001;

    pub const BANK_0: u8 = 0b0000_0000;
    pub const BANK_2: u8 = 0b0010_0000;

    /// Value of `WHO_AM_I` on a genuine part.
    pub const DEVICE_ID: u8 = 0xEA;
}

/// Accelerometer full-scale range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AccelFullScale {
    G2,
    G4,
    G8,
    G16,
}

impl AccelFullScale {
    /// `ACCEL_CONFIG` value: low-pass filter config 1, filter enabled.
    #[must_use]
    pub const fn config_bits(self) -> u8 {
        let fs_sel = match self {
            Self::G2 => 0b00,
            Self::G4 => 0b01,
            Self::G8 => 0b10,
            Self::G16 => 0b11,
        };
        (0b001 << 3) | (fs_sel << 1) | 0b1
    }
}

/// Driver settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ImuConfig {
    /// 7-bit bus address (0x68 with AD0 low, 0x69 with AD0 high).
    pub address: u8,
    pub full_scale: AccelFullScale,
    /// Wait between asserting and clearing reset.
    pub reset_settle_ms: u32,
    /// Reads of the status register before giving up on the reset.
    pub reset_poll_attempts: u32,
    /// Wait between status register reads.
    pub reset_poll_interval_ms: u32,
}

pub const DEFAULT_IMU_CONFIG: ImuConfig = ImuConfig {
    address: 0x69,
    full_scale: AccelFullScale::G16,
    reset_settle_ms: 100,
    reset_poll_attempts: 100,
    reset_poll_interval_ms: 1,
};

/// Errors raised by the IMU driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ImuError<E> {
    /// The bus transaction failed.
    Bus(E),
    /// The status register never cleared after reset.
    ResetTimeout,
}

/// ICM-20948 on an I2C bus.
pub struct Icm20948<I2C> {
    i2c: I2C,
    config: ImuConfig,
}

impl<I2C: I2c> Icm20948<I2C> {
    pub fn new(i2c: I2C, config: ImuConfig) -> Self {
        Self { i2c, config }
    }

    /// Reset the part and configure the accelerometer range.
    ///
    /// Bus errors while waiting for the reset to settle are treated as
    /// "not ready yet"; only the poll budget ends the wait.
    pub fn init<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), ImuError<I2C::Error>> {
        self.write_reg(reg::PWR_MGMT_1, reg::PWR_RESET)?;
        delay.delay_ms(self.config.reset_settle_ms);
        self.write_reg(reg::PWR_MGMT_1, reg::PWR_WAKE)?;

        self.wait_reset_settled(delay)?;

        self.write_reg(reg::REG_BANK_SEL, reg::BANK_2)?;
        self.write_reg(reg::ACCEL_CONFIG, self.config.full_scale.config_bits())?;
        self.write_reg(reg::REG_BANK_SEL, reg::BANK_0)?;
        Ok(())
    }

    fn wait_reset_settled<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), ImuError<I2C::Error>> {
        for _ in 0..self.config.reset_poll_attempts {
            if let Ok(0) = self.read_reg(reg::PWR_MGMT_2) {
                return Ok(());
            }
            delay.delay_ms(self.config.reset_poll_interval_ms);
        }
        Err(ImuError::ResetTimeout)
    }

    /// Read the identity register.
    pub fn who_am_i(&mut self) -> Result<u8, ImuError<I2C::Error>> {
        self.read_reg(reg::WHO_AM_I)
    }

    /// Read acceleration as `[x, y, z]` raw counts.
    pub fn read_accel(&mut self) -> Result<[i16; 3], ImuError<I2C::Error>> {
        let mut raw = [0u8; 6];
        self.i2c
            .write_read(self.config.address, &[reg::ACCEL_XOUT_H], &mut raw)
            .map_err(ImuError::Bus)?;
        Ok(decode_accel(raw))
    }

    fn write_reg(&mut self, register: u8, value: u8) -> Result<(), ImuError<I2C::Error>> {
        self.i2c
            .write(self.config.address, &[register, value])
            .map_err(ImuError::Bus)
    }

    fn read_reg(&mut self, register: u8) -> Result<u8, ImuError<I2C::Error>> {
        let mut buf = [0u8; 1];
        self.i2c
            .write_read(self.config.address, &[register], &mut buf)
            .map_err(ImuError::Bus)?;
        Ok(buf[0])
    }

    /// Release the bus.
    pub fn release(self) -> I2C {
        self.i2c
    }
}

#[cfg(test)]
pub(crate) mod mock {
    extern crate std;

    use embedded_hal::delay::DelayNs;
    use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, NoAcknowledgeSource, Operation};
    use std::collections::VecDeque;
    use std::vec::Vec;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct BusFault;

    impl embedded_hal::i2c::Error for BusFault {
        fn kind(&self) -> ErrorKind {
            ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address)
        }
    }

    /// Register-addressed fake: records writes, serves reads from queues.
    #[derive(Default)]
    pub struct MockBus {
        pub writes: Vec<(u8, Vec<u8>)>,
        pub status_reads: VecDeque<Result<u8, BusFault>>,
        pub accel_reads: VecDeque<Result<[u8; 6], BusFault>>,
        pub who_am_i: u8,
    }

    impl ErrorType for MockBus {
        type Error = BusFault;
    }

    impl I2c for MockBus {
        fn transaction(
            &mut self,
            address: u8,
            operations: &mut [Operation<'_>],
        ) -> Result<(), Self::Error> {
            let mut register = None;
            for op in operations.iter_mut() {
                match op {
                    Operation::Write(bytes) => {
                        register = bytes.first().copied();
                        if bytes.len() > 1 {
                            self.writes.push((address, bytes.to_vec()));
                        }
                    }
                    Operation::Read(buf) => match register {
                        Some(super::reg::PWR_MGMT_2) => {
                            buf[0] = self.status_reads.pop_front().unwrap_or(Ok(0))?;
                        }
                        Some(super::reg::WHO_AM_I) => buf[0] = self.who_am_i,
                        Some(super::reg::ACCEL_XOUT_H) => {
                            let raw = self.accel_reads.pop_front().unwrap_or(Ok([0; 6]))?;
                            buf.copy_from_slice(&raw);
                        }
                        _ => buf.fill(0),
                    },
                }
            }
            Ok(())
        }
    }

    /// Records every requested delay in milliseconds.
    #[derive(Default)]
    pub struct MockDelay {
        pub delays_ms: Vec<u32>,
    }

    impl DelayNs for MockDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.delays_ms.push(ns / 1_000_000);
        }

        fn delay_ms(&mut self, ms: u32) {
            self.delays_ms.push(ms);
        }
    }
}
