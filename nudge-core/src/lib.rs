//! Platform-agnostic report pipeline and tilt detection for the nudge gamepad.
//!
//! This crate provides the stateful parts of the firmware without any
//! chip-specific dependencies. Hardware is reached through `embedded-hal`
//! 1.0 traits and the USB stack through the [`transport`] traits, so
//! everything here runs in host tests.
//!
//! # Overview
//!
//! - [`buttons`]: Physical button sampling ([`PhysicalButtons`])
//! - [`stick`]: Left-stick emulation from tilt events ([`StickEmulator`])
//! - [`tilt`]: Threshold policy and cross-core mailbox ([`TiltMailbox`])
//! - [`imu`]: ICM-20948 accelerometer driver ([`Icm20948`])
//! - [`detector`]: Tilt detector loop ([`TiltDetector`])
//! - [`class`]: XInput class driver adapter ([`ClassDriver`])
//! - [`scheduler`]: Rate-limited report submission ([`TransmissionScheduler`])
//! - [`pipeline`]: One pass of the report loop ([`ReportPipeline`])
//!
//! # Execution Contexts
//!
//! The detector blocks on bus transactions and settle delays, so it runs
//! alone on one core. The pipeline runs on the other, cooperatively with the
//! USB stack. They share only a [`TiltMailbox`].
//!
//! # Features
//!
//! - **`std`**: Enable standard library support (for host testing)
//! - **`defmt`**: Enable defmt formatting and logging (for embedded use)
//!
//! # No-std Support
//!
//! This crate is `#![no_std]` by default and uses no heap allocations.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

#[macro_use]
mod fmt;

pub mod buttons;
pub mod class;
pub mod detector;
pub mod imu;
pub mod pipeline;
pub mod scheduler;
pub mod stick;
pub mod tilt;
pub mod transport;

// Re-export main types at crate root
pub use buttons::{sample_levels, ButtonLevels, PhysicalButtons};
pub use class::{ClassDriver, DriverState, OpenError};
pub use detector::{DetectorError, TiltDetector};
pub use imu::{AccelFullScale, Icm20948, ImuConfig, ImuError, DEFAULT_IMU_CONFIG};
pub use pipeline::{ButtonSampler, ReportPipeline};
pub use scheduler::{SchedulerConfig, SendOutcome, TransmissionScheduler, DEFAULT_SCHEDULER_CONFIG};
pub use stick::{StickConfig, StickEmulator, DEFAULT_STICK_CONFIG};
pub use tilt::{decode_accel, StopSignal, TiltConfig, TiltEvents, TiltMailbox, DEFAULT_TILT_CONFIG};
pub use transport::{EndpointRegistry, TransferResult, Transport};
pub use xinput_proto::{EndpointAddress, Report};
