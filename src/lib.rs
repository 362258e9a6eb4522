//! Pinball nudge controller for RP2040, enumerating as a wired Xbox 360
//! (XInput) gamepad.
//!
//! The platform-agnostic pieces live in `nudge-core`; this crate wires them
//! to embassy-rp and embassy-usb.
//!
//! # Wiring
//!
//! | Signal         | Pin    | Notes                         |
//! |----------------|--------|-------------------------------|
//! | Launch button  | GPIO6  | Active low, internal pull-up  |
//! | Left flipper   | GPIO10 | Active low, internal pull-up  |
//! | Right flipper  | GPIO15 | Active low, internal pull-up  |
//! | ICM-20948 SDA  | GPIO16 | I2C0, 400 kHz                 |
//! | ICM-20948 SCL  | GPIO17 | I2C0, 400 kHz                 |
//!
//! Core 0 runs the USB stack and the report loop; core 1 runs the tilt
//! detector.

#![no_std]

// Re-export core types for convenience
pub use nudge_core::{
    ButtonLevels, ClassDriver, Icm20948, PhysicalButtons, ReportPipeline, SendOutcome,
    StickEmulator, StopSignal, TiltDetector, TiltMailbox, TransmissionScheduler, Transport,
};

pub mod usb_link;
pub mod xinput_class;

pub use usb_link::{LinkHandler, UsbLink, UsbTransport};
pub use xinput_class::{configure_xinput, XInputEndpoints};
