//! XInput wire formats for the nudge gamepad.
//!
//! This crate holds everything that is pure data layout:
//!
//! - **Report**: the fixed 20-byte input report
//!   - [`Report`] - controller snapshot and its serialization
//!   - [`ButtonsLow`], [`ButtonsHigh`] - the two button bitmasks
//!
//! - **Descriptors**: walking the interface descriptor stream handed to the
//!   class driver, and the static tables that describe the XInput interface
//!   - [`descriptors()`] - iterate length-prefixed descriptors
//!   - [`InterfaceDescriptor`], [`EndpointDescriptor`], [`EndpointAddress`]
//!   - [`XINPUT_INTERFACE`] - interface + vendor block + IN/OUT endpoints
//!
//! # Report Format
//!
//! ```text
//! [id=0][size=20][btn lo][btn hi][lt][rt][lx:i16][ly:i16][rx:i16][ry:i16][0;6]
//! ```
//!
//! Stick axes are little-endian.
//!
//! # Example
//!
//! ```
//! use xinput_proto::{ButtonsHigh, Report};
//!
//! let mut report = Report::neutral();
//! report.buttons_high = ButtonsHigh::A;
//! report.left_x = i16::MAX;
//!
//! let bytes = report.to_bytes();
//! assert_eq!(bytes[1], 20);
//! assert_eq!(bytes[3], 0x10);
//! assert_eq!(&bytes[6..8], &[0xFF, 0x7F]);
//! ```
//!
//! # Features
//!
//! - **`std`**: Enable standard library support (for host testing)
//! - **`defmt`**: Enable defmt formatting (for embedded logging)

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

pub mod descriptor;
pub mod report;

pub use descriptor::{
    descriptors, DescriptorIter, Direction, EndpointAddress, EndpointDescriptor,
    InterfaceDescriptor, RawDescriptor, DESC_ENDPOINT, DESC_INTERFACE, DESC_XINPUT_VENDOR,
    ENDPOINT_DESCRIPTOR_LEN, INTERFACE_DESCRIPTOR_LEN, TRANSFER_INTERRUPT, VENDOR_DESCRIPTOR_RESERVED,
    XINPUT_CLASS, XINPUT_DEVICE_RELEASE, XINPUT_EP_IN, XINPUT_EP_OUT, XINPUT_INTERFACE, XINPUT_PID,
    XINPUT_PROTOCOL, XINPUT_SUBCLASS, XINPUT_VENDOR_DESCRIPTOR, XINPUT_VID,
};
pub use report::{ButtonsHigh, ButtonsLow, Report, REPORT_SIZE};
