//! USB descriptor walking and the static XInput interface tables.
//!
//! Descriptors are length-prefixed records: `[bLength, bDescriptorType, ...]`.
//! Only the interface and endpoint layouts are decoded; anything else
//! (including the vendor descriptor XInput hosts expect) is passed through
//! as raw bytes.

/// `bDescriptorType` for an interface descriptor.
pub const DESC_INTERFACE: u8 = 0x04;

/// `bDescriptorType` for an endpoint descriptor.
pub const DESC_ENDPOINT: u8 = 0x05;

/// `bDescriptorType` of the undocumented XInput vendor descriptor.
pub const DESC_XINPUT_VENDOR: u8 = 0x21;

/// Length of a standard interface descriptor.
pub const INTERFACE_DESCRIPTOR_LEN: usize = 9;

/// Length of a standard endpoint descriptor.
pub const ENDPOINT_DESCRIPTOR_LEN: usize = 7;

/// Bytes reserved for the vendor descriptor that follows the interface.
pub const VENDOR_DESCRIPTOR_RESERVED: usize = 16;

/// Transfer type bits of `bmAttributes` for an interrupt endpoint.
pub const TRANSFER_INTERRUPT: u8 = 0x03;

/// Direction of an endpoint, as seen from the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Device to host.
    In,
    /// Host to device.
    Out,
}

/// Endpoint address byte: number in the low nibble, direction in bit 7.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EndpointAddress(pub u8);

impl EndpointAddress {
    const DIR_IN: u8 = 0x80;

    /// Build an address from a number and direction.
    #[must_use]
    pub const fn new(number: u8, direction: Direction) -> Self {
        match direction {
            Direction::In => Self((number & 0x0F) | Self::DIR_IN),
            Direction::Out => Self(number & 0x0F),
        }
    }

    /// Endpoint number without the direction bit.
    #[inline]
    #[must_use]
    pub const fn number(self) -> u8 {
        self.0 & 0x0F
    }

    #[inline]
    #[must_use]
    pub const fn is_in(self) -> bool {
        self.0 & Self::DIR_IN != 0
    }

    #[inline]
    #[must_use]
    pub const fn direction(self) -> Direction {
        if self.is_in() {
            Direction::In
        } else {
            Direction::Out
        }
    }

    /// Raw address byte.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u8 {
        self.0
    }
}

/// One raw descriptor from a descriptor stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawDescriptor<'a> {
    /// `bDescriptorType`.
    pub kind: u8,
    /// The whole descriptor, header included.
    pub bytes: &'a [u8],
}

/// Iterator over a concatenated descriptor stream.
///
/// Stops at the first record whose length is shorter than its own header or
/// runs past the end of the buffer.
#[derive(Clone, Debug)]
pub struct DescriptorIter<'a> {
    rest: &'a [u8],
}

/// Walk the descriptors in `bytes`.
#[must_use]
pub fn descriptors(bytes: &[u8]) -> DescriptorIter<'_> {
    DescriptorIter { rest: bytes }
}

impl<'a> DescriptorIter<'a> {
    /// Bytes not yet yielded.
    #[must_use]
    pub fn remaining(&self) -> &'a [u8] {
        self.rest
    }
}

impl<'a> Iterator for DescriptorIter<'a> {
    type Item = RawDescriptor<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.rest.len() < 2 {
            return None;
        }
        let len = self.rest[0] as usize;
        if len < 2 || len > self.rest.len() {
            self.rest = &[];
            return None;
        }
        let (bytes, rest) = self.rest.split_at(len);
        self.rest = rest;
        Some(RawDescriptor {
            kind: bytes[1],
            bytes,
        })
    }
}

/// Decoded standard interface descriptor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InterfaceDescriptor {
    pub number: u8,
    pub alternate_setting: u8,
    pub num_endpoints: u8,
    pub class: u8,
    pub subclass: u8,
    pub protocol: u8,
    pub string_index: u8,
}

impl InterfaceDescriptor {
    /// Decode the interface descriptor at the start of `bytes`.
    ///
    /// Returns `None` if the buffer is too short or the header does not
    /// describe an interface.
    #[must_use]
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < INTERFACE_DESCRIPTOR_LEN
            || (bytes[0] as usize) < INTERFACE_DESCRIPTOR_LEN
            || bytes[1] != DESC_INTERFACE
        {
            return None;
        }
        Some(Self {
            number: bytes[2],
            alternate_setting: bytes[3],
            num_endpoints: bytes[4],
            class: bytes[5],
            subclass: bytes[6],
            protocol: bytes[7],
            string_index: bytes[8],
        })
    }

    /// Size the interface claims: itself, its endpoints and the vendor block.
    #[must_use]
    pub const fn claimed_len(&self) -> usize {
        INTERFACE_DESCRIPTOR_LEN
            + self.num_endpoints as usize * ENDPOINT_DESCRIPTOR_LEN
            + VENDOR_DESCRIPTOR_RESERVED
    }
}

/// Decoded standard endpoint descriptor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EndpointDescriptor {
    pub address: EndpointAddress,
    pub attributes: u8,
    pub max_packet_size: u16,
    pub interval: u8,
}

impl EndpointDescriptor {
    /// Decode an endpoint descriptor.
    #[must_use]
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < ENDPOINT_DESCRIPTOR_LEN
            || (bytes[0] as usize) < ENDPOINT_DESCRIPTOR_LEN
            || bytes[1] != DESC_ENDPOINT
        {
            return None;
        }
        Some(Self {
            address: EndpointAddress(bytes[2]),
            attributes: bytes[3],
            max_packet_size: u16::from_le_bytes([bytes[4], bytes[5]]),
            interval: bytes[6],
        })
    }

    /// Transfer type bits (0 control, 1 isochronous, 2 bulk, 3 interrupt).
    #[inline]
    #[must_use]
    pub const fn transfer_type(&self) -> u8 {
        self.attributes & 0x03
    }
}

/// USB vendor id used by wired Xbox 360 controllers.
pub const XINPUT_VID: u16 = 0x045E;

/// USB product id used by wired Xbox 360 controllers.
pub const XINPUT_PID: u16 = 0x028E;

/// `bcdDevice` reported by wired Xbox 360 controllers.
pub const XINPUT_DEVICE_RELEASE: u16 = 0x0114;

/// Vendor-specific class code used for device and interface.
pub const XINPUT_CLASS: u8 = 0xFF;

/// Interface subclass of the XInput gamepad interface.
pub const XINPUT_SUBCLASS: u8 = 0x5D;

/// Interface protocol of the XInput gamepad interface.
pub const XINPUT_PROTOCOL: u8 = 0x01;

/// Vendor descriptor emitted after the interface descriptor.
///
/// Hosts do not document it but refuse the device without it.
pub const XINPUT_VENDOR_DESCRIPTOR: [u8; VENDOR_DESCRIPTOR_RESERVED] = [
    0x10, 0x21, 0x10, 0x01, 0x01, 0x24, 0x81, 0x14, 0x03, 0x00, 0x03, 0x13, 0x02, 0x00, 0x03,
    0x00,
];

/// Interrupt IN endpoint carrying input reports.
pub const XINPUT_EP_IN: EndpointAddress = EndpointAddress(0x81);

/// Interrupt OUT endpoint carrying rumble/LED commands.
pub const XINPUT_EP_OUT: EndpointAddress = EndpointAddress(0x02);

/// The gamepad interface as it appears in the configuration descriptor.
pub const XINPUT_INTERFACE: [u8; 39] = [
    // Interface 0, alt 0, 2 endpoints, class FF/5D/01
    0x09, 0x04, 0x00, 0x00, 0x02, 0xFF, 0x5D, 0x01, 0x00,
    // Vendor descriptor
    0x10, 0x21, 0x10, 0x01, 0x01, 0x24, 0x81, 0x14, 0x03, 0x00, 0x03, 0x13, 0x02, 0x00, 0x03,
    0x00,
    // EP 0x81 IN, interrupt, 32 bytes, 1 ms
    0x07, 0x05, 0x81, 0x03, 0x20, 0x00, 0x01,
    // EP 0x02 OUT, interrupt, 32 bytes, 8 ms
    0x07, 0x05, 0x02, 0x03, 0x20, 0x00, 0x08,
];
