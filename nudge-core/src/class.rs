//! Vendor class driver for the XInput interface.
//!
//! The USB stack hands the driver its interface descriptor stream when the
//! host selects a configuration. The driver checks that the stream fits the
//! stack's buffer budget, opens each endpoint through the stack and keeps
//! the endpoint addresses for the scheduler. Transfer completions are
//! acknowledged without inspection.

use crate::transport::{EndpointRegistry, TransferResult};
use xinput_proto::{
    descriptors, Direction, EndpointAddress, EndpointDescriptor, InterfaceDescriptor,
    DESC_ENDPOINT,
};

/// Lifecycle of the class driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DriverState {
    Uninitialized,
    /// `init` has run; waiting for the host to select a configuration.
    Ready,
    /// Interface opened and endpoints registered.
    Open,
}

/// Reasons `open` rejects an interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OpenError {
    /// The stack's budget cannot hold interface, endpoints and vendor block.
    BufferTooSmall { required: u16, available: u16 },
    /// The stream is not an interface descriptor or ends before all of its
    /// endpoints were found.
    Malformed,
    /// The stack refused to open an endpoint.
    EndpointRejected(EndpointAddress),
}

#[derive(Debug)]
pub struct ClassDriver {
    state: DriverState,
    endpoint_in: Option<EndpointAddress>,
    endpoint_out: Option<EndpointAddress>,
}

impl ClassDriver {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: DriverState::Uninitialized,
            endpoint_in: None,
            endpoint_out: None,
        }
    }

    pub fn init(&mut self) {
        self.state = DriverState::Ready;
    }

    /// Open the interface at the start of `interface`.
    ///
    /// `max_len` is the number of descriptor bytes the stack has left for
    /// this interface. Returns the number of bytes the interface occupies.
    pub fn open<R: EndpointRegistry>(
        &mut self,
        registry: &mut R,
        interface: &[u8],
        max_len: u16,
    ) -> Result<u16, OpenError> {
        let itf = InterfaceDescriptor::parse(interface).ok_or(OpenError::Malformed)?;

        let required = itf.claimed_len();
        if usize::from(max_len) < required {
            return Err(OpenError::BufferTooSmall {
                required: u16::try_from(required).unwrap_or(u16::MAX),
                available: max_len,
            });
        }

        let len = interface.len().min(usize::from(max_len));
        let mut found = 0;
        let mut endpoint_in = None;
        let mut endpoint_out = None;
        let mut stream = descriptors(&interface[..len]);
        stream.next(); // the interface descriptor itself

        for desc in stream {
            if found == itf.num_endpoints {
                break;
            }
            if desc.kind != DESC_ENDPOINT {
                continue;
            }
            let ep = EndpointDescriptor::parse(desc.bytes).ok_or(OpenError::Malformed)?;
            if !registry.open_endpoint(&ep) {
                return Err(OpenError::EndpointRejected(ep.address));
            }
            match ep.address.direction() {
                Direction::In => endpoint_in = Some(ep.address),
                Direction::Out => endpoint_out = Some(ep.address),
            }
            found += 1;
        }

        if found < itf.num_endpoints {
            return Err(OpenError::Malformed);
        }

        // Addresses are published only for a fully opened interface.
        self.endpoint_in = endpoint_in;
        self.endpoint_out = endpoint_out;
        self.state = DriverState::Open;
        debug!(
            "xinput open: in={} out={}",
            self.endpoint_in.map(EndpointAddress::raw),
            self.endpoint_out.map(EndpointAddress::raw)
        );
        // `required` fits because it is no larger than `max_len`.
        Ok(required as u16)
    }

    /// Stack-facing form of [`ClassDriver::open`]: zero means failure.
    pub fn open_len<R: EndpointRegistry>(
        &mut self,
        registry: &mut R,
        interface: &[u8],
        max_len: u16,
    ) -> u16 {
        match self.open(registry, interface, max_len) {
            Ok(len) => len,
            Err(e) => {
                error!("xinput open failed: {}", e);
                0
            }
        }
    }

    /// Bus reset. Endpoint addresses are kept for the device's lifetime.
    pub fn reset(&self) {}

    /// Completion of a transfer on `endpoint`. Always reports success.
    pub fn xfer_completed(
        &self,
        _endpoint: EndpointAddress,
        _result: TransferResult,
        _byte_count: u32,
    ) -> bool {
        true
    }

    /// Start-of-frame hook, unused.
    pub fn sof(&self, _frame: u16) {}

    #[must_use]
    pub const fn state(&self) -> DriverState {
        self.state
    }

    #[must_use]
    pub const fn endpoint_in(&self) -> Option<EndpointAddress> {
        self.endpoint_in
    }

    #[must_use]
    pub const fn endpoint_out(&self) -> Option<EndpointAddress> {
        self.endpoint_out
    }
}

impl Default for ClassDriver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use std::vec::Vec;
    use xinput_proto::{XINPUT_EP_IN, XINPUT_EP_OUT, XINPUT_INTERFACE};

    #[derive(Default)]
    struct MockRegistry {
        opened: Vec<EndpointAddress>,
        refuse: Option<EndpointAddress>,
    }

    impl EndpointRegistry for MockRegistry {
        fn open_endpoint(&mut self, endpoint: &EndpointDescriptor) -> bool {
            if self.refuse == Some(endpoint.address) {
                return false;
            }
            self.opened.push(endpoint.address);
            true
        }
    }

    const EXACT: u16 = XINPUT_INTERFACE.len() as u16;

    #[test]
    fn test_open_exact_budget() {
        let mut driver = ClassDriver::new();
        let mut registry = MockRegistry::default();
        driver.init();

        assert_eq!(driver.open(&mut registry, &XINPUT_INTERFACE, EXACT), Ok(39));
        assert_eq!(driver.state(), DriverState::Open);
        assert_eq!(driver.endpoint_in(), Some(XINPUT_EP_IN));
        assert_eq!(driver.endpoint_out(), Some(XINPUT_EP_OUT));
        assert_eq!(registry.opened, [XINPUT_EP_IN, XINPUT_EP_OUT]);
    }

    #[test]
    fn test_open_one_byte_short() {
        let mut driver = ClassDriver::new();
        let mut registry = MockRegistry::default();

        assert_eq!(
            driver.open(&mut registry, &XINPUT_INTERFACE, EXACT - 1),
            Err(OpenError::BufferTooSmall {
                required: 39,
                available: 38,
            })
        );
        assert!(registry.opened.is_empty());
        assert_eq!(driver.endpoint_in(), None);
        assert_eq!(driver.open_len(&mut registry, &XINPUT_INTERFACE, EXACT - 1), 0);
    }

    #[test]
    fn test_open_larger_budget() {
        // Trailing bytes belong to the next interface and are not consumed.
        let mut stream = XINPUT_INTERFACE.to_vec();
        stream.extend_from_slice(&[0x09, 0x04, 0x01, 0x00, 0x00, 0xFF, 0x00, 0x00, 0x00]);

        let mut driver = ClassDriver::new();
        let mut registry = MockRegistry::default();
        assert_eq!(driver.open_len(&mut registry, &stream, 512), 39);
        assert_eq!(registry.opened.len(), 2);
    }

    #[test]
    fn test_open_rejected_endpoint() {
        let mut driver = ClassDriver::new();
        let mut registry = MockRegistry {
            refuse: Some(XINPUT_EP_OUT),
            ..MockRegistry::default()
        };
        assert_eq!(
            driver.open(&mut registry, &XINPUT_INTERFACE, EXACT),
            Err(OpenError::EndpointRejected(XINPUT_EP_OUT))
        );
        assert_ne!(driver.state(), DriverState::Open);
        // The IN endpoint was opened before the rejection but must not leak.
        assert_eq!(driver.endpoint_in(), None);
        assert_eq!(driver.endpoint_out(), None);
    }

    #[test]
    fn test_open_missing_endpoints() {
        // Interface declares two endpoints, stream carries only one.
        let truncated = &XINPUT_INTERFACE[..32];
        let mut driver = ClassDriver::new();
        let mut registry = MockRegistry::default();
        assert_eq!(
            driver.open(&mut registry, truncated, EXACT),
            Err(OpenError::Malformed)
        );
        assert_eq!(driver.endpoint_in(), None);
    }

    #[test]
    fn test_open_not_an_interface() {
        let mut driver = ClassDriver::new();
        let mut registry = MockRegistry::default();
        assert_eq!(
            driver.open(&mut registry, &XINPUT_INTERFACE[25..], EXACT),
            Err(OpenError::Malformed)
        );
    }

    #[test]
    fn test_completion_always_succeeds() {
        let driver = ClassDriver::new();
        for result in [
            TransferResult::Success,
            TransferResult::Failed,
            TransferResult::Stalled,
            TransferResult::Timeout,
            TransferResult::Invalid,
        ] {
            assert!(driver.xfer_completed(XINPUT_EP_IN, result, 0));
        }
    }

    #[test]
    fn test_reset_keeps_endpoints() {
        let mut driver = ClassDriver::new();
        driver.init();
        driver.open(&mut MockRegistry::default(), &XINPUT_INTERFACE, EXACT).unwrap();
        driver.reset();
        assert_eq!(driver.endpoint_in(), Some(XINPUT_EP_IN));
    }
}
