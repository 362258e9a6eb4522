//! Traits the USB stack implements for the class driver and scheduler.
//!
//! The stack is treated as a capability: it allocates endpoints while the
//! interface is being opened, and at runtime answers readiness and busy
//! queries and accepts non-blocking submissions. Completion arrives later
//! through [`ClassDriver::xfer_completed`](crate::ClassDriver::xfer_completed).

use xinput_proto::{EndpointAddress, EndpointDescriptor};

/// Endpoint allocation while an interface is being opened.
pub trait EndpointRegistry {
    /// Open the endpoint described by `endpoint`.
    ///
    /// Returns `false` if the stack cannot provide it.
    fn open_endpoint(&mut self, endpoint: &EndpointDescriptor) -> bool;
}

/// Runtime access to the device's endpoints and bus state.
///
/// # `no_std` Compatibility
///
/// All implementations must be `#![no_std]` compatible with no heap allocation.
/// No method may block.
pub trait Transport {
    /// Device is configured by the host and not suspended.
    fn ready(&self) -> bool;

    /// Bus is suspended.
    fn suspended(&self) -> bool;

    /// Ask the host to resume the bus.
    fn remote_wakeup(&mut self);

    /// A transfer on `endpoint` is still in flight.
    fn busy(&self, endpoint: EndpointAddress) -> bool;

    /// Take exclusive use of `endpoint`. Returns `false` if already taken.
    fn claim(&mut self, endpoint: EndpointAddress) -> bool;

    /// Start a transfer of `data` on a claimed endpoint.
    ///
    /// Returns once the transfer is queued, not when it completes.
    fn submit(&mut self, endpoint: EndpointAddress, data: &[u8]) -> bool;

    /// Give up the claim taken with [`Transport::claim`].
    fn release(&mut self, endpoint: EndpointAddress) -> bool;
}

/// Outcome of a finished transfer, as reported by the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransferResult {
    Success,
    Failed,
    Stalled,
    Timeout,
    Invalid,
}
