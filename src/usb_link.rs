//! Bus state shared between the USB stack and the report loop.
//!
//! embassy-usb transfers are async and owned by whoever holds the endpoint,
//! while the report loop needs non-blocking busy/ready checks. [`UsbLink`]
//! bridges the two: the report loop submits into a latest-value signal and
//! raises `busy`; the writer task performs the transfer and clears it.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_usb::Handler;
use nudge_core::{ClassDriver, EndpointAddress, Transport};
use portable_atomic::{AtomicBool, Ordering};
use xinput_proto::REPORT_SIZE;

/// Shared bus state. Lives in a `static`.
pub struct UsbLink {
    configured: AtomicBool,
    suspended: AtomicBool,
    busy: AtomicBool,
    claimed: AtomicBool,
    report: Signal<CriticalSectionRawMutex, [u8; REPORT_SIZE]>,
    wakeup: Signal<CriticalSectionRawMutex, ()>,
}

impl UsbLink {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            configured: AtomicBool::new(false),
            suspended: AtomicBool::new(false),
            busy: AtomicBool::new(false),
            claimed: AtomicBool::new(false),
            report: Signal::new(),
            wakeup: Signal::new(),
        }
    }

    /// Wait for the next submitted report.
    pub async fn next_report(&self) -> [u8; REPORT_SIZE] {
        self.report.wait().await
    }

    /// Mark the in-flight transfer as finished.
    pub fn transfer_done(&self) {
        self.busy.store(false, Ordering::Release);
    }

    /// Wait until the report loop asks for a remote wakeup.
    pub async fn wakeup_requested(&self) {
        self.wakeup.wait().await;
    }

    /// Drop a wakeup request left over from an earlier suspend.
    pub fn clear_wakeup(&self) {
        self.wakeup.reset();
    }
}

impl Default for UsbLink {
    fn default() -> Self {
        Self::new()
    }
}

/// [`Transport`] for the report loop.
pub struct UsbTransport {
    link: &'static UsbLink,
}

impl UsbTransport {
    #[must_use]
    pub fn new(link: &'static UsbLink) -> Self {
        Self { link }
    }
}

impl Transport for UsbTransport {
    fn ready(&self) -> bool {
        self.link.configured.load(Ordering::Acquire) && !self.link.suspended.load(Ordering::Acquire)
    }

    fn suspended(&self) -> bool {
        self.link.suspended.load(Ordering::Acquire)
    }

    fn remote_wakeup(&mut self) {
        self.link.wakeup.signal(());
    }

    fn busy(&self, _endpoint: EndpointAddress) -> bool {
        self.link.busy.load(Ordering::Acquire)
    }

    fn claim(&mut self, _endpoint: EndpointAddress) -> bool {
        self.link
            .claimed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    fn submit(&mut self, _endpoint: EndpointAddress, data: &[u8]) -> bool {
        let Ok(report) = <[u8; REPORT_SIZE]>::try_from(data) else {
            return false;
        };
        if !self.link.claimed.load(Ordering::Acquire) {
            return false;
        }
        self.link.busy.store(true, Ordering::Release);
        self.link.report.signal(report);
        true
    }

    fn release(&mut self, _endpoint: EndpointAddress) -> bool {
        self.link.claimed.swap(false, Ordering::AcqRel)
    }
}

/// Tracks bus state changes reported by the USB device.
pub struct LinkHandler {
    link: &'static UsbLink,
    driver: &'static ClassDriver,
}

impl LinkHandler {
    #[must_use]
    pub fn new(link: &'static UsbLink, driver: &'static ClassDriver) -> Self {
        Self { link, driver }
    }
}

impl Handler for LinkHandler {
    fn enabled(&mut self, enabled: bool) {
        if !enabled {
            self.link.configured.store(false, Ordering::Release);
        }
    }

    fn reset(&mut self) {
        self.link.configured.store(false, Ordering::Release);
        self.link.suspended.store(false, Ordering::Release);
        self.driver.reset();
        defmt::info!("USB bus reset");
    }

    fn configured(&mut self, configured: bool) {
        self.link.configured.store(configured, Ordering::Release);
        defmt::info!("USB configured: {}", configured);
    }

    fn suspended(&mut self, suspended: bool) {
        self.link.suspended.store(suspended, Ordering::Release);
        defmt::info!("USB suspended: {}", suspended);
    }
}
