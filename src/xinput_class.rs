//! XInput interface registration on the embassy-usb builder.

use embassy_usb::builder::InterfaceAltBuilder;
use embassy_usb::driver::{Driver, EndpointAddress as UsbEndpointAddress};
use embassy_usb::Builder;
use nudge_core::{ClassDriver, EndpointRegistry, OpenError};
use xinput_proto::{
    EndpointDescriptor, InterfaceDescriptor, DESC_XINPUT_VENDOR, TRANSFER_INTERRUPT,
    XINPUT_INTERFACE, XINPUT_VENDOR_DESCRIPTOR,
};

/// Endpoints allocated for the XInput interface.
pub struct XInputEndpoints<'d, D: Driver<'d>> {
    pub ep_in: D::EndpointIn,
    pub ep_out: D::EndpointOut,
}

/// Opens endpoints on an alternate setting as the class driver walks the
/// interface descriptor.
struct AltRegistry<'a, 'd, D: Driver<'d>> {
    alt: InterfaceAltBuilder<'a, 'd, D>,
    ep_in: Option<D::EndpointIn>,
    ep_out: Option<D::EndpointOut>,
}

impl<'d, D: Driver<'d>> EndpointRegistry for AltRegistry<'_, 'd, D> {
    fn open_endpoint(&mut self, endpoint: &EndpointDescriptor) -> bool {
        if endpoint.transfer_type() != TRANSFER_INTERRUPT {
            return false;
        }
        let addr = Some(UsbEndpointAddress::from(endpoint.address.raw()));
        if endpoint.address.is_in() {
            if self.ep_in.is_some() {
                return false;
            }
            self.ep_in = Some(self.alt.endpoint_interrupt_in(
                addr,
                endpoint.max_packet_size,
                endpoint.interval,
            ));
        } else {
            if self.ep_out.is_some() {
                return false;
            }
            self.ep_out = Some(self.alt.endpoint_interrupt_out(
                addr,
                endpoint.max_packet_size,
                endpoint.interval,
            ));
        }
        true
    }
}

/// Add the vendor-specific XInput interface to `builder` and open it through
/// `driver`.
///
/// The interface, vendor and endpoint descriptors emitted into the
/// configuration descriptor match [`XINPUT_INTERFACE`] byte for byte.
pub fn configure_xinput<'d, D: Driver<'d>>(
    builder: &mut Builder<'d, D>,
    driver: &mut ClassDriver,
) -> Result<XInputEndpoints<'d, D>, OpenError> {
    let itf = InterfaceDescriptor::parse(&XINPUT_INTERFACE).ok_or(OpenError::Malformed)?;
    driver.init();

    let mut function = builder.function(itf.class, itf.subclass, itf.protocol);
    let mut interface = function.interface();
    let mut alt = interface.alt_setting(itf.class, itf.subclass, itf.protocol, None);
    // The builder writes the length and type bytes itself.
    alt.descriptor(DESC_XINPUT_VENDOR, &XINPUT_VENDOR_DESCRIPTOR[2..]);

    let mut registry = AltRegistry {
        alt,
        ep_in: None,
        ep_out: None,
    };
    let len = driver.open(&mut registry, &XINPUT_INTERFACE, XINPUT_INTERFACE.len() as u16)?;
    defmt::info!("XInput interface opened ({} descriptor bytes)", len);

    match (registry.ep_in, registry.ep_out) {
        (Some(ep_in), Some(ep_out)) => Ok(XInputEndpoints { ep_in, ep_out }),
        _ => Err(OpenError::Malformed),
    }
}
