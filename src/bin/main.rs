#![no_std]
#![no_main]

use defmt::{error, info, trace, warn};
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_futures::select::{select, Either};
use embassy_futures::yield_now;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Input, Pull};
use embassy_rp::i2c::{self, I2c};
use embassy_rp::multicore::{spawn_core1, Stack};
use embassy_rp::peripherals::USB;
use embassy_rp::usb::Driver;
use embassy_time::{Delay, Instant};
use embassy_usb::driver::{Endpoint, EndpointError, EndpointIn, EndpointOut};
use embassy_usb::{Builder, Config as UsbConfig, UsbDevice};
use nudge_core::{
    EndpointAddress, TransferResult, DEFAULT_IMU_CONFIG, DEFAULT_SCHEDULER_CONFIG,
    DEFAULT_STICK_CONFIG, DEFAULT_TILT_CONFIG,
};
use nudge_gamepad::{
    configure_xinput, ClassDriver, Icm20948, LinkHandler, PhysicalButtons, ReportPipeline,
    StickEmulator, StopSignal, TiltDetector, TiltMailbox, TransmissionScheduler, UsbLink,
    UsbTransport,
};
use static_cell::StaticCell;
use xinput_proto::{XINPUT_CLASS, XINPUT_DEVICE_RELEASE, XINPUT_PID, XINPUT_VID};

#[cfg(feature = "dev-panic")]
use panic_probe as _;
#[cfg(feature = "prod-panic")]
use panic_reset as _;

bind_interrupts!(struct Irqs {
    USBCTRL_IRQ => embassy_rp::usb::InterruptHandler<USB>;
});

type UsbDriver = Driver<'static, USB>;
type EpIn = <UsbDriver as embassy_usb::driver::Driver<'static>>::EndpointIn;
type EpOut = <UsbDriver as embassy_usb::driver::Driver<'static>>::EndpointOut;
type Buttons = PhysicalButtons<Input<'static>, Input<'static>, Input<'static>>;

const I2C_FREQUENCY_HZ: u32 = 400_000;

/// Tilt events from core 1 to the report loop.
static TILT_MAILBOX: TiltMailbox = TiltMailbox::new();
/// Never raised on the device; the detector runs until power-off.
static DETECTOR_STOP: StopSignal = StopSignal::new();

static USB_LINK: UsbLink = UsbLink::new();
static CLASS_DRIVER: StaticCell<ClassDriver> = StaticCell::new();
static LINK_HANDLER: StaticCell<LinkHandler> = StaticCell::new();

/// USB device configuration buffer.
static CONFIG_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
static BOS_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
static MSOS_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
static CONTROL_BUF: StaticCell<[u8; 64]> = StaticCell::new();

static CORE1_STACK: StaticCell<Stack<4096>> = StaticCell::new();

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Nudge gamepad starting...");

    let p = embassy_rp::init(embassy_rp::config::Config::default());

    // --- Buttons ---
    let buttons = PhysicalButtons::new(
        Input::new(p.PIN_6, Pull::Up),  // launch
        Input::new(p.PIN_10, Pull::Up), // left flipper
        Input::new(p.PIN_15, Pull::Up), // right flipper
    );

    // --- Accelerometer on core 1 ---
    let mut i2c_config = i2c::Config::default();
    i2c_config.frequency = I2C_FREQUENCY_HZ;
    i2c_config.sda_pullup = true;
    i2c_config.scl_pullup = true;
    let bus = I2c::new_blocking(p.I2C0, p.PIN_17, p.PIN_16, i2c_config);

    let core1_stack = CORE1_STACK.init_with(Stack::new);
    spawn_core1(p.CORE1, core1_stack, move || {
        let imu = Icm20948::new(bus, DEFAULT_IMU_CONFIG);
        let mut detector = TiltDetector::new(imu, Delay, DEFAULT_TILT_CONFIG);
        if let Err(e) = detector.run(&TILT_MAILBOX, &DETECTOR_STOP) {
            error!("Tilt detector stopped: {:?}", e);
        }
        loop {
            cortex_m::asm::wfe();
        }
    });

    // --- USB Setup ---
    let usb_driver = Driver::new(p.USB, Irqs);

    let mut usb_config = UsbConfig::new(XINPUT_VID, XINPUT_PID);
    usb_config.manufacturer = Some("Rust Gamepad");
    usb_config.product = Some("Pinball Nudge Controller");
    usb_config.serial_number = Some("001");
    usb_config.device_class = XINPUT_CLASS;
    usb_config.device_sub_class = 0xFF;
    usb_config.device_protocol = 0xFF;
    usb_config.device_release = XINPUT_DEVICE_RELEASE;
    usb_config.composite_with_iads = false;
    usb_config.supports_remote_wakeup = true;
    usb_config.max_power = 500;
    usb_config.max_packet_size_0 = 64;

    let config_descriptor = CONFIG_DESCRIPTOR.init([0; 256]);
    let bos_descriptor = BOS_DESCRIPTOR.init([0; 256]);
    let msos_descriptor = MSOS_DESCRIPTOR.init([0; 256]);
    let control_buf = CONTROL_BUF.init([0; 64]);

    let mut builder = Builder::new(
        usb_driver,
        usb_config,
        config_descriptor,
        bos_descriptor,
        msos_descriptor,
        control_buf,
    );

    let class_driver = CLASS_DRIVER.init(ClassDriver::new());
    let endpoints = match configure_xinput(&mut builder, class_driver) {
        Ok(endpoints) => endpoints,
        Err(e) => {
            error!("XInput interface rejected: {:?}", e);
            return;
        }
    };
    let class_driver: &'static ClassDriver = class_driver;

    builder.handler(LINK_HANDLER.init(LinkHandler::new(&USB_LINK, class_driver)));

    // Build the USB device
    let usb_device = builder.build();

    let pipeline = ReportPipeline::new(
        buttons,
        StickEmulator::new(DEFAULT_STICK_CONFIG),
        TransmissionScheduler::new(DEFAULT_SCHEDULER_CONFIG),
        &TILT_MAILBOX,
        class_driver,
    );

    // Spawn tasks (unwrap the SpawnToken, then spawn)
    spawner.spawn(usb_task(usb_device, &USB_LINK).unwrap());
    spawner.spawn(writer_task(endpoints.ep_in, &USB_LINK, class_driver).unwrap());
    spawner.spawn(out_task(endpoints.ep_out).unwrap());
    spawner.spawn(report_task(pipeline, UsbTransport::new(&USB_LINK)).unwrap());

    info!("Nudge gamepad initialized, waiting for host...");
}

/// USB device task - runs the stack and issues remote wakeups on request.
#[embassy_executor::task]
async fn usb_task(mut device: UsbDevice<'static, UsbDriver>, link: &'static UsbLink) {
    loop {
        device.run_until_suspend().await;
        match select(device.wait_resume(), link.wakeup_requested()).await {
            Either::First(()) => link.clear_wakeup(),
            Either::Second(()) => {
                if let Err(e) = device.remote_wakeup().await {
                    // Host has not enabled remote wakeup; stay asleep until it resumes us.
                    warn!("Remote wakeup failed: {:?}", e);
                    link.clear_wakeup();
                    device.wait_resume().await;
                }
            }
        }
    }
}

/// Writer task - performs the IN transfers submitted by the report loop.
#[embassy_executor::task]
async fn writer_task(mut ep_in: EpIn, link: &'static UsbLink, driver: &'static ClassDriver) {
    let endpoint = EndpointAddress(u8::from(ep_in.info().addr));
    loop {
        let report = link.next_report().await;
        let result = match ep_in.write(&report).await {
            Ok(()) => TransferResult::Success,
            Err(EndpointError::BufferOverflow) => TransferResult::Invalid,
            Err(_) => TransferResult::Failed,
        };
        link.transfer_done();
        driver.xfer_completed(endpoint, result, report.len() as u32);
    }
}

/// OUT task - drains host packets (rumble and LED commands are ignored).
#[embassy_executor::task]
async fn out_task(mut ep_out: EpOut) {
    let mut buf = [0u8; 32];
    loop {
        ep_out.wait_enabled().await;
        loop {
            match ep_out.read(&mut buf).await {
                Ok(n) => trace!("Host OUT packet: {=[u8]:x}", &buf[..n]),
                Err(EndpointError::Disabled) => break,
                Err(EndpointError::BufferOverflow) => warn!("Oversized OUT packet dropped"),
            }
        }
    }
}

/// Report task - the report loop, yielding to the USB tasks between passes.
#[embassy_executor::task]
async fn report_task(mut pipeline: ReportPipeline<'static, Buttons>, mut transport: UsbTransport) {
    loop {
        pipeline.tick(Instant::now().as_millis(), &mut transport);
        yield_now().await;
    }
}
