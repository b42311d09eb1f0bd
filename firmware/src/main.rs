#![no_std]
#![no_main]

use embassy_executor::Spawner;
use embassy_futures::yield_now;
use embassy_rp::bind_interrupts;
use embassy_rp::peripherals::USB;
use embassy_rp::usb::{Driver, InterruptHandler as USBInterruptHandler};
use embassy_usb::class::cdc_acm::{CdcAcmClass, State};
use embassy_usb::Builder;
use engine::{Engine, MessageTransport};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

/// RP2040 [`engine::GpioSink`]
mod gpio;
/// RP2040 [`engine::TickSource`]
mod tick;
/// USB serial [`engine::MessageTransport`]
mod transport;
/// USB device bring-up
mod usb;

use gpio::BankGpio;
use tick::HwTick;
use transport::{ByteChannel, UsbTransport};

bind_interrupts!(struct Irqs {
    USBCTRL_IRQ => USBInterruptHandler<USB>;
});

/// Bytes read off USB, awaiting `base_thread()`.
static RX_CHANNEL: ByteChannel = ByteChannel::new();
/// Bytes queued by `handle_message`, awaiting the USB write side.
static TX_CHANNEL: ByteChannel = ByteChannel::new();

/// Pump bytes between the USB CDC-ACM class and the two channels
/// [`Engine::handle_message`] consumes from and produces into. Never
/// touches engine state directly; only the main loop does that.
#[embassy_executor::task]
async fn usb_io_task(mut class: CdcAcmClass<'static, Driver<'static, USB>>) {
    let mut buf = [0u8; 64];
    loop {
        class.wait_connection().await;
        loop {
            let mut out = [0u8; 64];
            let mut n = 0;
            while n < out.len() {
                match TX_CHANNEL.try_receive() {
                    Ok(b) => {
                        out[n] = b;
                        n += 1;
                    }
                    Err(_) => break,
                }
            }
            if n > 0 && class.write_packet(&out[..n]).await.is_err() {
                break;
            }

            match class.read_packet(&mut buf).await {
                Ok(count) => {
                    for &b in &buf[..count] {
                        let _ = RX_CHANNEL.try_send(b);
                    }
                }
                Err(_) => break,
            }
        }
    }
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let p = embassy_rp::init(Default::default());
    defmt::info!("pulsgen firmware starting");

    let driver = Driver::new(p.USB, Irqs);

    static CONFIG_DESC: StaticCell<[u8; 256]> = StaticCell::new();
    static BOS_DESC: StaticCell<[u8; 256]> = StaticCell::new();
    static MSOS_DESC: StaticCell<[u8; 256]> = StaticCell::new();
    static CONTROL_BUF: StaticCell<[u8; 64]> = StaticCell::new();
    static STATE: StaticCell<State> = StaticCell::new();
    let config_descriptor = CONFIG_DESC.init([0; 256]);
    let bos_descriptor = BOS_DESC.init([0; 256]);
    let msos_descriptor = MSOS_DESC.init([0; 256]);
    let control_buf = CONTROL_BUF.init([0; 64]);
    let state = STATE.init(State::new());

    let usb_config = usb::config();
    let mut builder = Builder::new(
        driver,
        usb_config,
        config_descriptor,
        bos_descriptor,
        msos_descriptor,
        control_buf,
    );
    let class = CdcAcmClass::new(&mut builder, state, 64);
    let usb_dev = builder.build();

    spawner.must_spawn(usb_io_task(class));
    spawner.must_spawn(usb_run_task(usb_dev));

    let mut engine = Engine::new();
    let mut gpio_sink = BankGpio::new();
    let mut tick_source = HwTick::new();
    engine.init(&mut tick_source);
    let mut transport = UsbTransport::new(RX_CHANNEL.receiver(), TX_CHANNEL.sender());

    defmt::info!("pulsgen: entering base thread");
    loop {
        engine.base_thread(&mut gpio_sink, &mut tick_source);

        if let Some((code, bytes, length)) = transport.try_recv() {
            match engine.handle_message(&mut gpio_sink, code, &bytes, length) {
                Ok(Some(reply)) => transport.send(code, &reply),
                Ok(None) => {}
                Err(_) => defmt::warn!("pulsgen: message rejected"),
            }
        }

        // Give the USB task a chance to run. The scheduler pass above never
        // awaits anything itself, matching the engine's own cooperative,
        // non-blocking contract.
        yield_now().await;
    }
}

#[embassy_executor::task]
async fn usb_run_task(mut device: embassy_usb::UsbDevice<'static, Driver<'static, USB>>) {
    device.run().await;
}
