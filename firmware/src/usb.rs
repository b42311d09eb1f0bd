//! USB device descriptor configuration.

use embassy_usb::Config;

pub fn config() -> Config<'static> {
    let mut config = Config::new(0xc0de, 0xcafe);
    config.manufacturer = Some("pulsgen");
    config.product = Some("pulsgen serial adapter");
    config.serial_number = Some("1");
    config.max_power = 100;
    config.max_packet_size_0 = 64;
    config
}
