//! [`engine::TickSource`] over the RP2040's free-running hardware timer.

use embassy_rp::pac;
use engine::{TickExtender, TickSource};

/// Reads the low 32 bits of the RP2040 timer (1 MHz, free-running since
/// reset) and extends it to a monotonic 64-bit tick with [`TickExtender`].
#[derive(Debug, Default)]
pub struct HwTick {
    extender: TickExtender,
}

impl HwTick {
    pub const fn new() -> Self {
        Self {
            extender: TickExtender::new(),
        }
    }
}

impl TickSource for HwTick {
    fn start(&mut self) {
        // The timer free-runs from power-on; nothing to arm.
    }

    fn tick_now(&mut self) -> u64 {
        let raw = pac::TIMER.timerawl().read();
        self.extender.extend(raw)
    }
}
