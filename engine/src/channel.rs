//! Per-channel state: pin binding, active task parameters, and the FIFO of
//! queued follow-on tasks.

use crate::fifo::Fifo;

/// The GPIO pin a channel drives, with both `mask` and its complement
/// cached at setup time (the engine never recomputes `!mask` on the hot
/// path).
#[derive(Debug, Clone, Copy)]
pub struct PinBinding {
    pub port: u8,
    pub mask: u32,
    pub mask_complement: u32,
    pub inverted: bool,
}

impl Default for PinBinding {
    fn default() -> Self {
        Self {
            port: 0,
            mask: 0,
            mask_complement: u32::MAX,
            inverted: false,
        }
    }
}

/// One pulse-generator channel: a pin binding, its active task (if any), and
/// its FIFO of queued follow-on tasks.
#[derive(Debug, Default)]
pub struct Channel {
    pub(crate) pin: PinBinding,
    pub(crate) task: bool,
    pub(crate) infinite: bool,
    pub(crate) toggles_total: u32,
    pub(crate) toggles_remaining: u32,
    pub(crate) toggles_dir: bool,
    pub(crate) setup_ticks: u32,
    pub(crate) hold_ticks: u32,
    pub(crate) due_tick: u64,
    pub(crate) abort_on_setup: bool,
    pub(crate) abort_on_hold: bool,
    pub(crate) cnt: i32,
    pub(crate) tasks_done: u32,
    pub(crate) fifo: Fifo,
}

impl Channel {
    pub const fn new() -> Self {
        Self {
            pin: PinBinding {
                port: 0,
                mask: 0,
                mask_complement: u32::MAX,
                inverted: false,
            },
            task: false,
            infinite: false,
            toggles_total: 0,
            toggles_remaining: 0,
            toggles_dir: false,
            setup_ticks: 0,
            hold_ticks: 0,
            due_tick: 0,
            abort_on_setup: false,
            abort_on_hold: false,
            cnt: 0,
            tasks_done: 0,
            fifo: Fifo::new(),
        }
    }
}
