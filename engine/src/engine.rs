//! The scheduler: the base-thread loop, task installation, aborts, and the
//! Message Adapter dispatch. This ties components A–G together.

use crate::channel::{Channel, PinBinding};
use crate::config::CH_CNT;
use crate::error::AdapterError;
use crate::fifo::TaskSpec;
use crate::gpio::GpioSink;
use crate::message::MessageCode;
use crate::stats::Stats;
use crate::tick::{ns_to_ticks_u32, TickSource};
use crate::watchdog::Watchdog;
use utils::log::warn;
use utils::wire;

/// The pulse-generation engine: `CH_CNT` channels, the FIFO each one owns,
/// the watchdog, and the last observed tick. Owned by a single logical
/// executor, the host's main loop.
pub struct Engine {
    channels: [Channel; CH_CNT],
    max_id: usize,
    tick: u64,
    watchdog: Watchdog,
    stats: Stats,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// Construct the engine: every channel idle, empty FIFOs, watchdog
    /// disarmed. Call [`Engine::init`] once before the first
    /// [`Engine::base_thread`].
    pub fn new() -> Self {
        Self {
            channels: core::array::from_fn(|_| Channel::new()),
            max_id: 0,
            tick: 0,
            watchdog: Watchdog::new(),
            stats: Stats::default(),
        }
    }

    /// Start the tick source. Call once, before the first `base_thread()`.
    pub fn init<T: TickSource>(&mut self, tick_source: &mut T) {
        tick_source.start();
    }

    /// One scheduler pass. Reads the current tick, checks the watchdog,
    /// then scans channels from `max_id` down to `0`, committing at most
    /// one edge per active channel.
    pub fn base_thread<G: GpioSink, T: TickSource>(&mut self, gpio: &mut G, tick_source: &mut T) {
        self.tick = tick_source.tick_now();
        let abort_all = self.watchdog.check_and_disarm(self.tick);
        if abort_all {
            self.stats.watchdog_trips += 1;
        }

        let mut c = self.max_id;
        loop {
            if self.channels[c].task {
                if abort_all {
                    self.force_abort(c);
                } else if self.tick >= self.channels[c].due_tick {
                    self.service_channel(gpio, c);
                }
            }
            if c == 0 {
                break;
            }
            c -= 1;
        }
    }

    fn service_channel<G: GpioSink>(&mut self, gpio: &mut G, c: usize) {
        let ch = &self.channels[c];
        if ch.toggles_remaining == 0 && !ch.infinite {
            self.retire(c);
        } else {
            self.commit_edge(gpio, c);
        }
    }

    fn retire(&mut self, c: usize) {
        self.channels[c].tasks_done = self.channels[c].tasks_done.wrapping_add(1);
        self.stats.tasks_retired += 1;
        match self.channels[c].fifo.advance() {
            Some(spec) => self.install_task(c, spec),
            None => {
                self.channels[c].task = false;
                if self.max_id != 0 && c == self.max_id {
                    self.max_id -= 1;
                }
            }
        }
    }

    fn commit_edge<G: GpioSink>(&mut self, gpio: &mut G, c: usize) {
        let pin = self.channels[c].pin;
        let raw_high = gpio.get(pin.port, pin.mask) != 0;
        let active = raw_high ^ pin.inverted;

        if active {
            gpio.clear(pin.port, pin.mask_complement);
            if self.channels[c].abort_on_setup {
                self.force_abort(c);
            } else {
                self.channels[c].due_tick += self.channels[c].setup_ticks as u64;
            }
        } else {
            gpio.set(pin.port, pin.mask);
            if self.channels[c].abort_on_hold {
                self.force_abort(c);
            } else {
                self.channels[c].due_tick += self.channels[c].hold_ticks as u64;
            }
        }

        self.channels[c].toggles_remaining = self.channels[c].toggles_remaining.wrapping_sub(1);
        let delta: i32 = if self.channels[c].toggles_dir { -1 } else { 1 };
        self.channels[c].cnt = self.channels[c].cnt.wrapping_add(delta);
        self.stats.edges_committed += 1;
    }

    /// Install `spec` as the active task on channel `c`: resets toggle
    /// counters and abort latches, converts durations to ticks, and sets
    /// `due_tick` relative to the last observed tick. Used both for a
    /// freshly-enqueued task on an idle channel and for a FIFO successor
    /// taking over from a just-retired task.
    fn install_task(&mut self, c: usize, spec: TaskSpec) {
        if c > self.max_id {
            self.max_id = c;
        }
        let toggles_total = if spec.toggles == 0 { u32::MAX } else { spec.toggles };
        let ch = &mut self.channels[c];
        ch.task = true;
        ch.infinite = spec.toggles == 0;
        ch.toggles_dir = spec.toggles_dir;
        ch.toggles_total = toggles_total;
        ch.toggles_remaining = toggles_total;
        ch.abort_on_setup = false;
        ch.abort_on_hold = false;
        ch.setup_ticks = ns_to_ticks_u32(spec.setup_ns);
        ch.hold_ticks = ns_to_ticks_u32(spec.hold_ns);
        ch.due_tick = self.tick + crate::tick::ns_to_ticks_u64(spec.start_delay_ns);
    }

    /// Clear latches, mark the channel idle, and wipe every FIFO slot.
    /// Unlike [`Engine::retire`], this drops any queued follow-on tasks.
    fn force_abort(&mut self, c: usize) {
        let ch = &mut self.channels[c];
        ch.abort_on_setup = false;
        ch.abort_on_hold = false;
        ch.task = false;
        ch.fifo.clear();
        if self.max_id != 0 && c == self.max_id {
            self.max_id -= 1;
        }
    }

    /// Configure the GPIO pin a channel drives and set its initial level.
    pub fn pin_setup<G: GpioSink>(&mut self, gpio: &mut G, c: u8, port: u8, pin: u8, inverted: bool) {
        gpio.configure_output(port, pin);
        let mask = 1u32 << pin;
        let binding = PinBinding {
            port,
            mask,
            mask_complement: !mask,
            inverted,
        };
        self.channels[c as usize].pin = binding;
        if inverted {
            gpio.set(port, mask);
        } else {
            gpio.clear(port, !mask);
        }
    }

    /// Enqueue a task. Installs immediately on an idle channel, otherwise
    /// queues it in the channel's FIFO (silently dropped if full).
    pub fn task_add(&mut self, c: u8, spec: TaskSpec) {
        let c = c as usize;
        if self.channels[c].task {
            if !self.channels[c].fifo.enqueue(spec) {
                warn!("pulsgen: fifo full on channel, dropping task");
            }
        } else {
            self.channels[c].fifo.install_head(spec);
            self.install_task(c, spec);
        }
    }

    /// Deferred or immediate abort, depending on the channel's current pin
    /// polarity relative to `on_hold`.
    pub fn abort<G: GpioSink>(&mut self, gpio: &mut G, c: u8, on_hold: bool) {
        let c = c as usize;
        let pin = self.channels[c].pin;
        let raw_high = gpio.get(pin.port, pin.mask) != 0;
        let active = raw_high ^ pin.inverted;

        if active == on_hold {
            self.force_abort(c);
            return;
        }

        if on_hold {
            self.channels[c].abort_on_hold = true;
        } else {
            self.channels[c].abort_on_setup = true;
        }
    }

    /// Whether channel `c` currently has an active task.
    pub fn state(&self, c: u8) -> bool {
        self.channels[c as usize].task
    }

    /// Pin state changes committed since the active task started.
    pub fn task_toggles(&self, c: u8) -> u32 {
        let ch = &self.channels[c as usize];
        ch.toggles_total.wrapping_sub(ch.toggles_remaining)
    }

    /// Signed step count accumulated across retired tasks.
    pub fn cnt(&self, c: u8) -> i32 {
        self.channels[c as usize].cnt
    }

    /// Overwrite the step counter.
    pub fn cnt_set(&mut self, c: u8, value: i32) {
        self.channels[c as usize].cnt = value;
    }

    /// Number of tasks this channel has retired.
    pub fn tasks_done(&self, c: u8) -> u32 {
        self.channels[c as usize].tasks_done
    }

    /// Overwrite the completed-tasks counter.
    pub fn tasks_done_set(&mut self, c: u8, value: u32) {
        self.channels[c as usize].tasks_done = value;
    }

    /// Arm or disarm the global watchdog.
    pub fn watchdog_setup(&mut self, enable: bool, time_ns: u32) {
        self.watchdog.setup(enable, time_ns, self.tick);
    }

    /// The last tick observed by `base_thread()`.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Observational counters; not part of the wire protocol.
    pub fn stats(&self) -> Stats {
        self.stats
    }

    /// Decode and dispatch one inbound message (component G). Refreshes the
    /// watchdog deadline first, as every receive path must, whether or not
    /// the code is recognized.
    pub fn handle_message<G: GpioSink>(
        &mut self,
        gpio: &mut G,
        code: u8,
        bytes: &[u8],
        length: u8,
    ) -> Result<Option<[u8; 4]>, AdapterError> {
        self.watchdog.refresh(self.tick);

        let code = MessageCode::from_u8(code).ok_or(AdapterError::Unhandled)?;
        let (payload, fields) = wire::decode(bytes, length);
        if fields < required_fields(code) {
            warn!("pulsgen: message payload too short");
            return Err(AdapterError::PayloadTooShort);
        }

        let reply = |v: u32| {
            let mut out = [0u8; 4];
            wire::encode(&[v], &mut out);
            out
        };

        match code {
            MessageCode::PinSetup => {
                self.pin_setup(
                    gpio,
                    payload[0] as u8,
                    payload[1] as u8,
                    payload[2] as u8,
                    payload[3] != 0,
                );
                Ok(None)
            }
            MessageCode::TaskAdd => {
                self.task_add(
                    payload[0] as u8,
                    TaskSpec {
                        toggles_dir: payload[1] != 0,
                        toggles: payload[2],
                        setup_ns: payload[3],
                        hold_ns: payload[4],
                        start_delay_ns: payload[5],
                    },
                );
                Ok(None)
            }
            MessageCode::Abort => {
                self.abort(gpio, payload[0] as u8, payload[1] != 0);
                Ok(None)
            }
            MessageCode::StateGet => Ok(Some(reply(self.state(payload[0] as u8) as u32))),
            MessageCode::TaskTogglesGet => {
                Ok(Some(reply(self.task_toggles(payload[0] as u8))))
            }
            MessageCode::CntGet => Ok(Some(reply(self.cnt(payload[0] as u8) as u32))),
            MessageCode::CntSet => {
                self.cnt_set(payload[0] as u8, payload[1] as i32);
                Ok(None)
            }
            MessageCode::TasksDoneGet => Ok(Some(reply(self.tasks_done(payload[0] as u8)))),
            MessageCode::TasksDoneSet => {
                self.tasks_done_set(payload[0] as u8, payload[1]);
                Ok(None)
            }
            MessageCode::WatchdogSetup => {
                self.watchdog_setup(payload[0] != 0, payload[1]);
                Ok(None)
            }
        }
    }
}

fn required_fields(code: MessageCode) -> usize {
    match code {
        MessageCode::PinSetup => 4,
        MessageCode::TaskAdd => 6,
        MessageCode::Abort => 2,
        MessageCode::StateGet => 1,
        MessageCode::TaskTogglesGet => 1,
        MessageCode::CntGet => 1,
        MessageCode::CntSet => 2,
        MessageCode::TasksDoneGet => 1,
        MessageCode::TasksDoneSet => 2,
        MessageCode::WatchdogSetup => 2,
    }
}
