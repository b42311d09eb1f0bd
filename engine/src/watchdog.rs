//! Global watchdog: a single deadline that aborts every active channel when
//! missed.

use crate::tick::ns_to_ticks_u64;
use utils::log::info;

/// Tracks the watchdog's configured interval and absolute deadline.
///
/// Unlike the original firmware, whose expired deadline re-fires every
/// subsequent pass, an expired watchdog disarms itself the moment it fires.
#[derive(Debug, Default)]
pub struct Watchdog {
    ticks: u64,
    /// Absolute tick at which the watchdog fires. `0` means disarmed.
    deadline: u64,
}

impl Watchdog {
    pub const fn new() -> Self {
        Self {
            ticks: 0,
            deadline: 0,
        }
    }

    /// `enable == false` disarms; otherwise arms for `time_ns` from `now`.
    pub fn setup(&mut self, enable: bool, time_ns: u32, now: u64) {
        if !enable {
            self.deadline = 0;
            info!("watchdog disarmed");
            return;
        }
        self.ticks = ns_to_ticks_u64(time_ns);
        self.deadline = now + self.ticks;
        info!("watchdog armed, deadline in {} ticks", self.ticks);
    }

    /// Refresh the deadline on any inbound message, iff currently armed.
    pub fn refresh(&mut self, now: u64) {
        if self.deadline != 0 {
            self.deadline = now + self.ticks;
        }
    }

    /// Check whether `now` has passed the deadline. If so, disarms and
    /// returns `true` (fires exactly once per arm).
    pub fn check_and_disarm(&mut self, now: u64) -> bool {
        if self.deadline != 0 && now > self.deadline {
            self.deadline = 0;
            info!("watchdog fired, aborting all channels");
            true
        } else {
            false
        }
    }
}
