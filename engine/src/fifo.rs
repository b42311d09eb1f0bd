//! Per-channel FIFO of queued follow-on tasks.

use crate::config::FIFO_SIZE;

/// The parameters of one queued (or active) task, as carried by a FIFO slot.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TaskSpec {
    /// `false` increments the step counter at retirement, `true` decrements it.
    pub toggles_dir: bool,
    /// Number of pin toggles; `0` means run forever (infinite task).
    pub toggles: u32,
    /// Duration of the inactive half, in nanoseconds.
    pub setup_ns: u32,
    /// Duration of the active half, in nanoseconds.
    pub hold_ns: u32,
    /// Delay before the first edge, in nanoseconds.
    pub start_delay_ns: u32,
}

#[derive(Debug, Default, Clone, Copy)]
struct Slot {
    used: bool,
    spec: TaskSpec,
}

/// Fixed-capacity ring of queued tasks for one channel. The slot at `head`
/// is the currently-active task (marked `used` for as long as it is live);
/// `enqueue` never touches it, by scanning from `head + 1`.
#[derive(Debug)]
pub struct Fifo {
    slots: [Slot; FIFO_SIZE],
    head: usize,
}

impl Fifo {
    /// An empty FIFO with the head at slot 0.
    pub const fn new() -> Self {
        Self {
            slots: [Slot {
                used: false,
                spec: TaskSpec {
                    toggles_dir: false,
                    toggles: 0,
                    setup_ns: 0,
                    hold_ns: 0,
                    start_delay_ns: 0,
                },
            }; FIFO_SIZE],
            head: 0,
        }
    }

    /// Whether the head slot currently holds a live task.
    pub fn head_used(&self) -> bool {
        self.slots[self.head].used
    }

    /// Mark the head slot used, installing `spec` as the active task's
    /// FIFO-visible record. Called when a task is installed directly (the
    /// channel was idle).
    pub fn install_head(&mut self, spec: TaskSpec) {
        self.slots[self.head] = Slot { used: true, spec };
    }

    /// Enqueue a follow-on task. Scans slots starting at `head + 1` (mod
    /// `FIFO_SIZE`) for the first free slot. Returns `false` (request
    /// silently dropped) if every slot is occupied.
    pub fn enqueue(&mut self, spec: TaskSpec) -> bool {
        let mut pos = (self.head + 1) % FIFO_SIZE;
        for _ in 0..FIFO_SIZE {
            if !self.slots[pos].used {
                self.slots[pos] = Slot { used: true, spec };
                return true;
            }
            pos = (pos + 1) % FIFO_SIZE;
        }
        false
    }

    /// Retire the head slot and advance. Returns the next task's spec if the
    /// new head is already `used` (a queued follow-on task was waiting),
    /// or `None` if the channel should go idle.
    pub fn advance(&mut self) -> Option<TaskSpec> {
        self.slots[self.head].used = false;
        self.head = (self.head + 1) % FIFO_SIZE;
        if self.slots[self.head].used {
            Some(self.slots[self.head].spec)
        } else {
            None
        }
    }

    /// Release every slot (used by immediate abort).
    pub fn clear(&mut self) {
        for slot in self.slots.iter_mut() {
            slot.used = false;
        }
    }
}

impl Default for Fifo {
    fn default() -> Self {
        Self::new()
    }
}
