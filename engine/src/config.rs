//! Compile-time constants for the pulse-generation engine.

/// Number of channels. Channel ids are in `[0, CH_CNT)`.
pub const CH_CNT: usize = 8;

/// Per-channel FIFO depth (queued follow-on tasks, excluding the active one).
pub const FIFO_SIZE: usize = 4;

/// Hardware timer frequency, in MHz. Nanosecond-to-tick conversion is
/// `ns * TIMER_FREQUENCY_MHZ / 1000` with 64-bit intermediates.
pub const TIMER_FREQUENCY_MHZ: u64 = 24;
