//! Read-only, observational counters. Not part of the wire protocol, just a
//! debug aid, the way real firmware keeps a few free-running counters even
//! when nothing downstream asked for them.

/// Aggregate engine activity since `Engine::new()`.
#[derive(Debug, Default, Clone, Copy)]
pub struct Stats {
    /// Total edges committed across every channel.
    pub edges_committed: u64,
    /// Total tasks retired (toggles exhausted, not aborted).
    pub tasks_retired: u64,
    /// Number of times the watchdog has fired.
    pub watchdog_trips: u32,
}
