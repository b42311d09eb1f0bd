#![cfg_attr(not(target_arch = "x86_64"), no_std)]

/// Dual `defmt`/`log` logging macros, shared by `engine` and `firmware`
pub mod log;

/// Little-endian `u32` payload decoding shared by the message adapter
pub mod wire;
