#![no_std]
//! Pure pulse-generation core: no hardware access, no allocation, no
//! async/await. A host binary composes this with concrete [`gpio::GpioSink`],
//! [`tick::TickSource`], and [`message::MessageTransport`] implementations.

pub mod channel;
pub mod config;
pub mod engine;
pub mod error;
pub mod fifo;
pub mod gpio;
pub mod message;
pub mod stats;
pub mod tick;
pub mod watchdog;

pub use engine::Engine;
pub use error::AdapterError;
pub use fifo::TaskSpec;
pub use gpio::{GpioSink, MockGpio};
pub use message::{MessageCode, MessageTransport, MAX_PAYLOAD_BYTES};
pub use stats::Stats;
pub use tick::{TickExtender, TickSource};
pub use watchdog::Watchdog;
