//! [`engine::MessageTransport`] over USB serial.
//!
//! Bytes cross the IRQ boundary through a pair of `embassy_sync::channel::
//! Channel`s, the same static-channel pattern the other half of the board
//! uses to hand events to the layout handler: a USB task owns one end of
//! each, `base_thread()` owns the other, and nothing but a non-blocking
//! `try_receive`/`try_send` ever runs off the main loop.
//!
//! Wire framing is `[code: u8][length: u8][payload: length bytes]`.

use embassy_sync::blocking_mutex::raw::ThreadModeRawMutex;
use embassy_sync::channel::{Channel, Receiver, Sender, TryReceiveError};
use engine::message::MAX_PAYLOAD_BYTES;

pub const QUEUE_CAPACITY: usize = 128;
pub type ByteChannel = Channel<ThreadModeRawMutex, u8, QUEUE_CAPACITY>;

enum FrameState {
    Code,
    Length {
        code: u8,
    },
    Payload {
        code: u8,
        length: u8,
        filled: usize,
        buf: [u8; MAX_PAYLOAD_BYTES],
    },
}

/// The main-loop side of the USB serial transport.
pub struct UsbTransport<'q> {
    rx: Receiver<'q, ThreadModeRawMutex, u8, QUEUE_CAPACITY>,
    tx: Sender<'q, ThreadModeRawMutex, u8, QUEUE_CAPACITY>,
    state: FrameState,
}

impl<'q> UsbTransport<'q> {
    pub fn new(
        rx: Receiver<'q, ThreadModeRawMutex, u8, QUEUE_CAPACITY>,
        tx: Sender<'q, ThreadModeRawMutex, u8, QUEUE_CAPACITY>,
    ) -> Self {
        Self {
            rx,
            tx,
            state: FrameState::Code,
        }
    }
}

impl<'q> engine::MessageTransport for UsbTransport<'q> {
    fn try_recv(&mut self) -> Option<(u8, [u8; MAX_PAYLOAD_BYTES], u8)> {
        loop {
            let byte = match self.rx.try_receive() {
                Ok(b) => b,
                Err(TryReceiveError::Empty) => return None,
            };
            self.state = match core::mem::replace(&mut self.state, FrameState::Code) {
                FrameState::Code => FrameState::Length { code: byte },
                FrameState::Length { code } => {
                    if byte == 0 {
                        return Some((code, [0; MAX_PAYLOAD_BYTES], 0));
                    }
                    FrameState::Payload {
                        code,
                        length: byte,
                        filled: 0,
                        buf: [0; MAX_PAYLOAD_BYTES],
                    }
                }
                FrameState::Payload {
                    code,
                    length,
                    mut filled,
                    mut buf,
                } => {
                    if filled < MAX_PAYLOAD_BYTES {
                        buf[filled] = byte;
                    }
                    filled += 1;
                    if filled >= length as usize {
                        return Some((code, buf, length));
                    }
                    FrameState::Payload {
                        code,
                        length,
                        filled,
                        buf,
                    }
                }
            };
        }
    }

    fn send(&mut self, code: u8, payload: &[u8]) {
        let length = payload.len().min(MAX_PAYLOAD_BYTES) as u8;
        if self.tx.try_send(code).is_err() {
            return;
        }
        if self.tx.try_send(length).is_err() {
            return;
        }
        for &b in &payload[..length as usize] {
            if self.tx.try_send(b).is_err() {
                break;
            }
        }
    }
}
