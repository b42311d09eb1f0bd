//! The Message Adapter's dispatch table (component G): maps inbound
//! request codes to engine operations.

/// Raw payload capacity: ten little-endian `u32` fields.
pub const MAX_PAYLOAD_BYTES: usize = utils::wire::PAYLOAD_FIELDS * 4;

/// A transport that delivers byte-tagged request/response messages.
///
/// If the host routes delivery through an interrupt, the transport's
/// `try_recv` must be backed by a queue drained only from `base_thread()`.
/// The adapter never mutates channel state from interrupt context.
pub trait MessageTransport {
    /// Poll for one inbound message without blocking. Returns the message
    /// type, its raw payload bytes, and the payload length.
    fn try_recv(&mut self) -> Option<(u8, [u8; MAX_PAYLOAD_BYTES], u8)>;

    /// Send a reply for `code`.
    fn send(&mut self, code: u8, payload: &[u8]);
}

/// One row of the dispatch table, in wire order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MessageCode {
    PinSetup = 0,
    TaskAdd = 1,
    Abort = 2,
    StateGet = 3,
    TaskTogglesGet = 4,
    CntGet = 5,
    CntSet = 6,
    TasksDoneGet = 7,
    TasksDoneSet = 8,
    WatchdogSetup = 9,
}

impl MessageCode {
    /// Decode a raw message type byte. `None` for any code this module
    /// doesn't register a handler for.
    pub fn from_u8(code: u8) -> Option<Self> {
        Some(match code {
            0 => Self::PinSetup,
            1 => Self::TaskAdd,
            2 => Self::Abort,
            3 => Self::StateGet,
            4 => Self::TaskTogglesGet,
            5 => Self::CntGet,
            6 => Self::CntSet,
            7 => Self::TasksDoneGet,
            8 => Self::TasksDoneSet,
            9 => Self::WatchdogSetup,
            _ => return None,
        })
    }
}
