//! The Message Adapter's only error conditions. The engine never panics and
//! has no recoverable/fatal split; these are dispatch-time sentinels, not
//! exceptions.

/// Why a message was not handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterError {
    /// No handler is registered for this message code.
    Unhandled,
    /// The payload was shorter than the handler requires.
    PayloadTooShort,
}
