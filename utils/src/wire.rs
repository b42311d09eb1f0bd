//! Message payload wire format: little-endian, 4-byte-aligned `u32` fields.

/// Number of `u32` fields carried by every pulsgen message payload.
pub const PAYLOAD_FIELDS: usize = 10;

/// A decoded message payload: up to [`PAYLOAD_FIELDS`] little-endian `u32`s.
pub type Payload = [u32; PAYLOAD_FIELDS];

/// Decode a raw byte payload into a fixed array of little-endian `u32` fields.
///
/// `length` is the number of *bytes* actually delivered by the transport.
/// Fields beyond `length / 4` are zero-filled. Returns the number of fields
/// that were actually populated from `bytes`.
pub fn decode(bytes: &[u8], length: u8) -> (Payload, usize) {
    let mut payload = [0u32; PAYLOAD_FIELDS];
    let usable = (length as usize).min(bytes.len());
    let fields = usable / 4;
    for (i, chunk) in bytes[..usable].chunks_exact(4).take(PAYLOAD_FIELDS).enumerate() {
        payload[i] = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }
    (payload, fields.min(PAYLOAD_FIELDS))
}

/// Encode up to [`PAYLOAD_FIELDS`] little-endian `u32`s into a reply buffer.
///
/// Returns the number of bytes written (always `fields.len() * 4`).
pub fn encode(fields: &[u32], out: &mut [u8]) -> usize {
    let mut written = 0;
    for v in fields {
        let le = v.to_le_bytes();
        out[written..written + 4].copy_from_slice(&le);
        written += 4;
    }
    written
}
