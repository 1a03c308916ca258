//! Length determinant (X.691 §10.9)

use crate::cursor::BitCursor;
use per_core::{PerError, PerResult};

/// Largest length the two-octet form can carry
pub const MAX_LONG_FORM_LENGTH: u64 = 16383;

/// Decode an unconstrained length determinant.
///
/// The determinant is octet-aligned:
/// - `0xxxxxxx`: lengths 0..=127 in one octet
/// - `10xxxxxx xxxxxxxx`: lengths 0..=16383 in 14 bits
/// - `11xxxxxx`: fragmented form for larger lengths, not supported
pub fn decode_length_determinant(cursor: &mut BitCursor<'_>) -> PerResult<u64> {
    cursor.align_to_byte();
    let first = cursor.read_bits(8)?;
    if first & 0x80 == 0 {
        return Ok(first);
    }
    if first & 0x40 == 0 {
        let second = cursor.read_bits(8)?;
        return Ok(((first & 0x3F) << 8) | second);
    }
    log::warn!(
        "fragmented length determinant at bit {}",
        cursor.bit_offset() - 8
    );
    Err(PerError::Unsupported(format!(
        "fragmented length determinant (0x{:02X}), lengths above {} are not supported",
        first, MAX_LONG_FORM_LENGTH
    )))
}
