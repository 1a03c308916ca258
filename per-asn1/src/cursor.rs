//! Bit cursor over an immutable octet buffer
//!
//! Every PER decoder reads through a [`BitCursor`]. Bits are numbered
//! MSB-first within each octet, matching X.691. The cursor only moves
//! forward; each decoder leaves it at the first bit after what it consumed,
//! and callers always continue from there.

use per_core::{PerError, PerResult};

/// Byte buffer plus a bit position
///
/// Invariant: `0 <= bit_offset <= end <= buffer.len() * 8`, with `end` a
/// multiple of 8. `end` is the whole buffer except while an open type is
/// being decoded, when it is narrowed to the open type's extent.
#[derive(Debug, Clone)]
pub struct BitCursor<'a> {
    buffer: &'a [u8],
    bit_offset: u64,
    end: u64,
}

impl<'a> BitCursor<'a> {
    /// Create a cursor at bit 0 of `buffer`
    pub fn new(buffer: &'a [u8]) -> Self {
        Self {
            buffer,
            bit_offset: 0,
            end: buffer.len() as u64 * 8,
        }
    }

    /// Current position in bits from the start of the buffer
    pub fn bit_offset(&self) -> u64 {
        self.bit_offset
    }

    /// Bits left before the current limit
    pub fn bits_remaining(&self) -> u64 {
        self.end - self.bit_offset
    }

    /// Whether the cursor sits on an octet boundary
    pub fn is_aligned(&self) -> bool {
        self.bit_offset % 8 == 0
    }

    /// The underlying buffer
    pub fn buffer(&self) -> &'a [u8] {
        self.buffer
    }

    fn ensure(&self, bits: u64) -> PerResult<()> {
        let available = self.bits_remaining();
        if bits > available {
            return Err(PerError::truncated(bits, available));
        }
        Ok(())
    }

    /// Read one bit and advance by 1
    pub fn read_bit(&mut self) -> PerResult<bool> {
        self.ensure(1)?;
        let byte = self.buffer[(self.bit_offset / 8) as usize];
        let bit = (byte >> (7 - (self.bit_offset % 8))) & 1 == 1;
        self.bit_offset += 1;
        Ok(bit)
    }

    /// Read `count` bits (at most 64) as an unsigned big-endian number,
    /// without alignment
    pub fn read_bits(&mut self, count: u32) -> PerResult<u64> {
        if count > 64 {
            return Err(PerError::Malformed(format!(
                "cannot read {} bits into a 64-bit value",
                count
            )));
        }
        self.ensure(u64::from(count))?;

        let mut value: u64 = 0;
        let mut left = count;
        while left > 0 {
            let byte = self.buffer[(self.bit_offset / 8) as usize];
            let used = (self.bit_offset % 8) as u32;
            let available = 8 - used;
            let take = available.min(left);
            let chunk = (u64::from(byte) >> (available - take)) & ((1u64 << take) - 1);
            // take == 64 cannot happen, chunks are at most 8 bits
            value = (value << take) | chunk;
            self.bit_offset += u64::from(take);
            left -= take;
        }
        Ok(value)
    }

    /// Advance to the next octet boundary; no-op when already aligned
    pub fn align_to_byte(&mut self) {
        let misalignment = self.bit_offset % 8;
        if misalignment != 0 {
            // end is a multiple of 8 and bit_offset <= end, so this stays in bounds
            self.bit_offset += 8 - misalignment;
        }
    }

    /// Read `count` octets at an aligned position
    ///
    /// The cursor must already be aligned; byte-level reads always follow
    /// an explicit [`align_to_byte`](Self::align_to_byte).
    pub fn read_bytes(&mut self, count: u64) -> PerResult<&'a [u8]> {
        if !self.is_aligned() {
            return Err(PerError::Malformed(format!(
                "octet read at unaligned bit offset {}",
                self.bit_offset
            )));
        }
        let bits = count
            .checked_mul(8)
            .ok_or_else(|| PerError::Overflow(format!("octet count {} too large", count)))?;
        self.ensure(bits)?;
        let start = (self.bit_offset / 8) as usize;
        let end = start + count as usize;
        self.bit_offset += bits;
        Ok(&self.buffer[start..end])
    }

    /// Read `count` octets starting at any bit position
    pub fn read_unaligned_octets(&mut self, count: u64) -> PerResult<Vec<u8>> {
        if self.is_aligned() {
            return self.read_bytes(count).map(<[u8]>::to_vec);
        }
        let bits = count
            .checked_mul(8)
            .ok_or_else(|| PerError::Overflow(format!("octet count {} too large", count)))?;
        self.ensure(bits)?;
        let mut out = Vec::with_capacity(count as usize);
        for _ in 0..count {
            out.push(self.read_bits(8)? as u8);
        }
        Ok(out)
    }

    /// Skip `count` bits
    pub fn skip_bits(&mut self, count: u64) -> PerResult<()> {
        self.ensure(count)?;
        self.bit_offset += count;
        Ok(())
    }

    /// Current limit in bits
    pub(crate) fn end(&self) -> u64 {
        self.end
    }

    /// Narrow the limit to `end`, returning the previous limit for
    /// [`restore_end`](Self::restore_end)
    pub(crate) fn narrow_end(&mut self, end: u64) -> PerResult<u64> {
        if end < self.bit_offset || end > self.end || end % 8 != 0 {
            return Err(PerError::Malformed(format!(
                "open type end {} outside [{}, {}]",
                end, self.bit_offset, self.end
            )));
        }
        Ok(std::mem::replace(&mut self.end, end))
    }

    pub(crate) fn restore_end(&mut self, end: u64) {
        debug_assert!(end >= self.end && end <= self.buffer.len() as u64 * 8);
        self.end = end;
    }

    /// Move forward to `target`; used to land exactly on the end of an open type
    pub(crate) fn advance_to(&mut self, target: u64) -> PerResult<()> {
        if target < self.bit_offset {
            return Err(PerError::Malformed(format!(
                "cursor would move backward from {} to {}",
                self.bit_offset, target
            )));
        }
        self.skip_bits(target - self.bit_offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_bit_msb_first() {
        let data = [0b1010_0000];
        let mut cursor = BitCursor::new(&data);
        assert!(cursor.read_bit().unwrap());
        assert!(!cursor.read_bit().unwrap());
        assert!(cursor.read_bit().unwrap());
        assert_eq!(cursor.bit_offset(), 3);
        assert_eq!(cursor.bits_remaining(), 5);
    }

    #[test]
    fn test_read_bits_across_octets() {
        let data = [0b0000_0111, 0b1010_0000];
        let mut cursor = BitCursor::new(&data);
        cursor.skip_bits(5).unwrap();
        assert_eq!(cursor.read_bits(6).unwrap(), 0b111101);
        assert_eq!(cursor.bit_offset(), 11);
        assert_eq!(cursor.read_bits(0).unwrap(), 0);
    }

    #[test]
    fn test_read_bits_full_width() {
        let data = [0xFF; 9];
        let mut cursor = BitCursor::new(&data);
        cursor.skip_bits(3).unwrap();
        assert_eq!(cursor.read_bits(64).unwrap(), u64::MAX);
        assert!(cursor.read_bits(65).is_err());
    }

    #[test]
    fn test_align_is_forward_only() {
        let data = [0u8; 2];
        let mut cursor = BitCursor::new(&data);
        cursor.align_to_byte();
        assert_eq!(cursor.bit_offset(), 0);
        cursor.skip_bits(1).unwrap();
        cursor.align_to_byte();
        assert_eq!(cursor.bit_offset(), 8);
        cursor.align_to_byte();
        assert_eq!(cursor.bit_offset(), 8);
    }

    #[test]
    fn test_read_bytes_requires_alignment() {
        let data = [1, 2, 3];
        let mut cursor = BitCursor::new(&data);
        assert_eq!(cursor.read_bytes(2).unwrap(), &[1, 2]);
        cursor.skip_bits(1).unwrap();
        assert!(matches!(cursor.read_bytes(1), Err(PerError::Malformed(_))));
    }

    #[test]
    fn test_truncation_is_an_error() {
        let data = [0xAB];
        let mut cursor = BitCursor::new(&data);
        assert_eq!(
            cursor.read_bytes(2),
            Err(PerError::Truncated { needed: 16, available: 8 })
        );
        assert_eq!(cursor.bit_offset(), 0);
        cursor.skip_bits(8).unwrap();
        assert!(cursor.read_bit().unwrap_err().is_truncated());

        let mut empty = BitCursor::new(&[]);
        assert!(empty.read_bit().is_err());
        empty.align_to_byte();
        assert_eq!(empty.bit_offset(), 0);
    }

    #[test]
    fn test_unaligned_octets() {
        let data = [0b1000_0001, 0b0000_0000];
        let mut cursor = BitCursor::new(&data);
        cursor.skip_bits(1).unwrap();
        assert_eq!(cursor.read_unaligned_octets(1).unwrap(), vec![0x02]);
        assert_eq!(cursor.bit_offset(), 9);
    }

    #[test]
    fn test_narrowed_limit() {
        let data = [0xFF, 0xFF, 0xFF];
        let mut cursor = BitCursor::new(&data);
        cursor.skip_bits(8).unwrap();
        let saved = cursor.narrow_end(16).unwrap();
        assert_eq!(cursor.bits_remaining(), 8);
        assert!(cursor.read_bits(9).unwrap_err().is_truncated());
        cursor.restore_end(saved);
        assert_eq!(cursor.bits_remaining(), 16);
        assert!(cursor.narrow_end(4).is_err());
        assert!(cursor.narrow_end(32).is_err());
    }
}
