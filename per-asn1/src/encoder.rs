//! Aligned PER encoder
//!
//! [`PerEncoder`] writes the same forms the decoders read. It exists so
//! test suites and tools can build wire data from values instead of
//! hand-assembled bit patterns; every method mirrors a decoder of the same
//! name.
//!
//! # Usage Example
//!
//! ```rust,no_run
//! use per_asn1::PerEncoder;
//!
//! let mut encoder = PerEncoder::new();
//! encoder.encode_boolean(true);
//! encoder.encode_constrained_integer(5, 0, Some(7))?;
//! assert_eq!(encoder.into_bytes(), vec![0b1101_0000]);
//! # Ok::<(), per_core::PerError>(())
//! ```

use crate::integer::{range_of, IntegerWidth};
use crate::length::MAX_LONG_FORM_LENGTH;
use crate::primitive::{CharacterMapping, CharacterStringKind, EnumeratedValue, SIXTY_FOUR_K};
use per_core::{BitString, ObjectIdentifier, PerError, PerResult};

/// Bit writer producing aligned PER
///
/// Bits are appended MSB-first; the final octet is zero-padded.
#[derive(Debug, Clone, Default)]
pub struct PerEncoder {
    buffer: Vec<u8>,
    bit_len: u64,
}

impl PerEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
            bit_len: 0,
        }
    }

    /// Number of bits written so far
    pub fn bit_len(&self) -> u64 {
        self.bit_len
    }

    pub fn is_aligned(&self) -> bool {
        self.bit_len % 8 == 0
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }

    pub fn write_bit(&mut self, bit: bool) {
        let used = (self.bit_len % 8) as u8;
        if used == 0 {
            self.buffer.push(0);
        }
        if bit {
            if let Some(last) = self.buffer.last_mut() {
                *last |= 0x80 >> used;
            }
        }
        self.bit_len += 1;
    }

    /// Write the low `count` bits of `value`, most significant first
    pub fn write_bits(&mut self, value: u64, count: u32) {
        for i in (0..count.min(64)).rev() {
            self.write_bit((value >> i) & 1 == 1);
        }
    }

    /// Pad with zero bits up to the next octet boundary
    pub fn align_to_byte(&mut self) {
        self.bit_len = self.buffer.len() as u64 * 8;
    }

    /// Align, then append whole octets
    pub fn write_bytes_aligned(&mut self, bytes: &[u8]) {
        self.align_to_byte();
        self.buffer.extend_from_slice(bytes);
        self.bit_len += bytes.len() as u64 * 8;
    }

    /// Append octets at the current bit position
    pub fn write_unaligned_octets(&mut self, bytes: &[u8]) {
        if self.is_aligned() {
            self.write_bytes_aligned(bytes);
            return;
        }
        for &byte in bytes {
            self.write_bits(u64::from(byte), 8);
        }
    }

    pub fn encode_boolean(&mut self, value: bool) {
        self.write_bit(value);
    }

    /// Length determinant; fragmented lengths are not produced
    pub fn encode_length_determinant(&mut self, length: u64) -> PerResult<()> {
        self.align_to_byte();
        match length {
            0..=127 => self.write_bits(length, 8),
            128..=MAX_LONG_FORM_LENGTH => self.write_bits(0x8000 | length, 16),
            _ => {
                return Err(PerError::Unsupported(format!(
                    "length {} needs the fragmented form",
                    length
                )));
            }
        }
        Ok(())
    }

    /// Encode a constrained whole number in `min..=max`
    ///
    /// # Arguments
    /// * `value` - Value to encode
    /// * `min` - Lower bound of the constraint
    /// * `max` - Upper bound, `None` for `min..MAX`
    ///
    /// # Error Handling
    /// - `Malformed` if `value` is outside the range or `max < min`
    /// - `Overflow` if an unbounded offset needs more than four octets
    pub fn encode_constrained_integer(
        &mut self,
        value: u64,
        min: u64,
        max: Option<u64>,
    ) -> PerResult<()> {
        check_bounds(u128::from(value), u128::from(min), max.map(u128::from))?;
        let width = IntegerWidth::for_range(range_of(min, max)?);
        self.encode_constrained_offset(value - min, width)
    }

    pub fn encode_constrained_signed_integer(
        &mut self,
        value: i64,
        min: i64,
        max: Option<i64>,
    ) -> PerResult<()> {
        if value < min || max.is_some_and(|max| value > max) {
            return Err(PerError::Malformed(format!(
                "{} outside {}..{:?}",
                value, min, max
            )));
        }
        let range = match max {
            Some(max) => u64::try_from(i128::from(max) - i128::from(min) + 1).ok(),
            None => None,
        };
        let offset = (i128::from(value) - i128::from(min)) as u64;
        self.encode_constrained_offset(offset, IntegerWidth::for_range(range))
    }

    fn encode_constrained_offset(&mut self, offset: u64, width: IntegerWidth) -> PerResult<()> {
        match width {
            IntegerWidth::Empty => {}
            IntegerWidth::Bits(bits) => self.write_bits(offset, bits),
            IntegerWidth::OneOctet => {
                self.align_to_byte();
                self.write_bits(offset, 8);
            }
            IntegerWidth::TwoOctets => {
                self.align_to_byte();
                self.write_bits(offset, 16);
            }
            IntegerWidth::Indefinite => {
                let octets = unsigned_octets(offset);
                if octets > 4 {
                    return Err(PerError::Overflow(format!(
                        "constrained offset {} does not fit in four octets",
                        offset
                    )));
                }
                self.write_bits(octets - 1, 2);
                self.align_to_byte();
                self.write_bits(offset, (octets * 8) as u32);
            }
        }
        Ok(())
    }

    /// Encode an INTEGER `(min..MAX)` as a minimal octet count and offset
    pub fn encode_semi_constrained_integer(&mut self, value: i64, min: i64) -> PerResult<()> {
        if value < min {
            return Err(PerError::Malformed(format!("{} below lower bound {}", value, min)));
        }
        let offset = (i128::from(value) - i128::from(min)) as u64;
        let octets = unsigned_octets(offset);
        self.encode_length_determinant(octets)?;
        self.write_bits(offset, (octets * 8) as u32);
        Ok(())
    }

    /// Minimal two's-complement octets behind a length determinant
    pub fn encode_unconstrained_integer(&mut self, value: i64) -> PerResult<()> {
        let octets = (1..=8u32)
            .find(|&n| {
                let limit = 1i128 << (n * 8 - 1);
                (-limit..limit).contains(&i128::from(value))
            })
            .unwrap_or(8);
        self.encode_length_determinant(u64::from(octets))?;
        self.write_bits(value as u64, octets * 8);
        Ok(())
    }

    /// Encode a normally small number: 6 bits below 64, length-determinant
    /// form otherwise
    pub fn encode_normally_small_nonnegative_whole_number(&mut self, value: u64) -> PerResult<()> {
        if value < 64 {
            self.write_bit(false);
            self.write_bits(value, 6);
            Ok(())
        } else {
            self.write_bit(true);
            self.encode_length_determinant(value)
        }
    }

    /// Encode an OCTET STRING with `SIZE(min_len..max_len)`
    ///
    /// # Arguments
    /// * `bytes` - Contents
    /// * `min_len` - Minimum size in octets
    /// * `max_len` - Maximum size in octets, `None` when unbounded
    ///
    /// # Error Handling
    /// Returns `Malformed` if `bytes` does not fit the size constraint and
    /// `Unsupported` for unbounded strings above 16383 octets.
    pub fn encode_octet_string(
        &mut self,
        bytes: &[u8],
        min_len: u64,
        max_len: Option<u64>,
    ) -> PerResult<()> {
        let length = bytes.len() as u64;
        check_bounds(u128::from(length), u128::from(min_len), max_len.map(u128::from))?;
        if max_len == Some(0) {
            return Ok(());
        }
        if max_len == Some(min_len) {
            if min_len <= 2 {
                self.write_unaligned_octets(bytes);
                return Ok(());
            }
            if min_len < SIXTY_FOUR_K {
                self.write_bytes_aligned(bytes);
                return Ok(());
            }
        }
        self.encode_size(length, min_len, max_len)?;
        if length > 0 {
            self.write_bytes_aligned(bytes);
        }
        Ok(())
    }

    /// Encode a BIT STRING with `SIZE(min_len..max_len)` counted in bits
    pub fn encode_bit_string(
        &mut self,
        value: &BitString,
        min_len: u64,
        max_len: Option<u64>,
    ) -> PerResult<()> {
        let length = value.num_bits();
        check_bounds(u128::from(length), u128::from(min_len), max_len.map(u128::from))?;
        if max_len == Some(0) {
            return Ok(());
        }
        if max_len == Some(min_len) && min_len < SIXTY_FOUR_K {
            if min_len > 16 {
                self.align_to_byte();
            }
            value.iter().for_each(|bit| self.write_bit(bit));
            return Ok(());
        }
        self.encode_size(length, min_len, max_len)?;
        if length > 0 {
            self.align_to_byte();
            value.iter().for_each(|bit| self.write_bit(bit));
        }
        Ok(())
    }

    /// Encode an OBJECT IDENTIFIER
    ///
    /// # Error Handling
    /// Returns `Overflow` if the contents do not fit a one-octet length.
    pub fn encode_object_identifier(&mut self, value: &ObjectIdentifier) -> PerResult<()> {
        let contents = value.to_contents();
        if contents.len() > 255 {
            return Err(PerError::Overflow(format!(
                "object identifier of {} octets",
                contents.len()
            )));
        }
        self.align_to_byte();
        self.write_bits(contents.len() as u64, 8);
        self.write_bytes_aligned(&contents);
        Ok(())
    }

    pub fn encode_general_string(&mut self, bytes: &[u8]) -> PerResult<()> {
        self.encode_normally_small_nonnegative_whole_number(bytes.len() as u64)?;
        if !bytes.is_empty() {
            self.write_bytes_aligned(bytes);
        }
        Ok(())
    }

    /// Encode an ENUMERATED with `root_count` root values
    ///
    /// # Error Handling
    /// Returns `Malformed` for a root index not below `root_count`, or an
    /// extension value of a type without an extension marker.
    pub fn encode_enumerated(
        &mut self,
        value: EnumeratedValue,
        root_count: u64,
        extensible: bool,
    ) -> PerResult<()> {
        if extensible {
            self.write_bit(value.extension);
        } else if value.extension {
            return Err(PerError::Malformed(
                "extension value of a non-extensible ENUMERATED".to_string(),
            ));
        }
        if value.extension {
            return self.encode_normally_small_nonnegative_whole_number(value.index);
        }
        if value.index >= root_count {
            return Err(PerError::Malformed(format!(
                "enumerated index {} outside root of {} values",
                value.index, root_count
            )));
        }
        self.encode_constrained_integer(value.index, 0, Some(root_count - 1))
    }

    /// Encode a known-multiplier character string
    ///
    /// # Arguments
    /// * `value` - Text to encode
    /// * `kind` - String type, which fixes the default character width
    /// * `min_len` - Minimum size in characters
    /// * `max_len` - Maximum size in characters, `None` when unbounded
    /// * `alphabet` - Permitted alphabet (`FROM("...")`), if constrained
    ///
    /// # Error Handling
    /// Returns `Malformed` if the size is outside the constraint or a
    /// character is not permitted.
    pub fn encode_restricted_character_string(
        &mut self,
        value: &str,
        kind: CharacterStringKind,
        min_len: u64,
        max_len: Option<u64>,
        alphabet: Option<&str>,
    ) -> PerResult<()> {
        let length = value.chars().count() as u64;
        check_bounds(u128::from(length), u128::from(min_len), max_len.map(u128::from))?;
        if max_len == Some(0) {
            return Ok(());
        }
        let mapping = CharacterMapping::new(kind, alphabet);
        match max_len {
            Some(max) if max == min_len && max < SIXTY_FOUR_K => {}
            _ => self.encode_size(length, min_len, max_len)?,
        }
        if length == 0 {
            return Ok(());
        }
        let octet_aligned = match max_len {
            Some(max) => max.saturating_mul(u64::from(mapping.bits)) > 16,
            None => true,
        };
        if octet_aligned {
            self.align_to_byte();
        }
        for c in value.chars() {
            let code = mapping.encode_char(c).ok_or_else(|| {
                PerError::Malformed(format!(
                    "character {:?} not permitted in {}",
                    c,
                    kind.name()
                ))
            })?;
            self.write_bits(code, mapping.bits);
        }
        Ok(())
    }

    /// Encode an open type: `body` writes into a fresh encoder whose octets
    /// are emitted behind a length determinant
    pub fn encode_open_type(
        &mut self,
        body: impl FnOnce(&mut PerEncoder) -> PerResult<()>,
    ) -> PerResult<()> {
        let mut inner = PerEncoder::new();
        body(&mut inner)?;
        // An empty open type still occupies one octet
        if inner.buffer.is_empty() {
            inner.buffer.push(0);
        }
        self.encode_length_determinant(inner.buffer.len() as u64)?;
        self.write_bytes_aligned(&inner.buffer);
        Ok(())
    }

    fn encode_size(&mut self, length: u64, min_len: u64, max_len: Option<u64>) -> PerResult<()> {
        match max_len {
            Some(max) => self.encode_constrained_integer(length, min_len, Some(max)),
            None => self.encode_length_determinant(length),
        }
    }
}

fn check_bounds(value: u128, min: u128, max: Option<u128>) -> PerResult<()> {
    if value < min || max.is_some_and(|max| value > max) {
        return Err(PerError::Malformed(format!(
            "{} outside {}..{:?}",
            value, min, max
        )));
    }
    Ok(())
}

/// Octets needed for an unsigned value, at least one
fn unsigned_octets(value: u64) -> u64 {
    let bits = 64 - u64::from(value.leading_zeros());
    bits.div_ceil(8).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::BitCursor;
    use crate::{integer, length, primitive};
    use proptest::prelude::*;
    use std::fmt::Debug;

    /// Decode `encoder`'s output with `decode` and check that it gives back
    /// `expected`, ends on the last written bit, and that every shorter
    /// prefix is reported as truncated
    fn check_round_trip<T: PartialEq + Debug>(
        encoder: PerEncoder,
        expected: &T,
        decode: impl Fn(&mut BitCursor<'_>) -> PerResult<T>,
    ) -> Result<(), TestCaseError> {
        let bits = encoder.bit_len();
        let bytes = encoder.into_bytes();

        let mut cursor = BitCursor::new(&bytes);
        let decoded = decode(&mut cursor);
        prop_assert_eq!(decoded.as_ref().ok(), Some(expected), "{:?}", decoded);
        prop_assert_eq!(cursor.bit_offset(), bits);

        for len in 0..bytes.len() {
            let mut cursor = BitCursor::new(&bytes[..len]);
            match decode(&mut cursor) {
                Err(e) => prop_assert!(e.is_truncated(), "prefix of {} octets: {:?}", len, e),
                Ok(v) => prop_assert!(false, "prefix of {} octets decoded {:?}", len, v),
            }
        }
        Ok(())
    }

    fn bit_string(bits: &[bool]) -> BitString {
        let mut bytes = vec![0u8; bits.len().div_ceil(8)];
        for (i, _) in bits.iter().enumerate().filter(|(_, bit)| **bit) {
            bytes[i / 8] |= 0x80 >> (i % 8);
        }
        BitString::new(bytes, bits.len() as u64).unwrap()
    }

    /// `SIZE(min..max)` around an actual length: `below` lowers the minimum,
    /// `above` raises the maximum (`None` leaves it unbounded)
    fn size_around(len: u64, below: u64, above: Option<u64>) -> (u64, Option<u64>) {
        (len.saturating_sub(below), above.map(|a| len + a))
    }

    #[test]
    fn test_bits_and_alignment() {
        let mut encoder = PerEncoder::new();
        encoder.write_bit(true);
        encoder.write_bits(0b01, 2);
        assert_eq!(encoder.bit_len(), 3);
        encoder.write_bytes_aligned(&[0xAB]);
        assert_eq!(encoder.bit_len(), 16);
        assert_eq!(encoder.into_bytes(), vec![0b1010_0000, 0xAB]);
    }

    #[test]
    fn test_length_determinant_forms() {
        let mut encoder = PerEncoder::new();
        encoder.encode_length_determinant(5).unwrap();
        encoder.encode_length_determinant(300).unwrap();
        assert!(matches!(
            encoder.encode_length_determinant(16384),
            Err(PerError::Unsupported(_))
        ));
        assert_eq!(encoder.as_bytes(), &[0x05, 0x81, 0x2C]);
    }

    #[test]
    fn test_constrained_integer_widths() {
        let cases: &[(u64, u64, Option<u64>)] = &[
            (3, 3, Some(3)),
            (5, 0, Some(7)),
            (200, 0, Some(255)),
            (1000, 0, Some(65535)),
            (70000, 0, Some(1 << 20)),
            (123456, 10, None),
        ];
        for &(value, min, max) in cases {
            let mut encoder = PerEncoder::new();
            encoder.encode_constrained_integer(value, min, max).unwrap();
            let bytes = encoder.into_bytes();
            let mut cursor = BitCursor::new(&bytes);
            assert_eq!(
                integer::decode_constrained_integer(&mut cursor, min, max).unwrap(),
                value,
                "value {} in {}..{:?}",
                value,
                min,
                max
            );
        }
    }

    #[test]
    fn test_out_of_range_values_are_rejected() {
        let mut encoder = PerEncoder::new();
        assert!(encoder.encode_constrained_integer(9, 0, Some(7)).is_err());
        assert!(encoder.encode_octet_string(&[1, 2, 3], 0, Some(2)).is_err());
        assert!(encoder.encode_semi_constrained_integer(-1, 0).is_err());
        assert_eq!(encoder.bit_len(), 0);
    }

    #[test]
    fn test_unconstrained_integer_minimal_octets() {
        let mut encoder = PerEncoder::new();
        encoder.encode_unconstrained_integer(-1).unwrap();
        encoder.encode_unconstrained_integer(128).unwrap();
        assert_eq!(encoder.as_bytes(), &[0x01, 0xFF, 0x02, 0x00, 0x80]);

        let bytes = encoder.into_bytes();
        let mut cursor = BitCursor::new(&bytes);
        assert_eq!(integer::decode_unconstrained_integer(&mut cursor).unwrap(), -1);
        assert_eq!(integer::decode_unconstrained_integer(&mut cursor).unwrap(), 128);
    }

    #[test]
    fn test_general_string_and_small_numbers() {
        let mut encoder = PerEncoder::new();
        encoder.encode_general_string(b"abc").unwrap();
        encoder.encode_normally_small_nonnegative_whole_number(100).unwrap();
        let bytes = encoder.into_bytes();
        assert_eq!(&bytes[..4], &[0b0000_0110, b'a', b'b', b'c']);

        let mut cursor = BitCursor::new(&bytes);
        assert_eq!(primitive::decode_general_string(&mut cursor).unwrap(), b"abc");
        assert_eq!(
            primitive::decode_normally_small_nonnegative_whole_number(&mut cursor).unwrap(),
            100
        );
    }

    #[test]
    fn test_character_string_alphabet() {
        let numeric = CharacterStringKind::Numeric;
        let mut encoder = PerEncoder::new();
        let result = encoder.encode_restricted_character_string("12a", numeric, 0, Some(8), None);
        assert!(result.is_err());

        let mut encoder = PerEncoder::new();
        encoder
            .encode_restricted_character_string("2024 10", numeric, 0, Some(8), None)
            .unwrap();
        let bytes = encoder.into_bytes();
        let mut cursor = BitCursor::new(&bytes);
        let text = primitive::decode_restricted_character_string(
            &mut cursor,
            CharacterStringKind::Numeric,
            0,
            Some(8),
            None,
        )
        .unwrap();
        assert_eq!(text, "2024 10");
    }

    #[test]
    fn test_open_type_wraps_inner_encoding() {
        let mut encoder = PerEncoder::new();
        encoder.write_bit(true);
        encoder
            .encode_open_type(|inner| {
                inner.encode_boolean(true);
                Ok(())
            })
            .unwrap();
        encoder.encode_open_type(|_| Ok(())).unwrap();
        assert_eq!(encoder.as_bytes(), &[0x80, 0x01, 0x80, 0x01, 0x00]);

        let bytes = encoder.into_bytes();
        let mut cursor = BitCursor::new(&bytes);
        cursor.skip_bits(1).unwrap();
        assert_eq!(length::decode_length_determinant(&mut cursor).unwrap(), 1);
    }

    proptest! {
        #[test]
        fn constrained_integer_round_trip(
            min in 0u64..1 << 40,
            span in prop_oneof![0u64..300, 0u64..70_000, 0u64..1 << 32],
            pick in any::<u64>(),
            pad in 0u32..8,
            bounded in any::<bool>(),
        ) {
            let value = min + pick % (span + 1);
            let max = bounded.then_some(min + span);
            let mut encoder = PerEncoder::new();
            encoder.write_bits(0, pad);
            encoder.encode_constrained_integer(value, min, max).unwrap();
            check_round_trip(encoder, &value, |c| {
                c.skip_bits(u64::from(pad))?;
                integer::decode_constrained_integer(c, min, max)
            })?;
        }

        #[test]
        fn signed_constrained_integer_round_trip(
            min in -(1i64 << 40)..1i64 << 40,
            span in prop_oneof![0u64..300, 0u64..1 << 32],
            pick in any::<u64>(),
        ) {
            let value = min + (pick % (span + 1)) as i64;
            let max = Some(min + span as i64);
            let mut encoder = PerEncoder::new();
            encoder.encode_constrained_signed_integer(value, min, max).unwrap();
            check_round_trip(encoder, &value, |c| {
                integer::decode_constrained_signed_integer(c, min, max)
            })?;
        }

        #[test]
        fn semi_constrained_integer_round_trip(
            min in -(1i64 << 40)..1i64 << 40,
            offset in 0i64..1 << 48,
        ) {
            let value = min + offset;
            let mut encoder = PerEncoder::new();
            encoder.encode_semi_constrained_integer(value, min).unwrap();
            check_round_trip(encoder, &value, |c| {
                integer::decode_semi_constrained_integer(c, min)
            })?;
        }

        #[test]
        fn unconstrained_integer_round_trip(value in any::<i64>()) {
            let mut encoder = PerEncoder::new();
            encoder.encode_unconstrained_integer(value).unwrap();
            check_round_trip(encoder, &value, integer::decode_unconstrained_integer)?;
        }

        #[test]
        fn normally_small_number_round_trip(value in 0u64..=MAX_LONG_FORM_LENGTH, pad in 0u32..8) {
            let mut encoder = PerEncoder::new();
            encoder.write_bits(0, pad);
            encoder.encode_normally_small_nonnegative_whole_number(value).unwrap();
            check_round_trip(encoder, &value, |c| {
                c.skip_bits(u64::from(pad))?;
                primitive::decode_normally_small_nonnegative_whole_number(c)
            })?;
        }

        #[test]
        fn octet_string_round_trip(
            bytes in proptest::collection::vec(any::<u8>(), 0..40),
            below in 0u64..4,
            above in proptest::option::of(prop_oneof![Just(0u64), 0u64..70_000]),
            pad in 0u32..8,
        ) {
            let (min_len, max_len) = size_around(bytes.len() as u64, below, above);
            let mut encoder = PerEncoder::new();
            encoder.write_bits(0, pad);
            encoder.encode_octet_string(&bytes, min_len, max_len).unwrap();
            check_round_trip(encoder, &bytes, |c| {
                c.skip_bits(u64::from(pad))?;
                primitive::decode_octet_string(c, min_len, max_len)
            })?;
        }

        #[test]
        fn bit_string_round_trip(
            bits in proptest::collection::vec(any::<bool>(), 0..100),
            below in 0u64..4,
            above in proptest::option::of(prop_oneof![Just(0u64), 0u64..70_000]),
            pad in 0u32..8,
        ) {
            let value = bit_string(&bits);
            let (min_len, max_len) = size_around(bits.len() as u64, below, above);
            let mut encoder = PerEncoder::new();
            encoder.write_bits(0, pad);
            encoder.encode_bit_string(&value, min_len, max_len).unwrap();
            check_round_trip(encoder, &value, |c| {
                c.skip_bits(u64::from(pad))?;
                primitive::decode_bit_string(c, min_len, max_len)
            })?;
        }

        #[test]
        fn object_identifier_round_trip(
            first in 0u32..3,
            second in 0u32..40,
            rest in proptest::collection::vec(any::<u32>(), 0..20),
        ) {
            let mut arcs = vec![first, second];
            arcs.extend(rest);
            let value = ObjectIdentifier::new(arcs).unwrap();
            let mut encoder = PerEncoder::new();
            encoder.write_bit(true);
            encoder.encode_object_identifier(&value).unwrap();
            check_round_trip(encoder, &value, |c| {
                c.skip_bits(1)?;
                primitive::decode_object_identifier(c)
            })?;
        }

        #[test]
        fn general_string_round_trip(bytes in proptest::collection::vec(any::<u8>(), 0..200)) {
            let mut encoder = PerEncoder::new();
            encoder.encode_general_string(&bytes).unwrap();
            check_round_trip(encoder, &bytes, primitive::decode_general_string)?;
        }

        #[test]
        fn enumerated_round_trip(
            root_count in 1u64..300,
            pick in any::<u64>(),
            extensible in any::<bool>(),
            extension in any::<bool>(),
        ) {
            let value = if extensible && extension {
                EnumeratedValue { index: pick % 1000, extension: true }
            } else {
                EnumeratedValue { index: pick % root_count, extension: false }
            };
            let mut encoder = PerEncoder::new();
            encoder.encode_enumerated(value, root_count, extensible).unwrap();
            check_round_trip(encoder, &value, |c| {
                primitive::decode_enumerated(c, root_count, extensible)
            })?;
        }

        #[test]
        fn character_string_round_trip(
            (kind, alphabet, text) in prop_oneof![
                "[ -~]{0,24}".prop_map(|t| (CharacterStringKind::Ia5, None::<&str>, t)),
                "[ 0-9]{0,24}".prop_map(|t| (CharacterStringKind::Numeric, None::<&str>, t)),
                "[ACGT]{0,24}".prop_map(|t| (CharacterStringKind::Visible, Some("ACGT"), t)),
            ],
            below in 0u64..4,
            above in proptest::option::of(prop_oneof![Just(0u64), 0u64..100]),
            pad in 0u32..8,
        ) {
            let (min_len, max_len) = size_around(text.chars().count() as u64, below, above);
            let mut encoder = PerEncoder::new();
            encoder.write_bits(0, pad);
            encoder
                .encode_restricted_character_string(&text, kind, min_len, max_len, alphabet)
                .unwrap();
            check_round_trip(encoder, &text, |c| {
                c.skip_bits(u64::from(pad))?;
                primitive::decode_restricted_character_string(c, kind, min_len, max_len, alphabet)
            })?;
        }
    }
}
