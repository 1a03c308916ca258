//! INTEGER decoding (X.691 §10.5, §10.7, §10.8, §13)
//!
//! # Constrained whole numbers
//!
//! The encoding width of a constrained whole number depends only on the
//! size of its range, `range = max - min + 1`:
//!
//! | range              | encoding                                   |
//! |--------------------|--------------------------------------------|
//! | 1                  | nothing, the value is `min`                |
//! | 2..=255            | `ceil(log2(range))` bits, unaligned        |
//! | 256                | one aligned octet                          |
//! | 257..=65536        | two aligned octets                         |
//! | larger / unbounded | 2-bit octet count (1..=4), aligned octets |
//!
//! The last row is a simplification of §10.5.7.4, which allows a general
//! length-prefixed octet count. Values wider than four octets in a
//! constrained range cannot be decoded through it; use
//! [`decode_semi_constrained_integer`] for the general form.

use crate::cursor::BitCursor;
use crate::length::decode_length_determinant;
use per_core::{PerError, PerResult};

/// Value range of a constrained type
///
/// `max: None` means no upper bound. `extensible` marks ranges with an
/// extension marker (`SIZE(1..4, ...)`); only SEQUENCE OF / SET OF sizes
/// consult it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConstraintRange {
    pub min: u64,
    pub max: Option<u64>,
    pub extensible: bool,
}

impl ConstraintRange {
    /// `min..=max`
    pub const fn new(min: u64, max: u64) -> Self {
        Self {
            min,
            max: Some(max),
            extensible: false,
        }
    }

    /// Exactly `n`
    pub const fn fixed(n: u64) -> Self {
        Self::new(n, n)
    }

    /// `min..MAX`
    pub const fn semi_constrained(min: u64) -> Self {
        Self {
            min,
            max: None,
            extensible: false,
        }
    }

    /// No bounds at all
    pub const fn unconstrained() -> Self {
        Self::semi_constrained(0)
    }

    /// Mark the range as extensible
    pub const fn with_extension(mut self) -> Self {
        self.extensible = true;
        self
    }

    /// Number of values in the range, `None` when unbounded or wider than `u64`
    pub fn range(&self) -> PerResult<Option<u64>> {
        range_of(self.min, self.max)
    }
}

impl Default for ConstraintRange {
    fn default() -> Self {
        Self::unconstrained()
    }
}

/// Encoding width selected for a constrained whole number
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegerWidth {
    /// Single-value range, zero bits
    Empty,
    /// Unaligned bit-field of 1..=8 bits
    Bits(u32),
    /// One aligned octet
    OneOctet,
    /// Two aligned octets
    TwoOctets,
    /// 2-bit octet count followed by 1..=4 aligned octets
    Indefinite,
}

impl IntegerWidth {
    /// Pick the width for a range (`None` = unbounded)
    pub fn for_range(range: Option<u64>) -> Self {
        match range {
            Some(1) => IntegerWidth::Empty,
            Some(r @ 2..=255) => IntegerWidth::Bits(bits_for_range(r)),
            Some(256) => IntegerWidth::OneOctet,
            Some(257..=65536) => IntegerWidth::TwoOctets,
            _ => IntegerWidth::Indefinite,
        }
    }
}

/// Bits needed to encode `range` distinct values
pub(crate) fn bits_for_range(range: u64) -> u32 {
    if range <= 1 {
        0
    } else {
        64 - (range - 1).leading_zeros()
    }
}

pub(crate) fn range_of(min: u64, max: Option<u64>) -> PerResult<Option<u64>> {
    match max {
        None => Ok(None),
        Some(max) if max < min => Err(PerError::Malformed(format!(
            "constraint upper bound {} below lower bound {}",
            max, min
        ))),
        Some(max) => Ok((max - min).checked_add(1)),
    }
}

/// Decode the offset from the lower bound for the given width
pub(crate) fn decode_constrained_offset(
    cursor: &mut BitCursor<'_>,
    width: IntegerWidth,
) -> PerResult<u64> {
    match width {
        IntegerWidth::Empty => Ok(0),
        IntegerWidth::Bits(bits) => cursor.read_bits(bits),
        IntegerWidth::OneOctet => {
            cursor.align_to_byte();
            cursor.read_bits(8)
        }
        IntegerWidth::TwoOctets => {
            cursor.align_to_byte();
            cursor.read_bits(16)
        }
        IntegerWidth::Indefinite => {
            let octets = cursor.read_bits(2)? + 1;
            cursor.align_to_byte();
            cursor.read_bits((octets * 8) as u32)
        }
    }
}

/// Decode a constrained whole number in `min..=max` (`max: None` = unbounded).
///
/// Decoded values above `max` are returned as-is; callers that index
/// tables with the result check the bound themselves.
///
/// # Errors
///
/// `Malformed` if `max < min`, `Overflow` if `min + offset` does not fit in
/// a `u64`, `Truncated` if the input ends early.
pub fn decode_constrained_integer(
    cursor: &mut BitCursor<'_>,
    min: u64,
    max: Option<u64>,
) -> PerResult<u64> {
    let width = IntegerWidth::for_range(range_of(min, max)?);
    let offset = decode_constrained_offset(cursor, width)?;
    min.checked_add(offset).ok_or_else(|| {
        PerError::Overflow(format!(
            "constrained integer {} + {} exceeds u64",
            min, offset
        ))
    })
}

/// Decode a constrained INTEGER with a signed lower bound
pub fn decode_constrained_signed_integer(
    cursor: &mut BitCursor<'_>,
    min: i64,
    max: Option<i64>,
) -> PerResult<i64> {
    let range = match max {
        None => None,
        Some(max) if max < min => {
            return Err(PerError::Malformed(format!(
                "constraint upper bound {} below lower bound {}",
                max, min
            )));
        }
        Some(max) => u64::try_from(i128::from(max) - i128::from(min) + 1).ok(),
    };
    let offset = decode_constrained_offset(cursor, IntegerWidth::for_range(range))?;
    i64::try_from(i128::from(min) + i128::from(offset)).map_err(|_| {
        PerError::Overflow(format!(
            "constrained integer {} + {} exceeds i64",
            min, offset
        ))
    })
}

/// Decode a semi-constrained INTEGER `(min..MAX)` (X.691 §10.7):
/// length determinant in octets, then the offset from `min`
pub fn decode_semi_constrained_integer(cursor: &mut BitCursor<'_>, min: i64) -> PerResult<i64> {
    let octets = read_integer_octets(cursor)?;
    let offset = octets
        .iter()
        .fold(0u64, |acc, &b| (acc << 8) | u64::from(b));
    i64::try_from(i128::from(min) + i128::from(offset)).map_err(|_| {
        PerError::Overflow(format!(
            "semi-constrained integer {} + {} exceeds i64",
            min, offset
        ))
    })
}

/// Decode an unconstrained INTEGER (X.691 §10.8): length determinant in
/// octets, then a two's-complement value
pub fn decode_unconstrained_integer(cursor: &mut BitCursor<'_>) -> PerResult<i64> {
    let octets = read_integer_octets(cursor)?;
    let negative = octets[0] & 0x80 != 0;
    let mut value: i64 = if negative { -1 } else { 0 };
    for &byte in octets {
        value = (value << 8) | i64::from(byte);
    }
    Ok(value)
}

fn read_integer_octets<'a>(cursor: &mut BitCursor<'a>) -> PerResult<&'a [u8]> {
    let length = decode_length_determinant(cursor)?;
    if length == 0 {
        return Err(PerError::Malformed(
            "integer encoded with zero octets".to_string(),
        ));
    }
    if length > 8 {
        return Err(PerError::Overflow(format!(
            "integer of {} octets exceeds 64 bits",
            length
        )));
    }
    cursor.read_bytes(length)
}
