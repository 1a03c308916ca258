//! Primitive type decoders
//!
//! All of these read straight from a [`BitCursor`] and leave it on the bit
//! after the decoded value.

use crate::config::DEFAULT_MAX_STRING_LEN;
use crate::cursor::BitCursor;
use crate::integer::{bits_for_range, decode_constrained_integer};
use crate::length::decode_length_determinant;
use per_core::{BitString, ObjectIdentifier, PerError, PerResult};

/// Sizes below this are encoded without fragmentation
pub(crate) const SIXTY_FOUR_K: u64 = 65536;

/// Decode a BOOLEAN: one bit, no alignment
pub fn decode_boolean(cursor: &mut BitCursor<'_>) -> PerResult<bool> {
    cursor.read_bit()
}

/// Decode a NULL: no bits at all
pub fn decode_null(_cursor: &mut BitCursor<'_>) -> PerResult<()> {
    Ok(())
}

/// Decode a normally small non-negative whole number (X.691 §10.6)
///
/// A leading 0 bit means the value follows in 6 bits (0..=63); a leading 1
/// bit means the value is carried by a length determinant.
pub fn decode_normally_small_nonnegative_whole_number(
    cursor: &mut BitCursor<'_>,
) -> PerResult<u64> {
    let large = cursor.read_bit()?;
    if !large {
        return cursor.read_bits(6);
    }
    decode_length_determinant(cursor)
}

/// Decode an OCTET STRING with `SIZE(min_len..max_len)` (X.691 §17)
///
/// - `max_len == Some(0)`: empty, nothing on the wire
/// - fixed size up to 2 octets: raw bits, unaligned
/// - fixed size below 64K: aligned octets, no length
/// - otherwise: a length (constrained whole number when bounded, length
///   determinant when not), then aligned octets
pub fn decode_octet_string(
    cursor: &mut BitCursor<'_>,
    min_len: u64,
    max_len: Option<u64>,
) -> PerResult<Vec<u8>> {
    if max_len == Some(0) {
        return Ok(Vec::new());
    }
    if max_len == Some(min_len) {
        if min_len <= 2 {
            return cursor.read_unaligned_octets(min_len);
        }
        if min_len < SIXTY_FOUR_K {
            cursor.align_to_byte();
            return cursor.read_bytes(min_len).map(<[u8]>::to_vec);
        }
    }

    let length = decode_size(cursor, min_len, max_len)?;
    if length == 0 {
        return Ok(Vec::new());
    }
    cursor.align_to_byte();
    cursor.read_bytes(length).map(<[u8]>::to_vec)
}

/// Decode a BIT STRING with `SIZE(min_len..max_len)` in bits (X.691 §16)
pub fn decode_bit_string(
    cursor: &mut BitCursor<'_>,
    min_len: u64,
    max_len: Option<u64>,
) -> PerResult<BitString> {
    if max_len == Some(0) {
        return Ok(BitString::empty());
    }
    if max_len == Some(min_len) {
        if min_len <= 16 {
            return read_bit_field(cursor, min_len);
        }
        if min_len < SIXTY_FOUR_K {
            cursor.align_to_byte();
            return read_bit_field(cursor, min_len);
        }
    }

    let length = decode_size(cursor, min_len, max_len)?;
    if length == 0 {
        return Ok(BitString::empty());
    }
    cursor.align_to_byte();
    read_bit_field(cursor, length)
}

/// Decode an OBJECT IDENTIFIER: aligned one-octet length, then X.690
/// content octets
pub fn decode_object_identifier(cursor: &mut BitCursor<'_>) -> PerResult<ObjectIdentifier> {
    cursor.align_to_byte();
    let length = cursor.read_bits(8)?;
    let contents = cursor.read_bytes(length)?;
    ObjectIdentifier::from_contents(contents)
}

/// Decode a GeneralString: normally-small length, then the raw octets.
/// The octets are not checked against any character set.
pub fn decode_general_string(cursor: &mut BitCursor<'_>) -> PerResult<Vec<u8>> {
    let length = decode_normally_small_nonnegative_whole_number(cursor)?;
    if length == 0 {
        return Ok(Vec::new());
    }
    cursor.align_to_byte();
    cursor.read_bytes(length).map(<[u8]>::to_vec)
}

/// Decoded ENUMERATED value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnumeratedValue {
    /// Index among root values, or among extension additions
    pub index: u64,
    pub extension: bool,
}

/// Decode an ENUMERATED with `root_count` root values (X.691 §14)
pub fn decode_enumerated(
    cursor: &mut BitCursor<'_>,
    root_count: u64,
    extensible: bool,
) -> PerResult<EnumeratedValue> {
    if extensible && cursor.read_bit()? {
        let index = decode_normally_small_nonnegative_whole_number(cursor)?;
        return Ok(EnumeratedValue {
            index,
            extension: true,
        });
    }
    if root_count == 0 {
        return Err(PerError::Malformed(
            "enumerated type without root values".to_string(),
        ));
    }
    let index = decode_constrained_integer(cursor, 0, Some(root_count - 1))?;
    if index >= root_count {
        return Err(PerError::Malformed(format!(
            "enumerated index {} outside root of {} values",
            index, root_count
        )));
    }
    Ok(EnumeratedValue {
        index,
        extension: false,
    })
}

/// Known-multiplier character string types (X.691 §30)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CharacterStringKind {
    Numeric,
    Printable,
    Visible,
    Ia5,
    Bmp,
}

impl CharacterStringKind {
    pub fn name(self) -> &'static str {
        match self {
            CharacterStringKind::Numeric => "NumericString",
            CharacterStringKind::Printable => "PrintableString",
            CharacterStringKind::Visible => "VisibleString",
            CharacterStringKind::Ia5 => "IA5String",
            CharacterStringKind::Bmp => "BMPString",
        }
    }

    /// Bits per character in the ALIGNED variant without a permitted
    /// alphabet constraint
    fn default_char_bits(self) -> u32 {
        match self {
            CharacterStringKind::Numeric => 4,
            CharacterStringKind::Printable
            | CharacterStringKind::Visible
            | CharacterStringKind::Ia5 => 8,
            CharacterStringKind::Bmp => 16,
        }
    }
}

const NUMERIC_ALPHABET: &str = " 0123456789";

/// Character-to-bits mapping for one string type / alphabet combination
pub(crate) struct CharacterMapping {
    pub(crate) bits: u32,
    /// Sorted alphabet when characters are sent as indices
    indexed: Option<Vec<char>>,
}

impl CharacterMapping {
    pub(crate) fn new(kind: CharacterStringKind, alphabet: Option<&str>) -> Self {
        let alphabet: Option<Vec<char>> = match (alphabet, kind) {
            (Some(a), _) => Some(a.chars().collect()),
            (None, CharacterStringKind::Numeric) => Some(NUMERIC_ALPHABET.chars().collect()),
            (None, _) => None,
        };
        let Some(mut chars) = alphabet else {
            return Self {
                bits: kind.default_char_bits(),
                indexed: None,
            };
        };
        chars.sort_unstable();
        chars.dedup();

        let bits = aligned_char_bits(bits_for_range(chars.len() as u64));
        let largest = chars.last().map(|&c| u64::from(u32::from(c))).unwrap_or(0);
        let direct = bits >= 64 || largest < (1u64 << bits);
        Self {
            bits,
            indexed: if direct { None } else { Some(chars) },
        }
    }

    pub(crate) fn decode_char(&self, value: u64) -> PerResult<char> {
        match &self.indexed {
            Some(chars) => chars.get(value as usize).copied().ok_or_else(|| {
                PerError::Malformed(format!(
                    "character index {} outside alphabet of {}",
                    value,
                    chars.len()
                ))
            }),
            None => u32::try_from(value)
                .ok()
                .and_then(char::from_u32)
                .ok_or_else(|| PerError::Malformed(format!("invalid character value {}", value))),
        }
    }

    /// Wire value of `c`, `None` when it is outside the alphabet or too wide
    pub(crate) fn encode_char(&self, c: char) -> Option<u64> {
        match &self.indexed {
            Some(chars) => chars.binary_search(&c).ok().map(|i| i as u64),
            None => {
                let value = u64::from(u32::from(c));
                (self.bits >= 64 || value < (1u64 << self.bits)).then_some(value)
            }
        }
    }
}

/// Round a character width up to a power of two, as the ALIGNED variant does
fn aligned_char_bits(bits: u32) -> u32 {
    match bits {
        0 => 0,
        1 => 1,
        2 => 2,
        3..=4 => 4,
        5..=8 => 8,
        9..=16 => 16,
        _ => 32,
    }
}

/// Decode a known-multiplier character string with `SIZE(min_len..max_len)`
/// in characters and an optional permitted alphabet (`FROM("...")`)
///
/// At most [`DEFAULT_MAX_STRING_LEN`] characters are accepted; see
/// [`decode_restricted_character_string_with_limit`].
pub fn decode_restricted_character_string(
    cursor: &mut BitCursor<'_>,
    kind: CharacterStringKind,
    min_len: u64,
    max_len: Option<u64>,
    alphabet: Option<&str>,
) -> PerResult<String> {
    decode_restricted_character_string_with_limit(
        cursor,
        kind,
        min_len,
        max_len,
        alphabet,
        DEFAULT_MAX_STRING_LEN,
    )
}

/// Decode a known-multiplier character string holding at most `limit`
/// characters
///
/// A permitted alphabet of one character encodes each character in zero
/// bits, so the remaining input does not bound the decoded length.
///
/// # Errors
///
/// `Malformed` if the decoded length is above `max_len` or `limit`, or a
/// character is outside the alphabet; `Truncated` if the input ends early.
pub fn decode_restricted_character_string_with_limit(
    cursor: &mut BitCursor<'_>,
    kind: CharacterStringKind,
    min_len: u64,
    max_len: Option<u64>,
    alphabet: Option<&str>,
    limit: u64,
) -> PerResult<String> {
    if max_len == Some(0) {
        return Ok(String::new());
    }
    let mapping = CharacterMapping::new(kind, alphabet);
    let bits = u64::from(mapping.bits);

    let length = match max_len {
        Some(max) if max == min_len && max < SIXTY_FOUR_K => min_len,
        _ => decode_size(cursor, min_len, max_len)?,
    };
    if length > limit {
        return Err(PerError::Malformed(format!(
            "{} of {} characters exceeds the limit of {}",
            kind.name(),
            length,
            limit
        )));
    }
    if length == 0 {
        return Ok(String::new());
    }

    let octet_aligned = match max_len {
        Some(max) => max.saturating_mul(bits) > 16,
        None => true,
    };
    if octet_aligned {
        cursor.align_to_byte();
    }

    let total = length
        .checked_mul(bits)
        .ok_or_else(|| PerError::Overflow(format!("{} characters too long", length)))?;
    if total > cursor.bits_remaining() {
        return Err(PerError::truncated(total, cursor.bits_remaining()));
    }

    let mut out = String::with_capacity(length.min(1024) as usize);
    for _ in 0..length {
        let value = cursor.read_bits(mapping.bits)?;
        out.push(mapping.decode_char(value)?);
    }
    Ok(out)
}

/// Length of a sized string: constrained whole number when the upper bound
/// is known, length determinant otherwise
fn decode_size(cursor: &mut BitCursor<'_>, min_len: u64, max_len: Option<u64>) -> PerResult<u64> {
    let Some(max) = max_len else {
        return decode_length_determinant(cursor);
    };
    let length = decode_constrained_integer(cursor, min_len, Some(max))?;
    if length > max {
        return Err(PerError::Malformed(format!(
            "size {} outside SIZE({}..{})",
            length, min_len, max
        )));
    }
    Ok(length)
}

/// Read `num_bits` bits into a packed [`BitString`]
fn read_bit_field(cursor: &mut BitCursor<'_>, num_bits: u64) -> PerResult<BitString> {
    if num_bits > cursor.bits_remaining() {
        return Err(PerError::truncated(num_bits, cursor.bits_remaining()));
    }
    let mut bytes = Vec::with_capacity(num_bits.div_ceil(8) as usize);
    let mut left = num_bits;
    while left > 0 {
        let take = left.min(8) as u32;
        let chunk = cursor.read_bits(take)? as u8;
        bytes.push(chunk << (8 - take));
        left -= u64::from(take);
    }
    BitString::new(bytes, num_bits)
}
