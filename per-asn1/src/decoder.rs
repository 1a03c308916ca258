//! Decoder context for one PDU
//!
//! [`PerDecoder`] owns the [`BitCursor`] for a single top-level decode,
//! together with the configuration, nesting depth, statistics and the
//! optional trace. Schema callbacks receive it by `&mut` and call its
//! methods; each method leaves the cursor on the first bit after what it
//! consumed.
//!
//! # Usage Example
//!
//! ```rust,no_run
//! use per_asn1::PerDecoder;
//!
//! let data = [0x2A];
//! let mut decoder = PerDecoder::new(&data);
//! let value = decoder.decode_constrained_integer(0, Some(255))?;
//! assert_eq!(value, 42);
//! # Ok::<(), per_core::PerError>(())
//! ```

use crate::config::DecoderConfig;
use crate::cursor::BitCursor;
use crate::integer;
use crate::length;
use crate::primitive::{self, CharacterStringKind, EnumeratedValue};
use crate::schema::DecodeFn;
use crate::statistics::DecodeStatistics;
use crate::trace::{DecodeTrace, TraceItem, TraceKind};
use per_core::{BitString, DecodedValue, ObjectIdentifier, PerError, PerResult};

/// Decoding state for one PDU
pub struct PerDecoder<'a> {
    cursor: BitCursor<'a>,
    config: DecoderConfig,
    depth: usize,
    level: usize,
    statistics: DecodeStatistics,
    trace: Option<DecodeTrace>,
}

/// Result of [`decode_pdu`]
#[derive(Debug, Clone)]
pub struct DecodeOutcome<T> {
    pub value: T,
    /// Bits consumed from the start of the buffer
    pub bits_consumed: u64,
    pub statistics: DecodeStatistics,
    /// Present when tracing was enabled
    pub trace: Option<DecodeTrace>,
}

/// Decode one PDU from `buffer` with `root` as the outermost type
///
/// # Arguments
/// * `buffer` - The complete PDU
/// * `config` - Limits and trace setting for this decode
/// * `root` - Decode callback of the outermost type
///
/// # Returns
/// Returns the decoded value with the statistics and optional trace.
/// Trailing bits after the root value are left unread; `bits_consumed`
/// tells the caller where the value ended.
///
/// # Error Handling
/// The first error at any nesting level is returned as-is and logged at
/// debug level; no partial value is produced.
pub fn decode_pdu<T>(
    buffer: &[u8],
    config: &DecoderConfig,
    root: DecodeFn<T>,
) -> PerResult<DecodeOutcome<T>> {
    let mut decoder = PerDecoder::with_config(buffer, config.clone());
    let result = root(&mut decoder);
    if let Err(e) = &result {
        log::debug!(
            "PER decode of {}-octet PDU failed at bit {}: {}",
            buffer.len(),
            decoder.bit_offset(),
            e
        );
    }
    let value = result?;
    let bits_consumed = decoder.bit_offset();
    let (statistics, trace) = decoder.finish();
    Ok(DecodeOutcome {
        value,
        bits_consumed,
        statistics,
        trace,
    })
}

impl<'a> PerDecoder<'a> {
    /// Create a decoder with the default configuration
    pub fn new(buffer: &'a [u8]) -> Self {
        Self::with_config(buffer, DecoderConfig::default())
    }

    pub fn with_config(buffer: &'a [u8], config: DecoderConfig) -> Self {
        let trace = config.trace.then(DecodeTrace::new);
        Self {
            cursor: BitCursor::new(buffer),
            config,
            depth: 0,
            level: 0,
            statistics: DecodeStatistics::new(),
            trace,
        }
    }

    pub fn cursor(&self) -> &BitCursor<'a> {
        &self.cursor
    }

    /// Direct cursor access for dissector-specific bit fields
    pub fn cursor_mut(&mut self) -> &mut BitCursor<'a> {
        &mut self.cursor
    }

    pub fn bit_offset(&self) -> u64 {
        self.cursor.bit_offset()
    }

    pub fn bits_remaining(&self) -> u64 {
        self.cursor.bits_remaining()
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Current aggregate nesting depth
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn statistics(&self) -> &DecodeStatistics {
        &self.statistics
    }

    pub fn trace(&self) -> Option<&DecodeTrace> {
        self.trace.as_ref()
    }

    /// Consume the decoder, keeping what it collected
    pub fn finish(self) -> (DecodeStatistics, Option<DecodeTrace>) {
        (self.statistics, self.trace)
    }

    /// Decode a BOOLEAN (one bit, no alignment)
    pub fn decode_boolean(&mut self) -> PerResult<bool> {
        self.leaf("BOOLEAN", primitive::decode_boolean, |v| DecodedValue::Boolean(*v))
    }

    /// Decode a NULL; nothing is read
    pub fn decode_null(&mut self) -> PerResult<()> {
        self.leaf("NULL", primitive::decode_null, |_| DecodedValue::Null)
    }

    /// Decode a constrained whole number in `min..=max`
    ///
    /// # Arguments
    /// * `min` - Lower bound of the constraint
    /// * `max` - Upper bound, `None` for `min..MAX`
    ///
    /// # Returns
    /// Returns the decoded value. The encoding width depends only on the
    /// size of the range (see [`IntegerWidth`](crate::IntegerWidth)).
    ///
    /// # Error Handling
    /// - `Truncated` if the input ends inside the value
    /// - `Malformed` if `max < min`
    /// - `Overflow` if `min + offset` does not fit in a `u64`
    pub fn decode_constrained_integer(&mut self, min: u64, max: Option<u64>) -> PerResult<u64> {
        self.leaf(
            "INTEGER",
            |c| integer::decode_constrained_integer(c, min, max),
            |v| DecodedValue::Unsigned(*v),
        )
    }

    /// Decode a constrained INTEGER whose lower bound may be negative
    ///
    /// Same wire form and errors as
    /// [`decode_constrained_integer`](Self::decode_constrained_integer).
    pub fn decode_constrained_signed_integer(
        &mut self,
        min: i64,
        max: Option<i64>,
    ) -> PerResult<i64> {
        self.leaf(
            "INTEGER",
            |c| integer::decode_constrained_signed_integer(c, min, max),
            |v| DecodedValue::Integer(*v),
        )
    }

    /// Decode an INTEGER `(min..MAX)`: octet count, then the offset from `min`
    ///
    /// # Error Handling
    /// Returns `Overflow` for more than eight octets or a result outside
    /// `i64`, and `Malformed` for a zero octet count.
    pub fn decode_semi_constrained_integer(&mut self, min: i64) -> PerResult<i64> {
        self.leaf(
            "INTEGER",
            |c| integer::decode_semi_constrained_integer(c, min),
            |v| DecodedValue::Integer(*v),
        )
    }

    /// Decode an unconstrained two's-complement INTEGER
    pub fn decode_unconstrained_integer(&mut self) -> PerResult<i64> {
        self.leaf(
            "INTEGER",
            integer::decode_unconstrained_integer,
            |v| DecodedValue::Integer(*v),
        )
    }

    /// Decode a length determinant, recorded as bookkeeping in the trace
    ///
    /// # Error Handling
    /// The fragmented form (lengths above 16383) returns `Unsupported`.
    pub fn decode_length_determinant(&mut self) -> PerResult<u64> {
        self.internal("length", length::decode_length_determinant, |v| {
            DecodedValue::UnsignedLength(*v)
        })
    }

    pub fn decode_normally_small_nonnegative_whole_number(&mut self) -> PerResult<u64> {
        self.leaf(
            "INTEGER",
            primitive::decode_normally_small_nonnegative_whole_number,
            |v| DecodedValue::Unsigned(*v),
        )
    }

    /// Decode an OCTET STRING with `SIZE(min_len..max_len)`
    ///
    /// # Arguments
    /// * `min_len` - Minimum size in octets
    /// * `max_len` - Maximum size in octets, `None` when unbounded
    ///
    /// # Returns
    /// Returns the octets. Fixed sizes of at most two octets are read
    /// without alignment; everything else starts on an octet boundary.
    ///
    /// # Error Handling
    /// - `Truncated` if the input ends inside the string
    /// - `Malformed` if the encoded size is above `max_len`
    pub fn decode_octet_string(
        &mut self,
        min_len: u64,
        max_len: Option<u64>,
    ) -> PerResult<Vec<u8>> {
        self.leaf(
            "OCTET STRING",
            |c| primitive::decode_octet_string(c, min_len, max_len),
            |v| DecodedValue::Bytes(v.clone()),
        )
    }

    /// Decode a BIT STRING with `SIZE(min_len..max_len)` counted in bits
    pub fn decode_bit_string(
        &mut self,
        min_len: u64,
        max_len: Option<u64>,
    ) -> PerResult<BitString> {
        self.leaf(
            "BIT STRING",
            |c| primitive::decode_bit_string(c, min_len, max_len),
            |v| DecodedValue::BitString(v.clone()),
        )
    }

    /// Decode an OBJECT IDENTIFIER (one-octet length, X.690 contents)
    ///
    /// # Error Handling
    /// Returns `Malformed` for empty or badly packed contents and
    /// `Overflow` for an arc above `u32::MAX`.
    pub fn decode_object_identifier(&mut self) -> PerResult<ObjectIdentifier> {
        self.leaf(
            "OBJECT IDENTIFIER",
            primitive::decode_object_identifier,
            |v| DecodedValue::ObjectIdentifier(v.clone()),
        )
    }

    pub fn decode_general_string(&mut self) -> PerResult<Vec<u8>> {
        self.leaf(
            "GeneralString",
            primitive::decode_general_string,
            |v| DecodedValue::GeneralString(v.clone()),
        )
    }

    /// Decode an ENUMERATED with `root_count` root values
    ///
    /// # Arguments
    /// * `root_count` - Number of values before the extension marker
    /// * `extensible` - Whether the type has an extension marker
    ///
    /// # Returns
    /// Returns the index among root values, or among extension values when
    /// [`EnumeratedValue::extension`] is set.
    ///
    /// # Error Handling
    /// Returns `Malformed` if a root index is not below `root_count`.
    pub fn decode_enumerated(
        &mut self,
        root_count: u64,
        extensible: bool,
    ) -> PerResult<EnumeratedValue> {
        self.leaf(
            "ENUMERATED",
            |c| primitive::decode_enumerated(c, root_count, extensible),
            |v| DecodedValue::Enumerated {
                index: v.index,
                extension: v.extension,
            },
        )
    }

    /// Decode a known-multiplier character string
    ///
    /// # Arguments
    /// * `kind` - String type, which fixes the default character width
    /// * `min_len` - Minimum size in characters
    /// * `max_len` - Maximum size in characters, `None` when unbounded
    /// * `alphabet` - Permitted alphabet (`FROM("...")`), if constrained
    ///
    /// # Error Handling
    /// - `Malformed` if the size is above `max_len` or
    ///   [`DecoderConfig::max_string_len`], or a character is outside the
    ///   alphabet
    /// - `Truncated` if the input ends inside the string
    pub fn decode_restricted_character_string(
        &mut self,
        kind: CharacterStringKind,
        min_len: u64,
        max_len: Option<u64>,
        alphabet: Option<&str>,
    ) -> PerResult<String> {
        let limit = self.config.max_string_len;
        self.leaf(
            kind.name(),
            |c| {
                primitive::decode_restricted_character_string_with_limit(
                    c,
                    kind,
                    min_len,
                    max_len,
                    alphabet,
                    limit,
                )
            },
            |v| DecodedValue::CharacterString(v.clone()),
        )
    }

    /// Enter an aggregate; fails once the configured depth is exceeded
    pub(crate) fn enter(&mut self) -> PerResult<()> {
        if self.depth >= self.config.max_depth {
            return Err(PerError::Malformed(format!(
                "nesting deeper than {} at bit {}",
                self.config.max_depth,
                self.cursor.bit_offset()
            )));
        }
        self.depth += 1;
        self.statistics.record_depth(self.depth);
        Ok(())
    }

    pub(crate) fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Run a named field's decode callback, recording it as a trace field
    pub(crate) fn decode_field<T>(
        &mut self,
        name: &'static str,
        decode: DecodeFn<T>,
    ) -> PerResult<T> {
        let start = self.cursor.bit_offset();
        let opened = self.open_item(name, start);
        self.level += 1;
        let result = decode(self);
        self.level -= 1;
        let end = self.cursor.bit_offset();
        if let (Some(trace), Some(index)) = (self.trace.as_mut(), opened) {
            trace.close(index, end);
        }
        let value = result?;
        self.statistics.increment_fields_decoded();
        log::trace!("{} decoded at bits {}..{}", name, start, end);
        Ok(value)
    }

    /// Read a single bookkeeping bit
    pub(crate) fn internal_bit(&mut self, name: &'static str) -> PerResult<bool> {
        self.internal(name, BitCursor::read_bit, |v| DecodedValue::Boolean(*v))
    }

    /// Read a presence bitmap of `count` bits
    pub(crate) fn internal_bitmap(
        &mut self,
        name: &'static str,
        count: u64,
    ) -> PerResult<Vec<bool>> {
        if count > self.cursor.bits_remaining() {
            return Err(PerError::truncated(count, self.cursor.bits_remaining()));
        }
        self.internal(
            name,
            |c| (0..count).map(|_| c.read_bit()).collect::<PerResult<Vec<bool>>>(),
            |bits| DecodedValue::BitString(bits_to_bit_string(bits)),
        )
    }

    pub(crate) fn internal_length(&mut self, name: &'static str) -> PerResult<u64> {
        self.internal(name, length::decode_length_determinant, |v| {
            DecodedValue::UnsignedLength(*v)
        })
    }

    pub(crate) fn internal_small_number(&mut self, name: &'static str) -> PerResult<u64> {
        self.internal(
            name,
            primitive::decode_normally_small_nonnegative_whole_number,
            |v| DecodedValue::Unsigned(*v),
        )
    }

    pub(crate) fn internal_constrained(
        &mut self,
        name: &'static str,
        min: u64,
        max: u64,
    ) -> PerResult<u64> {
        self.internal(
            name,
            |c| integer::decode_constrained_integer(c, min, Some(max)),
            |v| DecodedValue::Unsigned(*v),
        )
    }

    /// Decode `length` octets as an open type with `decode`, then place the
    /// cursor exactly at the end of the open type
    pub(crate) fn decode_bounded<R>(
        &mut self,
        length: u64,
        decode: impl FnOnce(&mut Self) -> PerResult<R>,
    ) -> PerResult<R> {
        let end = self.open_type_end(length)?;
        let saved = self.cursor.narrow_end(end)?;
        let result = decode(self);
        self.cursor.restore_end(saved);
        let value = result?;
        self.cursor.advance_to(end)?;
        self.statistics.increment_open_types_decoded();
        Ok(value)
    }

    /// Skip `length` octets of an open type nobody can decode
    pub(crate) fn skip_open_type(&mut self, length: u64) -> PerResult<()> {
        let end = self.open_type_end(length)?;
        self.cursor.advance_to(end)?;
        self.statistics.increment_unknown_extensions_skipped();
        Ok(())
    }

    fn open_type_end(&mut self, length: u64) -> PerResult<u64> {
        self.cursor.align_to_byte();
        let start = self.cursor.bit_offset();
        let end = length
            .checked_mul(8)
            .and_then(|bits| start.checked_add(bits))
            .ok_or_else(|| {
                PerError::Overflow(format!("open type length {} too large", length))
            })?;
        if end > self.cursor.end() {
            return Err(PerError::Malformed(format!(
                "open type of {} octets at bit {} overruns the buffer ({} bits left)",
                length,
                start,
                self.cursor.bits_remaining()
            )));
        }
        Ok(end)
    }

    fn leaf<R>(
        &mut self,
        name: &'static str,
        read: impl FnOnce(&mut BitCursor<'a>) -> PerResult<R>,
        describe: impl FnOnce(&R) -> DecodedValue,
    ) -> PerResult<R> {
        self.record(TraceKind::Value, name, read, describe)
    }

    fn internal<R>(
        &mut self,
        name: &'static str,
        read: impl FnOnce(&mut BitCursor<'a>) -> PerResult<R>,
        describe: impl FnOnce(&R) -> DecodedValue,
    ) -> PerResult<R> {
        self.record(TraceKind::Internal, name, read, describe)
    }

    fn record<R>(
        &mut self,
        kind: TraceKind,
        name: &'static str,
        read: impl FnOnce(&mut BitCursor<'a>) -> PerResult<R>,
        describe: impl FnOnce(&R) -> DecodedValue,
    ) -> PerResult<R> {
        let start = self.cursor.bit_offset();
        let value = read(&mut self.cursor)?;
        if let Some(trace) = self.trace.as_mut() {
            trace.push(TraceItem {
                level: self.level,
                name,
                kind,
                start_bit: start,
                end_bit: self.cursor.bit_offset(),
                value: Some(describe(&value)),
            });
        }
        Ok(value)
    }

    fn open_item(&mut self, name: &'static str, start: u64) -> Option<usize> {
        let level = self.level;
        self.trace.as_mut().map(|trace| {
            trace.push(TraceItem {
                level,
                name,
                kind: TraceKind::Field,
                start_bit: start,
                end_bit: start,
                value: None,
            })
        })
    }
}

fn bits_to_bit_string(bits: &[bool]) -> BitString {
    let mut bytes = vec![0u8; bits.len().div_ceil(8)];
    for (i, &bit) in bits.iter().enumerate() {
        if bit {
            bytes[i / 8] |= 0x80 >> (i % 8);
        }
    }
    // Octet count always matches the bit count
    BitString::new(bytes, bits.len() as u64).unwrap_or_else(|_| BitString::empty())
}
