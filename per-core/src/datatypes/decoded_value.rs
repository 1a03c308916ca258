//! Leaf values produced by the primitive PER decoders

use crate::datatypes::bit_string::BitString;
use crate::datatypes::object_identifier::ObjectIdentifier;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Result of a primitive (leaf) decoder
///
/// Dissectors either consume these directly or wrap them in a [`Value`]
/// tree when assembling SEQUENCE / CHOICE results.
///
/// [`Value`]: crate::datatypes::Value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecodedValue {
    /// NULL (no content bits)
    Null,
    /// BOOLEAN
    Boolean(bool),
    /// Signed INTEGER
    Integer(i64),
    /// Non-negative INTEGER from a constrained range
    Unsigned(u64),
    /// Length determinant or element count
    UnsignedLength(u64),
    /// ENUMERATED index; `extension` is set for extension-addition values
    Enumerated { index: u64, extension: bool },
    /// OCTET STRING
    Bytes(#[serde(with = "serde_bytes")] Vec<u8>),
    /// BIT STRING
    BitString(BitString),
    /// OBJECT IDENTIFIER
    ObjectIdentifier(ObjectIdentifier),
    /// GeneralString octets, not validated as any character set
    GeneralString(#[serde(with = "serde_bytes")] Vec<u8>),
    /// Known-multiplier character string (IA5String, PrintableString, ...)
    CharacterString(String),
}

impl DecodedValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            DecodedValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Integer view of `Integer`, `Unsigned` and `UnsignedLength` values
    /// that fit in an `i64`
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            DecodedValue::Integer(v) => Some(*v),
            DecodedValue::Unsigned(v) | DecodedValue::UnsignedLength(v) => i64::try_from(*v).ok(),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            DecodedValue::Unsigned(v) | DecodedValue::UnsignedLength(v) => Some(*v),
            DecodedValue::Integer(v) => u64::try_from(*v).ok(),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            DecodedValue::Bytes(b) | DecodedValue::GeneralString(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            DecodedValue::CharacterString(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for DecodedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodedValue::Null => write!(f, "NULL"),
            DecodedValue::Boolean(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
            DecodedValue::Integer(v) => write!(f, "{}", v),
            DecodedValue::Unsigned(v) | DecodedValue::UnsignedLength(v) => write!(f, "{}", v),
            DecodedValue::Enumerated { index, extension } => {
                if *extension {
                    write!(f, "extension({})", index)
                } else {
                    write!(f, "{}", index)
                }
            }
            DecodedValue::Bytes(bytes) | DecodedValue::GeneralString(bytes) => {
                for byte in bytes {
                    write!(f, "{:02x}", byte)?;
                }
                Ok(())
            }
            DecodedValue::BitString(bits) => write!(f, "{}", bits),
            DecodedValue::ObjectIdentifier(oid) => write!(f, "{}", oid),
            DecodedValue::CharacterString(s) => write!(f, "\"{}\"", s),
        }
    }
}
