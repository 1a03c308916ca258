//! Bit string type produced by the BIT STRING decoder

use crate::error::{PerError, PerResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Arbitrary string of bits, MSB-first within each octet. May be empty.
///
/// Bits past `num_bits` in the last octet are always zero.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BitString {
    #[serde(with = "serde_bytes")]
    bytes: Vec<u8>,
    num_bits: u64,
}

impl BitString {
    /// Construct a bit string from its packed octets.
    ///
    /// # Errors
    ///
    /// Returns `Malformed` if `bytes` cannot hold `num_bits` bits, or holds
    /// more than one octet of slack.
    pub fn new(mut bytes: Vec<u8>, num_bits: u64) -> PerResult<Self> {
        let needed = num_bits.div_ceil(8);
        if bytes.len() as u64 != needed {
            return Err(PerError::Malformed(format!(
                "bit string of {} bits needs {} octets, got {}",
                num_bits,
                needed,
                bytes.len()
            )));
        }
        let unused = (needed * 8 - num_bits) as u32;
        if unused > 0 {
            if let Some(last) = bytes.last_mut() {
                *last &= 0xFFu8 << unused;
            }
        }
        Ok(Self { bytes, num_bits })
    }

    /// The empty bit string
    pub fn empty() -> Self {
        Self {
            bytes: Vec::new(),
            num_bits: 0,
        }
    }

    /// The packed octets
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The number of bits
    pub fn num_bits(&self) -> u64 {
        self.num_bits
    }

    pub fn is_empty(&self) -> bool {
        self.num_bits == 0
    }

    /// Get the bit at `index` (0 = first bit on the wire).
    ///
    /// Returns `None` when the index is out of range.
    pub fn get(&self, index: u64) -> Option<bool> {
        if index >= self.num_bits {
            return None;
        }
        let byte = self.bytes[(index / 8) as usize];
        Some((byte >> (7 - (index % 8))) & 1 == 1)
    }

    /// Iterate over the bits in wire order
    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.num_bits).filter_map(move |i| self.get(i))
    }
}

impl fmt::Display for BitString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'")?;
        for bit in self.iter() {
            write!(f, "{}", if bit { '1' } else { '0' })?;
        }
        write!(f, "'B")
    }
}
