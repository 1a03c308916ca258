//! OBJECT IDENTIFIER value type

use crate::error::{PerError, PerResult};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

static DOTTED_OID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-2](\.(0|[1-9][0-9]*))+$").expect("valid OID pattern"));

/// Object identifier as a sequence of arcs, e.g. `[0, 0, 8, 2250, 0, 4]`.
///
/// The content octets follow X.690 §8.19: the first two arcs are packed into
/// one subidentifier (`arc0 * 40 + arc1`), every subidentifier is base-128
/// with the high bit set on all but its last octet.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectIdentifier {
    arcs: Vec<u32>,
}

impl ObjectIdentifier {
    /// Create an OID from its arcs.
    ///
    /// # Errors
    ///
    /// Returns `Malformed` if there are fewer than two arcs, the first arc is
    /// above 2, or the second arc is above 39 under arc 0 or 1.
    pub fn new(arcs: Vec<u32>) -> PerResult<Self> {
        if arcs.len() < 2 {
            return Err(PerError::Malformed(format!(
                "object identifier needs at least 2 arcs, got {}",
                arcs.len()
            )));
        }
        if arcs[0] > 2 || (arcs[0] < 2 && arcs[1] > 39) {
            return Err(PerError::Malformed(format!(
                "invalid leading arcs {}.{}",
                arcs[0], arcs[1]
            )));
        }
        Ok(Self { arcs })
    }

    /// Decode X.690 content octets.
    pub fn from_contents(contents: &[u8]) -> PerResult<Self> {
        if contents.is_empty() {
            return Err(PerError::Malformed(
                "empty object identifier encoding".to_string(),
            ));
        }

        let mut subidentifiers = Vec::new();
        let mut current: u32 = 0;
        let mut pending = false;
        for &byte in contents {
            if !pending && byte == 0x80 {
                return Err(PerError::Malformed(
                    "non-minimal object identifier subidentifier".to_string(),
                ));
            }
            current = current
                .checked_mul(128)
                .and_then(|v| v.checked_add(u32::from(byte & 0x7F)))
                .ok_or_else(|| {
                    PerError::Overflow("OID subidentifier exceeds 32 bits".to_string())
                })?;
            pending = byte & 0x80 != 0;
            if !pending {
                subidentifiers.push(current);
                current = 0;
            }
        }
        if pending {
            return Err(PerError::Malformed(
                "object identifier ends inside a subidentifier".to_string(),
            ));
        }

        let first = subidentifiers[0];
        let mut arcs = Vec::with_capacity(subidentifiers.len() + 1);
        match first {
            0..=39 => arcs.extend([0, first]),
            40..=79 => arcs.extend([1, first - 40]),
            _ => arcs.extend([2, first - 80]),
        }
        arcs.extend_from_slice(&subidentifiers[1..]);
        Ok(Self { arcs })
    }

    /// Encode to X.690 content octets.
    pub fn to_contents(&self) -> Vec<u8> {
        let mut out = Vec::new();
        let leading = |i: usize| u64::from(self.arcs.get(i).copied().unwrap_or(0));
        push_subidentifier(&mut out, leading(0) * 40 + leading(1));
        for &arc in self.arcs.iter().skip(2) {
            push_subidentifier(&mut out, u64::from(arc));
        }
        out
    }

    pub fn arcs(&self) -> &[u32] {
        &self.arcs
    }

    pub fn into_arcs(self) -> Vec<u32> {
        self.arcs
    }
}

fn push_subidentifier(out: &mut Vec<u8>, value: u64) {
    let mut groups = [0u8; 10];
    let mut n = 0;
    let mut v = value;
    loop {
        groups[n] = (v & 0x7F) as u8;
        n += 1;
        v >>= 7;
        if v == 0 {
            break;
        }
    }
    for i in (0..n).rev() {
        let continuation = if i > 0 { 0x80 } else { 0x00 };
        out.push(groups[i] | continuation);
    }
}

impl FromStr for ObjectIdentifier {
    type Err = PerError;

    fn from_str(s: &str) -> PerResult<Self> {
        if !DOTTED_OID.is_match(s) {
            return Err(PerError::Malformed(format!(
                "invalid object identifier notation: {}",
                s
            )));
        }
        let arcs = s
            .split('.')
            .map(|part| {
                part.parse::<u32>()
                    .map_err(|_| PerError::Overflow(format!("arc {} exceeds 32 bits", part)))
            })
            .collect::<PerResult<Vec<u32>>>()?;
        Self::new(arcs)
    }
}

impl fmt::Display for ObjectIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, arc) in self.arcs.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            write!(f, "{}", arc)?;
        }
        Ok(())
    }
}
