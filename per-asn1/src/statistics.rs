//! Per-decode statistics

use serde::Serialize;

/// Counters collected during one decode pass
///
/// Useful when a dissector wants to flag PDUs from a newer protocol
/// revision (unknown extensions) or unusually deep nesting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DecodeStatistics {
    /// SEQUENCE members, CHOICE alternatives and SEQUENCE OF elements decoded
    pub fields_decoded: u64,
    /// Open types decoded through a declared extension
    pub open_types_decoded: u64,
    /// Unknown extension additions/alternatives skipped by length
    pub unknown_extensions_skipped: u64,
    /// Deepest aggregate nesting seen
    pub max_depth_reached: usize,
}

impl DecodeStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset all counters to zero
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn increment_fields_decoded(&mut self) {
        self.fields_decoded += 1;
    }

    pub fn increment_open_types_decoded(&mut self) {
        self.open_types_decoded += 1;
    }

    pub fn increment_unknown_extensions_skipped(&mut self) {
        self.unknown_extensions_skipped += 1;
    }

    pub fn record_depth(&mut self, depth: usize) {
        self.max_depth_reached = self.max_depth_reached.max(depth);
    }

    /// Whether the PDU carried anything this schema does not know about
    pub fn has_unknown_extensions(&self) -> bool {
        self.unknown_extensions_skipped > 0
    }
}
