//! Decoder configuration
//!
//! # Usage Example
//!
//! ```rust,no_run
//! use per_asn1::DecoderConfig;
//!
//! let config = DecoderConfig::builder()
//!     .max_depth(32)
//!     .trace(true)
//!     .build();
//! ```

use serde::{Deserialize, Serialize};

/// Default nesting bound for SEQUENCE / CHOICE / SEQUENCE OF / open types
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Default bound on SEQUENCE OF / SET OF element counts
pub const DEFAULT_MAX_SEQUENCE_OF_LEN: u64 = 65536;

/// Default bound on the character count of a restricted character string
pub const DEFAULT_MAX_STRING_LEN: u64 = 65536;

/// Limits and options for one decode pass
///
/// The configuration is handed to each [`PerDecoder`](crate::PerDecoder)
/// explicitly; nothing is read from global state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    /// Maximum aggregate nesting depth; deeper input is `Malformed`
    pub max_depth: usize,
    /// Maximum element count of a SEQUENCE OF / SET OF
    pub max_sequence_of_len: u64,
    /// Maximum character count of a restricted character string
    pub max_string_len: u64,
    /// Record a [`DecodeTrace`](crate::DecodeTrace) while decoding
    pub trace: bool,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_sequence_of_len: DEFAULT_MAX_SEQUENCE_OF_LEN,
            max_string_len: DEFAULT_MAX_STRING_LEN,
            trace: false,
        }
    }
}

impl DecoderConfig {
    pub fn builder() -> DecoderConfigBuilder {
        DecoderConfigBuilder::new()
    }
}

/// Builder for [`DecoderConfig`]
#[derive(Debug, Clone, Default)]
pub struct DecoderConfigBuilder {
    config: DecoderConfig,
}

impl DecoderConfigBuilder {
    /// Create a builder with default settings
    ///
    /// # Default Settings
    /// - Max depth: 64
    /// - Max SEQUENCE OF length: 65536
    /// - Max character string length: 65536
    /// - Trace: off
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the nesting bound (at least 1)
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.config.max_depth = depth.max(1);
        self
    }

    /// Set the SEQUENCE OF / SET OF element bound
    pub fn max_sequence_of_len(mut self, len: u64) -> Self {
        self.config.max_sequence_of_len = len;
        self
    }

    /// Set the character count bound for restricted character strings
    ///
    /// Characters from a single-character alphabet take no bits on the
    /// wire, so only this bound limits what such a string allocates.
    pub fn max_string_len(mut self, len: u64) -> Self {
        self.config.max_string_len = len;
        self
    }

    /// Enable or disable trace recording
    pub fn trace(mut self, enabled: bool) -> Self {
        self.config.trace = enabled;
        self
    }

    pub fn build(self) -> DecoderConfig {
        self.config
    }
}

/// Presentation options for [`TraceRenderer`](crate::TraceRenderer)
///
/// These only affect how a recorded trace is shown, never what is decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayOptions {
    /// Show PER bookkeeping: extension bits, presence bitmaps, lengths,
    /// choice indices
    pub show_internal_fields: bool,
    /// Append the bit range of each item
    pub show_bit_offsets: bool,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            show_internal_fields: false,
            show_bit_offsets: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let config = DecoderConfigBuilder::new().build();
        assert_eq!(config, DecoderConfig::default());
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
        assert!(!config.trace);
    }

    #[test]
    fn test_builder_overrides() {
        let config = DecoderConfig::builder()
            .max_depth(0)
            .max_sequence_of_len(10)
            .max_string_len(20)
            .trace(true)
            .build();
        assert_eq!(config.max_depth, 1);
        assert_eq!(config.max_sequence_of_len, 10);
        assert_eq!(config.max_string_len, 20);
        assert!(config.trace);
    }
}
