//! per_rs - ASN.1 Packed Encoding Rules (aligned) decoding engine
//!
//! This library turns raw octet buffers into typed values according to
//! ITU-T X.691, for protocol dissectors that describe their messages as
//! static SEQUENCE / CHOICE tables.
//!
//! # Architecture
//!
//! This library is organized as a workspace with multiple crates:
//!
//! - `per-core`: error handling and decoded data types
//! - `per-asn1`: bit cursor, primitive and aggregate decoders, schema
//!   tables, decoder configuration, trace and statistics
//!
//! # Implementation Status
//!
//! ## ✅ 已完成
//! - 位游标、长度决定子（短格式、长格式）
//! - 约束/半约束/无约束整数
//! - BOOLEAN, NULL, ENUMERATED, OCTET STRING, BIT STRING, OBJECT IDENTIFIER
//! - GeneralString 与已知倍数字符串类型
//! - SEQUENCE（OPTIONAL、扩展）、CHOICE（扩展）、SEQUENCE OF / SET OF、开放类型
//! - 解码跟踪、统计、测试用编码器
//!
//! ## 📋 待实现
//! - 分段长度决定子（长度 > 16383）
//! - UNALIGNED 变体
//!
//! # Usage
//!
//! ```no_run
//! use per::{decode_pdu, DecoderConfig, FieldSpec, PerDecoder, PerResult, Value};
//!
//! fn active(d: &mut PerDecoder<'_>) -> PerResult<Value> {
//!     d.decode_boolean().map(|b| per::DecodedValue::Boolean(b).into())
//! }
//!
//! fn status(d: &mut PerDecoder<'_>) -> PerResult<Value> {
//!     d.decode_sequence(STATUS).map(Value::from)
//! }
//!
//! static STATUS: &[FieldSpec<Value>] = &[FieldSpec::new("active", active)];
//!
//! let outcome = decode_pdu(&[0x80], &DecoderConfig::default(), status)?;
//! assert!(outcome.value.field("active").is_some());
//! # Ok::<(), per::PerError>(())
//! ```

// Re-export core types
pub use per_core::{BitString, DecodedValue, Field, ObjectIdentifier, PerError, PerResult, Value};

// Re-export the decoding engine
pub use per_asn1::{
    decode_pdu, BitCursor, CharacterStringKind, ChoiceArm, ChoiceValue, ConstraintRange, DecodeFn,
    DecodeOutcome, DecodeStatistics, DecodeTrace, DecodedField, DecoderConfig, DecoderConfigBuilder,
    DisplayOptions, EnumeratedValue, ExtensionMarker, FieldSpec, PerDecoder, PerEncoder,
    SequenceValue, TraceItem, TraceKind, TraceRenderer, UnknownExtension,
};

// Leaf decoders that work on a bare cursor
pub mod primitive {
    pub use per_asn1::integer::{
        decode_constrained_integer, decode_constrained_signed_integer,
        decode_semi_constrained_integer, decode_unconstrained_integer,
    };
    pub use per_asn1::length::decode_length_determinant;
    pub use per_asn1::primitive::*;
}
