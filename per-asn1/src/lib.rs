//! ASN.1 Packed Encoding Rules (aligned variant) decoding engine
//!
//! This crate turns a raw octet buffer into typed values according to
//! ITU-T X.691: a bit cursor, length determinants, constrained and
//! unconstrained integers, the primitive string types, and the
//! schema-driven SEQUENCE / CHOICE / SEQUENCE OF decoders that protocol
//! dissectors build on.
//!
//! # Layout
//!
//! - [`cursor`]: bit-level reader
//! - [`length`], [`integer`], [`primitive`]: leaf decoders on a cursor
//! - [`schema`]: field and alternative tables supplied by dissectors
//! - [`decoder`]: per-PDU context (configuration, depth, trace, statistics)
//! - [`aggregate`]: SEQUENCE, CHOICE, SEQUENCE OF / SET OF, open types
//! - [`trace`]: optional decode trace and its text rendering
//! - [`encoder`]: aligned PER writer for building test data
//!
//! # TODO
//!
//! - [ ] Fragmented length determinants (X.691 §10.9.3.8)
//! - [ ] UNALIGNED variant

pub mod aggregate;
pub mod config;
pub mod cursor;
pub mod decoder;
pub mod encoder;
pub mod integer;
pub mod length;
pub mod primitive;
pub mod schema;
pub mod statistics;
pub mod trace;


pub use aggregate::{ChoiceValue, DecodedField, SequenceValue, UnknownExtension};
pub use config::{DecoderConfig, DecoderConfigBuilder, DisplayOptions};
pub use cursor::BitCursor;
pub use decoder::{decode_pdu, DecodeOutcome, PerDecoder};
pub use encoder::PerEncoder;
pub use integer::{ConstraintRange, IntegerWidth};
pub use primitive::{CharacterStringKind, EnumeratedValue};
pub use schema::{ChoiceArm, DecodeFn, ExtensionMarker, FieldSpec};
pub use statistics::DecodeStatistics;
pub use trace::{DecodeTrace, TraceItem, TraceKind, TraceRenderer};
