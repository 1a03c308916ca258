//! Core types and utilities for the ASN.1 PER decoding engine
//!
//! This crate provides the error taxonomy and the decoded value types
//! shared by the PER engine (`per-asn1`) and the protocol dissectors
//! built on top of it.

pub mod error;
pub mod datatypes;

pub use error::{PerError, PerResult};
pub use datatypes::{BitString, DecodedValue, Field, ObjectIdentifier, Value};
