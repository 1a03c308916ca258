//! Schema tables consumed by the aggregate decoders
//!
//! Protocol dissectors describe each SEQUENCE as a slice of [`FieldSpec`]
//! and each CHOICE as a slice of [`ChoiceArm`]. The tables hold only
//! names, flags and plain function pointers, so they can live in `static`
//! items and be shared between threads decoding different PDUs.
//!
//! # Usage Example
//!
//! ```rust,no_run
//! use per_asn1::{FieldSpec, PerDecoder};
//! use per_core::{DecodedValue, PerResult, Value};
//!
//! fn flag(d: &mut PerDecoder<'_>) -> PerResult<Value> {
//!     d.decode_boolean().map(|b| Value::Primitive(DecodedValue::Boolean(b)))
//! }
//!
//! static FIELDS: &[FieldSpec<Value>] = &[
//!     FieldSpec::new("active", flag).in_root(),
//!     FieldSpec::new("preferred", flag).optional().in_root(),
//! ];
//! ```

use crate::decoder::PerDecoder;
use per_core::PerResult;
use std::fmt;

/// Decode callback for one SEQUENCE member, CHOICE alternative or
/// SEQUENCE OF element
pub type DecodeFn<T> = fn(&mut PerDecoder<'_>) -> PerResult<T>;

/// Where a member sits relative to the extension marker `...`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtensionMarker {
    /// The enclosing type has no extension marker
    NotExtension,
    /// Member of the extension root of an extensible type
    ExtensionRoot,
    /// Extension addition
    NotExtensionRoot,
}

impl ExtensionMarker {
    /// Whether the member belongs to the extension root (or the type is
    /// not extensible at all)
    pub fn is_root(self) -> bool {
        !matches!(self, ExtensionMarker::NotExtensionRoot)
    }
}

/// One SEQUENCE member
pub struct FieldSpec<T> {
    pub name: &'static str,
    pub extension: ExtensionMarker,
    pub optional: bool,
    pub decode: DecodeFn<T>,
}

impl<T> FieldSpec<T> {
    /// Mandatory member of a non-extensible SEQUENCE
    pub const fn new(name: &'static str, decode: DecodeFn<T>) -> Self {
        Self {
            name,
            extension: ExtensionMarker::NotExtension,
            optional: false,
            decode,
        }
    }

    /// Mark the member OPTIONAL (or DEFAULT)
    pub const fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Member of the extension root of an extensible SEQUENCE
    pub const fn in_root(mut self) -> Self {
        self.extension = ExtensionMarker::ExtensionRoot;
        self
    }

    /// Extension addition
    pub const fn addition(mut self) -> Self {
        self.extension = ExtensionMarker::NotExtensionRoot;
        self
    }
}

impl<T> Clone for FieldSpec<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for FieldSpec<T> {}

impl<T> fmt::Debug for FieldSpec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldSpec")
            .field("name", &self.name)
            .field("extension", &self.extension)
            .field("optional", &self.optional)
            .finish_non_exhaustive()
    }
}

/// One CHOICE alternative
///
/// Alternatives are numbered on the wire by their position among the arms
/// of the same category: root arms `0..N` and extension arms `0..M`, each
/// in declaration order. `tag` is the value reported to the caller.
pub struct ChoiceArm<T> {
    pub tag: i64,
    pub name: &'static str,
    pub extension: ExtensionMarker,
    pub decode: DecodeFn<T>,
}

impl<T> ChoiceArm<T> {
    /// Alternative of a non-extensible CHOICE
    pub const fn new(tag: i64, name: &'static str, decode: DecodeFn<T>) -> Self {
        Self {
            tag,
            name,
            extension: ExtensionMarker::NotExtension,
            decode,
        }
    }

    /// Root alternative of an extensible CHOICE
    pub const fn in_root(mut self) -> Self {
        self.extension = ExtensionMarker::ExtensionRoot;
        self
    }

    /// Extension alternative
    pub const fn addition(mut self) -> Self {
        self.extension = ExtensionMarker::NotExtensionRoot;
        self
    }
}

impl<T> Clone for ChoiceArm<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ChoiceArm<T> {}

impl<T> fmt::Debug for ChoiceArm<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChoiceArm")
            .field("tag", &self.tag)
            .field("name", &self.name)
            .field("extension", &self.extension)
            .finish_non_exhaustive()
    }
}
