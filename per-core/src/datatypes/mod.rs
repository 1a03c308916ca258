//! Data types produced by the PER decoders

pub mod bit_string;
pub mod decoded_value;
pub mod object_identifier;
pub mod value;

pub use bit_string::BitString;
pub use decoded_value::DecodedValue;
pub use object_identifier::ObjectIdentifier;
pub use value::{Field, Value};
