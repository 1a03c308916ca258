//! Composite value tree assembled from SEQUENCE / CHOICE / SEQUENCE OF results

use crate::datatypes::decoded_value::DecodedValue;
use serde::{Deserialize, Serialize};

/// One named member of a decoded SEQUENCE
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub value: Value,
}

/// Generic decoded value tree
///
/// Schema-driven dissectors that do not need their own Rust types use this
/// as the `T` of their field/arm decode functions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Value {
    /// A leaf value
    Primitive(DecodedValue),
    /// SEQUENCE / SET members that were present, in wire order
    Sequence(Vec<Field>),
    /// Selected CHOICE alternative
    Choice {
        tag: i64,
        name: String,
        value: Box<Value>,
    },
    /// SEQUENCE OF / SET OF elements in wire order
    List(Vec<Value>),
    /// Extension addition or alternative the schema does not declare;
    /// `length` is the skipped open-type length in octets
    UnknownExtension { index: u64, length: u64 },
}

impl Value {
    /// Look up a present SEQUENCE member by name
    pub fn field(&self, name: &str) -> Option<&Value> {
        match self {
            Value::Sequence(fields) => fields.iter().find(|f| f.name == name).map(|f| &f.value),
            _ => None,
        }
    }

    pub fn as_primitive(&self) -> Option<&DecodedValue> {
        match self {
            Value::Primitive(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Tag and value of a CHOICE result
    pub fn as_choice(&self) -> Option<(i64, &Value)> {
        match self {
            Value::Choice { tag, value, .. } => Some((*tag, value)),
            _ => None,
        }
    }
}

impl From<DecodedValue> for Value {
    fn from(value: DecodedValue) -> Self {
        Value::Primitive(value)
    }
}
