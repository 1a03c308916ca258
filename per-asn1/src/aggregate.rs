//! SEQUENCE, CHOICE, SEQUENCE OF / SET OF and open type decoding
//!
//! The aggregate decoders walk a schema table and call each member's
//! [`DecodeFn`] on the same [`PerDecoder`], so nested aggregates recurse
//! through ordinary function calls. Every aggregate and open type counts
//! against [`DecoderConfig::max_depth`](crate::DecoderConfig).
//!
//! Extension additions and extension alternatives that the table does not
//! declare are skipped by their open-type length; this is the only case in
//! which the decoder continues past something it cannot interpret.

use crate::decoder::PerDecoder;
use crate::integer::ConstraintRange;
use crate::length::decode_length_determinant;
use crate::primitive::SIXTY_FOUR_K;
use crate::schema::{ChoiceArm, DecodeFn, ExtensionMarker, FieldSpec};
use per_core::{Field, PerError, PerResult, Value};

/// A SEQUENCE member that was present on the wire
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedField<T> {
    /// Position of the member in the field table
    pub index: usize,
    pub name: &'static str,
    pub value: T,
}

/// Extension addition or alternative skipped by length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownExtension {
    /// Index among the extension additions (or extension alternatives)
    pub index: u64,
    /// Open-type length in octets
    pub length: u64,
}

/// Result of [`PerDecoder::decode_sequence`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceValue<T> {
    /// Present members in wire order
    pub fields: Vec<DecodedField<T>>,
    pub unknown_extensions: Vec<UnknownExtension>,
}

impl<T> SequenceValue<T> {
    pub fn get(&self, name: &str) -> Option<&T> {
        self.fields.iter().find(|f| f.name == name).map(|f| &f.value)
    }

    pub fn is_present(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Result of [`PerDecoder::decode_choice`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChoiceValue<T> {
    Known {
        tag: i64,
        name: &'static str,
        /// Selected through the extension index
        extension: bool,
        value: T,
    },
    UnknownExtension(UnknownExtension),
}

impl<T> ChoiceValue<T> {
    /// Tag of the selected alternative, `None` for an unknown extension
    pub fn tag(&self) -> Option<i64> {
        match self {
            ChoiceValue::Known { tag, .. } => Some(*tag),
            ChoiceValue::UnknownExtension(_) => None,
        }
    }
}

impl From<SequenceValue<Value>> for Value {
    fn from(sequence: SequenceValue<Value>) -> Self {
        let mut fields: Vec<Field> = sequence
            .fields
            .into_iter()
            .map(|f| Field {
                name: f.name.to_string(),
                value: f.value,
            })
            .collect();
        fields.extend(sequence.unknown_extensions.into_iter().map(|ext| Field {
            name: format!("extension {}", ext.index),
            value: Value::UnknownExtension {
                index: ext.index,
                length: ext.length,
            },
        }));
        Value::Sequence(fields)
    }
}

impl From<ChoiceValue<Value>> for Value {
    fn from(choice: ChoiceValue<Value>) -> Self {
        match choice {
            ChoiceValue::Known { tag, name, value, .. } => Value::Choice {
                tag,
                name: name.to_string(),
                value: Box::new(value),
            },
            ChoiceValue::UnknownExtension(ext) => Value::UnknownExtension {
                index: ext.index,
                length: ext.length,
            },
        }
    }
}

impl PerDecoder<'_> {
    /// Decode a SEQUENCE (or SET) described by `fields` (X.691 §18)
    ///
    /// # Arguments
    /// * `fields` - Member table: root members first, extension additions
    ///   after them, both in declaration order
    ///
    /// # Returns
    /// Returns the present members in wire order. Extension additions the
    /// table does not declare are skipped and listed in
    /// [`SequenceValue::unknown_extensions`].
    ///
    /// # Error Handling
    /// - `Truncated` if the input ends inside the SEQUENCE
    /// - `Malformed` if an open-type length overruns the input or the
    ///   nesting limit is exceeded
    /// - Any error returned by a member callback
    pub fn decode_sequence<T>(&mut self, fields: &[FieldSpec<T>]) -> PerResult<SequenceValue<T>> {
        self.nested(|d| d.sequence_body(fields))
    }

    fn sequence_body<T>(&mut self, fields: &[FieldSpec<T>]) -> PerResult<SequenceValue<T>> {
        let extensible = fields
            .first()
            .is_some_and(|f| f.extension != ExtensionMarker::NotExtension);
        let extension_present = extensible && self.internal_bit("extension bit")?;

        let optional_count = fields
            .iter()
            .filter(|f| f.extension.is_root() && f.optional)
            .count() as u64;
        let presence = self.internal_bitmap("optional bitmap", optional_count)?;
        let mut presence = presence.into_iter();

        let mut result = SequenceValue {
            fields: Vec::new(),
            unknown_extensions: Vec::new(),
        };
        for (index, field) in fields.iter().enumerate() {
            if !field.extension.is_root() {
                continue;
            }
            // The bitmap holds exactly one bit per optional root member
            if field.optional && !presence.next().unwrap_or(false) {
                continue;
            }
            let value = self.decode_field(field.name, field.decode)?;
            result.fields.push(DecodedField {
                index,
                name: field.name,
                value,
            });
        }

        if extension_present {
            self.sequence_extensions(fields, &mut result)?;
        }
        Ok(result)
    }

    fn sequence_extensions<T>(
        &mut self,
        fields: &[FieldSpec<T>],
        result: &mut SequenceValue<T>,
    ) -> PerResult<()> {
        let count = self
            .internal_small_number("extension count")?
            .checked_add(1)
            .ok_or_else(|| PerError::Overflow("extension addition count".to_string()))?;
        let present = self.internal_bitmap("extension bitmap", count)?;

        let mut additions = fields
            .iter()
            .enumerate()
            .filter(|(_, f)| !f.extension.is_root());
        for (addition, is_present) in (0u64..).zip(present) {
            let declared = additions.next();
            if !is_present {
                continue;
            }
            let length = self.internal_length("open type length")?;
            match declared {
                Some((index, field)) => {
                    let value = self
                        .decode_bounded(length, |d| d.decode_field(field.name, field.decode))?;
                    result.fields.push(DecodedField {
                        index,
                        name: field.name,
                        value,
                    });
                }
                None => {
                    log::debug!(
                        "skipping unknown SEQUENCE extension addition {} ({} octets) at bit {}",
                        addition,
                        length,
                        self.bit_offset()
                    );
                    self.skip_open_type(length)?;
                    result.unknown_extensions.push(UnknownExtension {
                        index: addition,
                        length,
                    });
                }
            }
        }
        Ok(())
    }

    /// Decode a CHOICE described by `arms` (X.691 §23)
    ///
    /// # Returns
    /// Returns the selected alternative, or
    /// [`ChoiceValue::UnknownExtension`] when the extension index is not in
    /// the table. The unknown alternative's open type is skipped whole.
    ///
    /// # Error Handling
    /// Returns `Malformed` for a root index outside the root alternatives,
    /// a table without root alternatives, or an overrunning open type.
    pub fn decode_choice<T>(&mut self, arms: &[ChoiceArm<T>]) -> PerResult<ChoiceValue<T>> {
        self.nested(|d| d.choice_body(arms))
    }

    fn choice_body<T>(&mut self, arms: &[ChoiceArm<T>]) -> PerResult<ChoiceValue<T>> {
        let extensible = arms
            .iter()
            .any(|arm| arm.extension != ExtensionMarker::NotExtension);
        if extensible && self.internal_bit("extension bit")? {
            return self.choice_extension(arms);
        }

        let root_count = arms.iter().filter(|arm| arm.extension.is_root()).count() as u64;
        if root_count == 0 {
            return Err(PerError::Malformed(
                "CHOICE without root alternatives".to_string(),
            ));
        }
        let index = self.internal_constrained("choice index", 0, root_count - 1)?;
        let arm = usize::try_from(index)
            .ok()
            .and_then(|i| arms.iter().filter(|arm| arm.extension.is_root()).nth(i))
            .ok_or_else(|| {
                PerError::Malformed(format!(
                    "CHOICE index {} outside {} root alternatives",
                    index, root_count
                ))
            })?;
        let value = self.decode_field(arm.name, arm.decode)?;
        Ok(ChoiceValue::Known {
            tag: arm.tag,
            name: arm.name,
            extension: false,
            value,
        })
    }

    fn choice_extension<T>(&mut self, arms: &[ChoiceArm<T>]) -> PerResult<ChoiceValue<T>> {
        let index = self.internal_small_number("extension choice index")?;
        let length = self.internal_length("open type length")?;
        let declared = usize::try_from(index)
            .ok()
            .and_then(|i| arms.iter().filter(|arm| !arm.extension.is_root()).nth(i));

        match declared {
            Some(arm) => {
                let value =
                    self.decode_bounded(length, |d| d.decode_field(arm.name, arm.decode))?;
                Ok(ChoiceValue::Known {
                    tag: arm.tag,
                    name: arm.name,
                    extension: true,
                    value,
                })
            }
            None => {
                log::debug!(
                    "skipping unknown CHOICE extension alternative {} ({} octets) at bit {}",
                    index,
                    length,
                    self.bit_offset()
                );
                self.skip_open_type(length)?;
                Ok(ChoiceValue::UnknownExtension(UnknownExtension { index, length }))
            }
        }
    }

    /// Decode a SEQUENCE OF with the given SIZE constraint (X.691 §20)
    ///
    /// # Arguments
    /// * `size` - SIZE constraint on the element count; an extensible
    ///   constraint reads an extension bit first
    /// * `element` - Decode callback for one element
    ///
    /// # Error Handling
    /// Returns `Malformed` if the count is outside `size` or above
    /// [`DecoderConfig::max_sequence_of_len`](crate::DecoderConfig).
    pub fn decode_sequence_of<T>(
        &mut self,
        size: ConstraintRange,
        element: DecodeFn<T>,
    ) -> PerResult<Vec<T>> {
        self.nested(|d| d.list_body("item", size, element))
    }

    /// Decode a SET OF; identical to SEQUENCE OF on the wire
    pub fn decode_set_of<T>(
        &mut self,
        size: ConstraintRange,
        element: DecodeFn<T>,
    ) -> PerResult<Vec<T>> {
        self.nested(|d| d.list_body("member", size, element))
    }

    fn list_body<T>(
        &mut self,
        name: &'static str,
        size: ConstraintRange,
        element: DecodeFn<T>,
    ) -> PerResult<Vec<T>> {
        let count = self.element_count(size)?;
        let limit = self.config().max_sequence_of_len;
        if count > limit {
            return Err(PerError::Malformed(format!(
                "{} elements exceed the limit of {}",
                count, limit
            )));
        }

        // Elements may be zero bits wide, so the count alone bounds nothing
        let mut items = Vec::with_capacity(count.min(self.bits_remaining()) as usize);
        for _ in 0..count {
            items.push(self.decode_field(name, element)?);
        }
        Ok(items)
    }

    fn element_count(&mut self, size: ConstraintRange) -> PerResult<u64> {
        if size.extensible && self.internal_bit("size extension bit")? {
            return self.internal_length("count");
        }
        let count = match size.max {
            Some(max) if max < SIXTY_FOUR_K => {
                self.internal_constrained("count", size.min, max)?
            }
            _ => self.internal_length("count")?,
        };
        if count < size.min || size.max.is_some_and(|max| count > max) {
            return Err(PerError::Malformed(format!(
                "{} elements outside SIZE({}..{:?})",
                count, size.min, size.max
            )));
        }
        Ok(count)
    }

    /// Decode an open type: a length determinant in octets followed by an
    /// encoding of exactly that size (X.691 §11.2)
    ///
    /// `decode` may not read past the open type, and the cursor ends up on
    /// the octet after it however much `decode` consumed.
    pub fn decode_open_type<T>(&mut self, decode: DecodeFn<T>) -> PerResult<T> {
        self.nested(|d| {
            let length = d.internal_length("open type length")?;
            d.decode_bounded(length, |d| decode(d))
        })
    }

    /// Skip an open type without interpreting it, returning its length
    pub fn skip_unknown_open_type(&mut self) -> PerResult<u64> {
        let length = decode_length_determinant(self.cursor_mut())?;
        self.skip_open_type(length)?;
        Ok(length)
    }

    fn nested<R>(&mut self, body: impl FnOnce(&mut Self) -> PerResult<R>) -> PerResult<R> {
        self.enter()?;
        let result = body(self);
        self.leave();
        result
    }
}
