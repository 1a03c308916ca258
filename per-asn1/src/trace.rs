//! Decode trace and its text rendering
//!
//! When [`DecoderConfig::trace`](crate::DecoderConfig) is set, the decoder
//! records one [`TraceItem`] per field, leaf value and piece of PER
//! bookkeeping it reads. Whether the bookkeeping is shown is a rendering
//! decision ([`DisplayOptions`]) made after decoding.

use crate::config::DisplayOptions;
use per_core::DecodedValue;
use serde::Serialize;
use std::fmt;

/// What a trace item describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TraceKind {
    /// A named SEQUENCE member, CHOICE alternative or list element
    Field,
    /// A leaf value
    Value,
    /// PER bookkeeping (extension bits, presence bitmaps, lengths, indices)
    Internal,
}

/// One recorded item
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraceItem {
    pub level: usize,
    pub name: &'static str,
    pub kind: TraceKind,
    pub start_bit: u64,
    pub end_bit: u64,
    pub value: Option<DecodedValue>,
}

/// Items in the order they were read
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DecodeTrace {
    items: Vec<TraceItem>,
}

impl DecodeTrace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[TraceItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Names of the recorded fields, in wire order
    pub fn field_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.items
            .iter()
            .filter(|item| item.kind == TraceKind::Field)
            .map(|item| item.name)
    }

    pub(crate) fn push(&mut self, item: TraceItem) -> usize {
        self.items.push(item);
        self.items.len() - 1
    }

    /// Set the end of an item opened before its contents were decoded
    pub(crate) fn close(&mut self, index: usize, end_bit: u64) {
        if let Some(item) = self.items.get_mut(index) {
            item.end_bit = end_bit;
        }
    }
}

/// Renders a [`DecodeTrace`] as an indented text tree
///
/// # Usage Example
///
/// ```rust,no_run
/// use per_asn1::{DecodeTrace, DisplayOptions, TraceRenderer};
///
/// let trace = DecodeTrace::new();
/// let options = DisplayOptions::default();
/// println!("{}", TraceRenderer::new(&trace, &options));
/// ```
pub struct TraceRenderer<'a> {
    trace: &'a DecodeTrace,
    options: &'a DisplayOptions,
}

impl<'a> TraceRenderer<'a> {
    pub fn new(trace: &'a DecodeTrace, options: &'a DisplayOptions) -> Self {
        Self { trace, options }
    }

    /// Render the whole trace into a `String`
    pub fn render(trace: &DecodeTrace, options: &DisplayOptions) -> String {
        TraceRenderer::new(trace, options).to_string()
    }

    fn render_item(&self, f: &mut fmt::Formatter<'_>, item: &TraceItem) -> fmt::Result {
        write!(f, "{:indent$}{}", "", item.name, indent = item.level * 2)?;
        if let Some(value) = &item.value {
            write!(f, ": {}", value)?;
        }
        if self.options.show_bit_offsets {
            write!(f, " [bits {}..{}]", item.start_bit, item.end_bit)?;
        }
        writeln!(f)
    }
}

impl fmt::Display for TraceRenderer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shown = self
            .trace
            .items()
            .iter()
            .filter(|item| item.kind != TraceKind::Internal || self.options.show_internal_fields);
        for item in shown {
            self.render_item(f, item)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DecodeTrace {
        let mut trace = DecodeTrace::new();
        trace.push(TraceItem {
            level: 0,
            name: "extension bit",
            kind: TraceKind::Internal,
            start_bit: 0,
            end_bit: 1,
            value: Some(DecodedValue::Boolean(false)),
        });
        let field = trace.push(TraceItem {
            level: 0,
            name: "callReference",
            kind: TraceKind::Field,
            start_bit: 1,
            end_bit: 1,
            value: None,
        });
        trace.push(TraceItem {
            level: 1,
            name: "INTEGER",
            kind: TraceKind::Value,
            start_bit: 8,
            end_bit: 24,
            value: Some(DecodedValue::Unsigned(77)),
        });
        trace.close(field, 24);
        trace
    }

    #[test]
    fn test_render_hides_internal_fields_by_default() {
        let text = TraceRenderer::render(&sample(), &DisplayOptions::default());
        assert_eq!(text, "callReference [bits 1..24]\n  INTEGER: 77 [bits 8..24]\n");
    }

    #[test]
    fn test_render_internal_fields() {
        let options = DisplayOptions {
            show_internal_fields: true,
            show_bit_offsets: false,
        };
        let text = TraceRenderer::render(&sample(), &options);
        assert_eq!(text, "extension bit: FALSE\ncallReference\n  INTEGER: 77\n");
    }

    #[test]
    fn test_display_matches_render() {
        let trace = sample();
        let options = DisplayOptions::default();
        assert_eq!(
            format!("{}", TraceRenderer::new(&trace, &options)),
            TraceRenderer::render(&trace, &options)
        );
        assert_eq!(TraceRenderer::render(&DecodeTrace::new(), &options), "");
    }

    #[test]
    fn test_field_names() {
        let trace = sample();
        assert_eq!(trace.field_names().collect::<Vec<_>>(), vec!["callReference"]);
        assert_eq!(trace.len(), 3);
    }
}
