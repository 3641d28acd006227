//! Display labels for entity nodes.
//!
//! An attribute label is its key markers, its name and its formatted
//! datatype. Continuation lines of a multi-line datatype are aligned under
//! the first character of the type.

use unicode_width::UnicodeWidthStr;

use crate::datatype::DatatypeFormatter;
use crate::schema::{Attribute, Entity, Schema};

pub struct TextMetrics {
    pub char_width: f64,
    pub line_height: f64,
    pub padding_x: f64,
    pub padding_y: f64,
}

impl Default for TextMetrics {
    fn default() -> Self {
        Self {
            char_width: 8.0,
            line_height: 20.0,
            padding_x: 12.0,
            padding_y: 8.0,
        }
    }
}

impl TextMetrics {
    /// Width of the widest line.
    pub fn text_width(&self, text: &str) -> f64 {
        let width = text.split('\n').map(UnicodeWidthStr::width).max().unwrap_or(0);
        width as f64 * self.char_width
    }

    /// Padded size of a multi-line text block.
    pub fn block_size(&self, text: &str) -> (f64, f64) {
        let lines = text.split('\n').count();
        (
            self.text_width(text) + self.padding_x * 2.0,
            lines as f64 * self.line_height + self.padding_y * 2.0,
        )
    }
}

#[derive(Default)]
pub struct LabelRenderer {
    pub formatter: DatatypeFormatter,
    pub metrics: TextMetrics,
}

impl LabelRenderer {
    pub fn attribute_label(&self, attribute: &Attribute) -> String {
        let mut prefix = String::new();
        if attribute.primary_key {
            prefix.push_str("PK ");
        }
        if attribute.foreign_key.is_some() {
            prefix.push_str("FK ");
        }
        prefix.push_str(&attribute.name);
        prefix.push_str(": ");

        let hang = " ".repeat(UnicodeWidthStr::width(prefix.as_str()));
        let datatype = self.formatter.format(&attribute.datatype);
        tracing::trace!(
            attribute = %attribute.name,
            lines = datatype.lines().count(),
            "formatted datatype"
        );

        let mut label = prefix;
        for (i, line) in datatype.split('\n').enumerate() {
            if i > 0 {
                label.push('\n');
                label.push_str(&hang);
            }
            label.push_str(line);
        }

        if let Some(fk) = &attribute.foreign_key {
            label.push_str(&format!(" -> {}.{}", fk.entity, fk.attribute));
        }
        label
    }

    /// Entity name followed by its attribute labels, indented two spaces.
    pub fn entity_label(&self, entity: &Entity) -> String {
        let mut label = entity.name.clone();
        for attribute in &entity.attributes {
            for line in self.attribute_label(attribute).split('\n') {
                label.push_str("\n  ");
                label.push_str(line);
            }
        }
        label
    }

    pub fn schema_labels(&self, schema: &Schema) -> String {
        schema
            .entities()
            .iter()
            .map(|e| self.entity_label(e))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    pub fn entity_size(&self, entity: &Entity) -> (f64, f64) {
        self.metrics.block_size(&self.entity_label(entity))
    }
}
