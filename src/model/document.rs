//! Word-processing document element types.

use serde::{Deserialize, Serialize};

use super::TableContent;

/// One emitted block of a word-processing document.
///
/// Serializes as `{"element_id": .., "type": "paragraph"|"table", "content": ..}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentElement {
    /// 1-based position of the block in walk order.
    pub element_id: u32,

    /// Kind and payload of the element
    #[serde(flatten)]
    pub content: ElementContent,
}

impl DocumentElement {
    /// Create a paragraph element.
    pub fn paragraph(element_id: u32, text: impl Into<String>) -> Self {
        Self {
            element_id,
            content: ElementContent::Paragraph(text.into()),
        }
    }

    /// Create a table element.
    pub fn table(element_id: u32, table: TableContent) -> Self {
        Self {
            element_id,
            content: ElementContent::Table(table),
        }
    }

    /// Whether this element is a paragraph.
    pub fn is_paragraph(&self) -> bool {
        matches!(self.content, ElementContent::Paragraph(_))
    }

    /// Whether this element is a table.
    pub fn is_table(&self) -> bool {
        matches!(self.content, ElementContent::Table(_))
    }

    /// Paragraph text, if this is a paragraph.
    pub fn text(&self) -> Option<&str> {
        match &self.content {
            ElementContent::Paragraph(text) => Some(text),
            ElementContent::Table(_) => None,
        }
    }

    /// Table payload, if this is a table.
    pub fn as_table(&self) -> Option<&TableContent> {
        match &self.content {
            ElementContent::Table(table) => Some(table),
            ElementContent::Paragraph(_) => None,
        }
    }
}

/// Tagged payload of a [`DocumentElement`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "content", rename_all = "lowercase")]
pub enum ElementContent {
    /// Trimmed, non-empty paragraph text
    Paragraph(String),
    /// Flattened table
    Table(TableContent),
}

/// Running totals over one document walk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentStatistics {
    /// Non-empty paragraphs emitted
    pub paragraphs: usize,

    /// Tables emitted
    pub tables: usize,

    /// Sum of table row counts
    pub table_rows: usize,

    /// Sum of table cell counts
    pub table_cells: usize,

    /// Blocks visited by the walk, including empty paragraphs
    pub total_elements: usize,
}

impl DocumentStatistics {
    /// Blocks visited but not emitted (empty paragraphs).
    pub fn skipped_elements(&self) -> usize {
        self.total_elements
            .saturating_sub(self.paragraphs + self.tables)
    }
}
