//! Page-level types.

use super::PdfTable;
use serde::{Deserialize, Serialize};

/// Extraction record for a single PDF page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PdfPage {
    /// Page number (1-indexed)
    pub page_number: u32,

    /// Extracted text, empty when the page has none
    pub text: String,

    /// Accepted ruled-line tables in detection order
    pub tables: Vec<PdfTable>,
}

impl PdfPage {
    /// Create an empty page record.
    pub fn new(page_number: u32) -> Self {
        Self {
            page_number,
            text: String::new(),
            tables: Vec::new(),
        }
    }

    /// Check if the page carries neither text nor tables.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.tables.is_empty()
    }

    /// Get the number of tables on the page.
    pub fn table_count(&self) -> usize {
        self.tables.len()
    }
}
