//! Spreadsheet extractor.

use std::path::Path;

use crate::detect::DocumentKind;
use crate::error::Result;
use crate::model::ExtractionResult;

use super::Extractor;

/// Extracts every sheet of a workbook as a string grid.
#[derive(Debug, Clone, Default)]
pub struct SpreadsheetExtractor {
    _private: (),
}

impl SpreadsheetExtractor {
    /// Create a new spreadsheet extractor.
    pub fn new() -> Self {
        Self { _private: () }
    }
}

impl Extractor for SpreadsheetExtractor {
    fn supported_extensions(&self) -> &[&str] {
        &["xlsx", "xlsm", "xls", "ods"]
    }

    fn name(&self) -> &str {
        "spreadsheet"
    }

    fn kind(&self) -> DocumentKind {
        DocumentKind::Spreadsheet
    }

    fn extract(&self, path: &Path) -> Result<ExtractionResult> {
        crate::extract_spreadsheet(path).map(Into::into)
    }

    fn extract_bytes(&self, bytes: &[u8], name: &str) -> Result<ExtractionResult> {
        crate::extract_spreadsheet_bytes(bytes, name).map(Into::into)
    }
}
