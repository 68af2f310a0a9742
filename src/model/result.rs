//! Result envelopes, one per input family.

use serde::{Deserialize, Serialize};

use super::{DocumentElement, DocumentStatistics, PdfPage, SheetGrid};
use crate::detect::DocumentKind;
use crate::error::Degradation;

/// Ordered elements and statistics of a word-processing document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentResult {
    /// File name of the input, without directories
    pub file_name: String,

    /// Emitted elements in walk order
    pub elements: Vec<DocumentElement>,

    /// Totals accumulated during the walk
    pub statistics: DocumentStatistics,
}

/// Per-page records of a PDF document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PdfResult {
    /// Path of the input as given by the caller
    pub source_file: String,

    /// One record per page, in page order
    pub pages: Vec<PdfPage>,

    /// Pages whose text or table detection failed
    #[serde(skip)]
    pub degraded: Vec<Degradation>,
}

impl PdfResult {
    /// Total number of accepted tables across all pages.
    pub fn table_count(&self) -> usize {
        self.pages.iter().map(PdfPage::table_count).sum()
    }

    /// Pages with non-empty text.
    pub fn pages_with_text(&self) -> usize {
        self.pages.iter().filter(|p| !p.text.is_empty()).count()
    }
}

/// Per-sheet grids of a spreadsheet workbook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpreadsheetResult {
    /// Path of the input as given by the caller
    pub source_file: String,

    /// Readable sheets in workbook order
    pub sheets: Vec<SheetGrid>,

    /// Sheets that were omitted because they could not be read
    #[serde(skip)]
    pub degraded: Vec<Degradation>,
}

/// Any of the three envelopes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExtractionResult {
    /// Word-processing document
    Document(DocumentResult),
    /// PDF document
    Pdf(PdfResult),
    /// Spreadsheet workbook
    Spreadsheet(SpreadsheetResult),
}

impl ExtractionResult {
    /// Input family of the result.
    pub fn kind(&self) -> DocumentKind {
        match self {
            ExtractionResult::Document(_) => DocumentKind::Docx,
            ExtractionResult::Pdf(_) => DocumentKind::Pdf,
            ExtractionResult::Spreadsheet(_) => DocumentKind::Spreadsheet,
        }
    }

    /// Non-fatal failures recorded while extracting.
    pub fn degradations(&self) -> &[Degradation] {
        match self {
            ExtractionResult::Document(_) => &[],
            ExtractionResult::Pdf(r) => &r.degraded,
            ExtractionResult::Spreadsheet(r) => &r.degraded,
        }
    }
}

impl From<DocumentResult> for ExtractionResult {
    fn from(result: DocumentResult) -> Self {
        ExtractionResult::Document(result)
    }
}

impl From<PdfResult> for ExtractionResult {
    fn from(result: PdfResult) -> Self {
        ExtractionResult::Pdf(result)
    }
}

impl From<SpreadsheetResult> for ExtractionResult {
    fn from(result: SpreadsheetResult) -> Self {
        ExtractionResult::Spreadsheet(result)
    }
}
