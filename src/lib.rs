//! # docextract
//!
//! Structured content extraction from office documents.
//!
//! Three input families are supported, each with its own result shape:
//!
//! - **Word-processing documents** (`.docx`): paragraphs and tables in
//!   reading order, with per-document statistics.
//! - **PDF documents**: per-page plain text and ruled-line tables with their
//!   positions.
//! - **Spreadsheets** (`.xlsx`, `.xlsm`, `.xls`, `.ods`): every sheet as a
//!   rectangular grid of strings.
//!
//! ## Quick Start
//!
//! ```no_run
//! use docextract::{extract_document, render, ExtractionResult};
//!
//! fn main() -> docextract::Result<()> {
//!     let result = extract_document("report.docx")?;
//!     println!("{} paragraphs", result.statistics.paragraphs);
//!
//!     let json = render::to_json(&ExtractionResult::from(result), render::JsonFormat::Pretty)?;
//!     println!("{}", json);
//!     Ok(())
//! }
//! ```
//!
//! Failures are two-tier: a container that cannot be opened is an
//! [`Error`]; a page or sheet that cannot be read is recorded as a
//! [`Degradation`] in the result and extraction continues.

pub mod assemble;
pub mod batch;
pub mod convert;
pub mod detect;
pub mod docx;
pub mod error;
pub mod model;
pub mod pdf;
pub mod render;
pub mod sheet;

pub use batch::{BatchOptions, BatchReport};
pub use convert::{Extractor, ExtractorRegistry};
pub use detect::{detect_format_from_bytes, detect_format_from_path, DocumentKind};
pub use error::{Degradation, Error, Result};
pub use model::{
    DocumentElement, DocumentResult, DocumentStatistics, ElementContent, ExtractionResult,
    PdfPage, PdfResult, PdfTable, Position, SheetGrid, SpreadsheetResult, TableContent,
};
pub use pdf::{PdfOptions, TableSettings, TextTolerance};
pub use render::JsonFormat;

use std::path::Path;

use crate::assemble::{assemble_document, assemble_spreadsheet};
use crate::docx::DocxPackage;
use crate::pdf::LopdfBackend;

/// Extract paragraphs and tables of a `.docx` file.
///
/// # Example
///
/// ```no_run
/// use docextract::extract_document;
///
/// let result = extract_document("report.docx").unwrap();
/// for element in &result.elements {
///     println!("{:?}", element.text());
/// }
/// ```
pub fn extract_document<P: AsRef<Path>>(path: P) -> Result<DocumentResult> {
    let path = path.as_ref();
    let package = DocxPackage::open(path)?;
    document_from_package(&package, &file_name(path))
}

/// Extract paragraphs and tables of a `.docx` file held in memory.
///
/// `file_name` is reported as the result's file name.
pub fn extract_document_bytes(data: &[u8], file_name: &str) -> Result<DocumentResult> {
    let package = DocxPackage::from_bytes(data)?;
    document_from_package(&package, file_name)
}

fn document_from_package(package: &DocxPackage, file_name: &str) -> Result<DocumentResult> {
    let xml = package.parse()?;
    let blocks = docx::walk(&xml)?;
    let result = assemble_document(file_name, blocks);
    log::debug!(
        "Document '{}': {} elements emitted of {} walked",
        file_name,
        result.elements.len(),
        result.statistics.total_elements
    );
    Ok(result)
}

/// Extract per-page text and tables of a PDF file.
///
/// # Example
///
/// ```no_run
/// use docextract::{extract_pdf, PdfOptions, TextTolerance};
///
/// let options = PdfOptions::new().with_text_tolerance(TextTolerance::new(2.0, 2.0));
/// let result = extract_pdf("invoice.pdf", &options).unwrap();
/// println!("{} tables", result.table_count());
/// ```
pub fn extract_pdf<P: AsRef<Path>>(path: P, options: &PdfOptions) -> Result<PdfResult> {
    let path = path.as_ref();
    options.validate()?;
    let backend = LopdfBackend::load_file(path)?;
    log::debug!("PDF '{}' version {}", path.display(), backend.version());
    Ok(pdf::extract_pages(
        &backend,
        path.display().to_string(),
        options,
    ))
}

/// Extract per-page text and tables of a PDF held in memory.
///
/// `source_file` is reported as the result's source.
pub fn extract_pdf_bytes(
    data: &[u8],
    source_file: &str,
    options: &PdfOptions,
) -> Result<PdfResult> {
    options.validate()?;
    let backend = LopdfBackend::load_bytes(data)?;
    Ok(pdf::extract_pages(&backend, source_file, options))
}

/// Extract every sheet of a workbook as a string grid.
///
/// # Example
///
/// ```no_run
/// use docextract::extract_spreadsheet;
///
/// let result = extract_spreadsheet("budget.xlsx").unwrap();
/// for sheet in &result.sheets {
///     println!("{}: {} rows", sheet.sheet_name, sheet.row_count());
/// }
/// ```
pub fn extract_spreadsheet<P: AsRef<Path>>(path: P) -> Result<SpreadsheetResult> {
    let path = path.as_ref();
    let grids = sheet::read_workbook(path)?;
    Ok(assemble_spreadsheet(
        path.display().to_string(),
        grids.sheets,
        grids.degraded,
    ))
}

/// Extract every sheet of a workbook held in memory.
pub fn extract_spreadsheet_bytes(data: &[u8], source_file: &str) -> Result<SpreadsheetResult> {
    let grids = sheet::read_workbook_bytes(data)?;
    Ok(assemble_spreadsheet(source_file, grids.sheets, grids.degraded))
}

/// Detect the kind of file at `path` and extract it.
pub fn extract<P: AsRef<Path>>(path: P, options: &PdfOptions) -> Result<ExtractionResult> {
    let path = path.as_ref();
    let kind = detect_format_from_path(path)?;
    log::debug!("Detected {} input: {}", kind, path.display());
    match kind {
        DocumentKind::Docx => extract_document(path).map(Into::into),
        DocumentKind::Pdf => extract_pdf(path, options).map(Into::into),
        DocumentKind::Spreadsheet => extract_spreadsheet(path).map(Into::into),
    }
}

/// Detect the kind of an in-memory file and extract it.
///
/// `name` is reported as the file name or source of the result.
pub fn extract_bytes(data: &[u8], name: &str, options: &PdfOptions) -> Result<ExtractionResult> {
    match detect_format_from_bytes(data)? {
        DocumentKind::Docx => extract_document_bytes(data, name).map(Into::into),
        DocumentKind::Pdf => extract_pdf_bytes(data, name, options).map(Into::into),
        DocumentKind::Spreadsheet => extract_spreadsheet_bytes(data, name).map(Into::into),
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
