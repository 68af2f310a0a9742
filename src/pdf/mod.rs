//! PDF page extraction.
//!
//! Pages are interpreted into positioned chars and ruled-line edges, from
//! which plain text and tables are derived.

pub mod backend;
pub mod content;
pub mod geometry;
pub mod options;
pub mod page;
pub mod text;

pub use backend::{LopdfBackend, PdfBackend};
pub use geometry::{BBox, CandidateTable, Char, Edge, GeometryDetector, GeometryError};
pub use options::{PdfOptions, TableSettings, TextTolerance, MIN_TABLE_COLS, MIN_TABLE_ROWS};
pub use page::PageExtractor;

use crate::assemble::assemble_pdf;
use crate::model::PdfResult;

/// Extract every page of a loaded document, in page order.
pub fn extract_pages<B: PdfBackend>(
    backend: &B,
    source_file: impl Into<String>,
    options: &PdfOptions,
) -> PdfResult {
    let extractor = PageExtractor::new(backend, *options);
    let pages = backend.pages();
    log::debug!("PdfExtractor: {} pages", pages.len());

    let mut records = Vec::with_capacity(pages.len());
    let mut degraded = Vec::new();
    for (page_number, page_id) in pages {
        let (record, degradation) = extractor.extract(page_number, page_id);
        records.push(record);
        degraded.extend(degradation);
    }

    assemble_pdf(source_file, records, degraded)
}
