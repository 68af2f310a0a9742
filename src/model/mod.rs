//! Output model shared by all extractors.
//!
//! These types define the JSON contract: every adapter produces one of the
//! envelopes in [`result`], built from the element, page and grid records
//! defined here. Field order in the structs is the key order of the JSON.

mod document;
mod page;
mod result;
mod sheet;
mod table;

pub use document::{DocumentElement, DocumentStatistics, ElementContent};
pub use page::PdfPage;
pub use result::{DocumentResult, ExtractionResult, PdfResult, SpreadsheetResult};
pub use sheet::SheetGrid;
pub use table::{PdfTable, Position, TableContent};
