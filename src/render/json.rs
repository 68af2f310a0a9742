//! JSON rendering of extraction results.

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

use crate::detect::DocumentKind;
use crate::error::{Error, Result};
use crate::model::ExtractionResult;

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Indented JSON; two spaces for documents, four for PDFs and workbooks
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Indentation used by [`JsonFormat::Pretty`] for a result kind.
pub fn indent_for(kind: DocumentKind) -> &'static [u8] {
    match kind {
        DocumentKind::Docx => b"  ",
        DocumentKind::Pdf | DocumentKind::Spreadsheet => b"    ",
    }
}

/// Convert a result to JSON. Non-ASCII text is written verbatim.
pub fn to_json(result: &ExtractionResult, format: JsonFormat) -> Result<String> {
    match format {
        JsonFormat::Pretty => to_json_indented(result, indent_for(result.kind())),
        JsonFormat::Compact => Ok(serde_json::to_string(result)?),
    }
}

/// Serialize any value with the given indentation.
pub fn to_json_indented<T: Serialize + ?Sized>(value: &T, indent: &[u8]) -> Result<String> {
    let mut buffer = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(indent));
    value.serialize(&mut serializer)?;
    String::from_utf8(buffer).map_err(|e| Error::Render(format!("JSON is not UTF-8: {}", e)))
}
