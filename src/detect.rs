//! Input format detection and validation.
//!
//! Extension-based dispatch lives in [`crate::convert`]; this module checks
//! the bytes themselves so that a mislabelled file fails early with a typed
//! error instead of deep inside a parser.

use std::fmt;
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek};
use std::path::Path;

use crate::error::{Error, Result};

/// The three families of input the extractors understand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    /// Word-processing document (OOXML `.docx`).
    Docx,
    /// Paginated PDF document.
    Pdf,
    /// Spreadsheet workbook (`.xlsx`, `.xlsm`, `.xls`, `.ods`).
    Spreadsheet,
}

impl DocumentKind {
    /// Name of the per-kind subfolder used by batch output.
    pub fn output_folder(self) -> &'static str {
        match self {
            DocumentKind::Docx => "docx",
            DocumentKind::Pdf => "pdf",
            DocumentKind::Spreadsheet => "excel",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DocumentKind::Docx => "docx",
            DocumentKind::Pdf => "pdf",
            DocumentKind::Spreadsheet => "spreadsheet",
        };
        f.write_str(name)
    }
}

const PDF_MAGIC: &[u8] = b"%PDF-";
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const OLE_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

const DOCX_MAIN_PART: &str = "word/document.xml";
const XLSX_MAIN_PART: &str = "xl/workbook.xml";
const ODS_MIMETYPE: &str = "application/vnd.oasis.opendocument.spreadsheet";

/// Detect the document kind of a file on disk.
///
/// # Example
/// ```no_run
/// use docextract::detect::{detect_format_from_path, DocumentKind};
///
/// let kind = detect_format_from_path("report.docx").unwrap();
/// assert_eq!(kind, DocumentKind::Docx);
/// ```
pub fn detect_format_from_path<P: AsRef<Path>>(path: P) -> Result<DocumentKind> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut header = [0u8; 8];
    let read = reader.read(&mut header)?;
    let header = &header[..read];

    if header.starts_with(ZIP_MAGIC) {
        reader.rewind()?;
        return classify_zip(reader);
    }
    classify_header(header)
}

/// Detect the document kind of an in-memory file.
pub fn detect_format_from_bytes(data: &[u8]) -> Result<DocumentKind> {
    if data.starts_with(ZIP_MAGIC) {
        return classify_zip(Cursor::new(data));
    }
    classify_header(data)
}

fn classify_header(header: &[u8]) -> Result<DocumentKind> {
    if header.starts_with(PDF_MAGIC) {
        Ok(DocumentKind::Pdf)
    } else if header.starts_with(OLE_MAGIC) {
        // Legacy binary workbooks; legacy .doc is not supported.
        Ok(DocumentKind::Spreadsheet)
    } else {
        Err(Error::UnsupportedFormat(
            "unrecognized file signature".to_string(),
        ))
    }
}

fn classify_zip<R: Read + Seek>(reader: R) -> Result<DocumentKind> {
    let mut archive = zip::ZipArchive::new(reader)?;

    if archive.file_names().any(|name| name == DOCX_MAIN_PART) {
        return Ok(DocumentKind::Docx);
    }
    if archive.file_names().any(|name| name == XLSX_MAIN_PART) {
        return Ok(DocumentKind::Spreadsheet);
    }
    if let Ok(mut entry) = archive.by_name("mimetype") {
        let mut mimetype = String::new();
        entry.read_to_string(&mut mimetype)?;
        if mimetype.trim() == ODS_MIMETYPE {
            return Ok(DocumentKind::Spreadsheet);
        }
    }

    Err(Error::UnsupportedFormat(
        "ZIP container without a known main part".to_string(),
    ))
}
