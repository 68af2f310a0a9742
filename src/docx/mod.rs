//! Word-processing (OOXML) document access.
//!
//! A `.docx` file is a ZIP container whose main part, `word/document.xml`,
//! holds the body. [`DocxPackage`] owns that part's XML; [`walk`] turns the
//! parsed body into a lazy sequence of [`DocumentBlock`]s.

mod walker;

pub use walker::{walk, walk_xml, BlockWalker, DocumentBlock, TableBlock};

use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek};
use std::path::Path;

use crate::detect::DocumentKind;
use crate::error::{Error, Result};

/// WordprocessingML main namespace.
pub(crate) const WML_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

const MAIN_PART: &str = "word/document.xml";

/// The main document part of a `.docx` container.
#[derive(Debug, Clone)]
pub struct DocxPackage {
    xml: String,
}

impl DocxPackage {
    /// Open a `.docx` file and read its main part.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Read a `.docx` container held in memory.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::from_reader(Cursor::new(data))
    }

    fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut archive = zip::ZipArchive::new(reader).map_err(|e| {
            Error::malformed(DocumentKind::Docx, format!("not a ZIP container: {}", e))
        })?;

        let mut entry = archive.by_name(MAIN_PART).map_err(|_| {
            Error::malformed(DocumentKind::Docx, format!("missing {}", MAIN_PART))
        })?;

        let mut xml = String::new();
        entry.read_to_string(&mut xml).map_err(|e| {
            Error::malformed(DocumentKind::Docx, format!("unreadable {}: {}", MAIN_PART, e))
        })?;

        Ok(Self { xml })
    }

    /// Build a package from the main part's XML directly.
    pub fn from_xml(xml: impl Into<String>) -> Self {
        Self { xml: xml.into() }
    }

    /// Raw XML of the main part.
    pub fn xml(&self) -> &str {
        &self.xml
    }

    /// Parse the main part.
    pub fn parse(&self) -> Result<roxmltree::Document<'_>> {
        Ok(roxmltree::Document::parse(&self.xml)?)
    }
}

/// Find the first direct WordprocessingML child named `name`.
pub(crate) fn wml<'a, 'input>(
    node: roxmltree::Node<'a, 'input>,
    name: &str,
) -> Option<roxmltree::Node<'a, 'input>> {
    node.children().find(|n| is_wml(*n, name))
}

/// Whether `node` is the WordprocessingML element `name`.
pub(crate) fn is_wml(node: roxmltree::Node, name: &str) -> bool {
    node.is_element() && node.tag_name().name() == name && node.tag_name().namespace() == Some(WML_NS)
}

/// The `w:val` attribute of the first direct child named `name`.
pub(crate) fn wml_val<'a, 'input>(node: roxmltree::Node<'a, 'input>, name: &str) -> Option<&'a str> {
    wml(node, name).and_then(|n| n.attribute((WML_NS, "val")))
}
