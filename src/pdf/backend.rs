//! PDF backend abstraction layer.
//!
//! Isolates the concrete PDF library (lopdf) from content interpretation:
//! the interpreter only sees page ids, decoded operations, font metrics and
//! decoded text.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use lopdf::{Dictionary, Document as LopdfDocument, Object};

use crate::detect::DocumentKind;
use crate::error::{Error, Result};

/// Page identifier: (object number, generation number).
pub type PageId = (u32, u16);

/// A value from a PDF content stream operand.
#[derive(Debug, Clone, PartialEq)]
pub enum PdfValue {
    Integer(i64),
    Real(f64),
    Name(Vec<u8>),
    Str(Vec<u8>),
    Array(Vec<PdfValue>),
    Other,
}

impl PdfValue {
    /// Numeric value of an integer or real operand.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            PdfValue::Integer(i) => Some(*i as f64),
            PdfValue::Real(r) => Some(*r),
            _ => None,
        }
    }
}

/// A single operation from a PDF content stream.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentOp {
    pub operator: String,
    pub operands: Vec<PdfValue>,
}

impl ContentOp {
    /// Numeric operand at `index`.
    pub fn number(&self, index: usize) -> Option<f64> {
        self.operands.get(index).and_then(PdfValue::as_number)
    }
}

/// Page box in default user space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageBox {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl PageBox {
    /// US Letter, used when a page declares no usable MediaBox.
    pub const LETTER: PageBox = PageBox {
        x0: 0.0,
        y0: 0.0,
        x1: 612.0,
        y1: 792.0,
    };

    /// Page width.
    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    /// Page height.
    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }
}

/// Glyph advance information of one font resource.
#[derive(Debug, Clone, PartialEq)]
pub struct FontMetrics {
    /// Base font name (e.g., "Helvetica-Bold")
    pub base_font: String,
    /// Whether glyph codes are two bytes wide (composite fonts)
    pub two_byte: bool,
    /// First code covered by `widths`
    pub first_char: u32,
    /// Widths of simple-font codes from `first_char`, in glyph space
    pub widths: Vec<f64>,
    /// Widths of composite-font CIDs, in glyph space
    pub cid_widths: HashMap<u32, f64>,
    /// Width of codes not covered above
    pub default_width: f64,
}

impl FontMetrics {
    /// Metrics for a font the page does not declare.
    pub fn fallback() -> Self {
        Self {
            base_font: "Unknown".to_string(),
            two_byte: false,
            first_char: 0,
            widths: Vec::new(),
            cid_widths: HashMap::new(),
            default_width: 500.0,
        }
    }

    /// Advance of `code` in glyph space (thousandths of text space).
    pub fn width(&self, code: u32) -> f64 {
        if self.two_byte {
            return self
                .cid_widths
                .get(&code)
                .copied()
                .unwrap_or(self.default_width);
        }
        code.checked_sub(self.first_char)
            .and_then(|i| self.widths.get(i as usize))
            .copied()
            .unwrap_or(self.default_width)
    }
}

/// Text decoder bound to one font resource of a page.
pub type TextDecoder<'a> = Box<dyn Fn(&[u8]) -> String + 'a>;

/// Abstract interface for PDF document access.
pub trait PdfBackend {
    /// Return all pages as (page_number → PageId).
    fn pages(&self) -> BTreeMap<u32, PageId>;

    /// Return the page's MediaBox, inherited from the page tree if needed.
    fn media_box(&self, page: PageId) -> PageBox;

    /// Return glyph metrics for every font resource of a page.
    fn page_fonts(&self, page: PageId) -> Result<HashMap<Vec<u8>, FontMetrics>>;

    /// Return the decoded content stream bytes of a page, or `None` when
    /// the page has no content at all.
    fn page_content(&self, page: PageId) -> Result<Option<Vec<u8>>>;

    /// Parse raw content stream bytes into a sequence of operations.
    fn decode_content(&self, data: &[u8]) -> Result<Vec<ContentOp>>;

    /// Decode a text byte sequence using the font's encoding on the given page.
    /// Falls back to simple decoding if the font or encoding is unavailable.
    fn decode_text(&self, page: PageId, font_name: &[u8], bytes: &[u8]) -> String;

    /// Resolve a font's encoding once and return a decoder for its text.
    fn text_decoder<'s>(&'s self, page: PageId, font_name: &[u8]) -> TextDecoder<'s> {
        let font_name = font_name.to_vec();
        Box::new(move |bytes: &[u8]| self.decode_text(page, &font_name, bytes))
    }
}

/// Simple text decoding fallback when no encoding is available.
pub fn decode_text_simple(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&utf16);
    }

    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }

    // Latin-1
    bytes.iter().map(|&b| b as char).collect()
}

/// Concrete [`PdfBackend`] backed by `lopdf::Document`.
pub struct LopdfBackend {
    doc: LopdfDocument,
}

impl LopdfBackend {
    /// Load from a file path.
    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let doc = LopdfDocument::load(path)?;
        Self::checked(doc)
    }

    /// Load from an in-memory byte slice.
    pub fn load_bytes(data: &[u8]) -> Result<Self> {
        let doc = LopdfDocument::load_mem(data)?;
        Self::checked(doc)
    }

    /// Wrap an already loaded document.
    pub fn from_document(doc: LopdfDocument) -> Self {
        Self { doc }
    }

    fn checked(doc: LopdfDocument) -> Result<Self> {
        if doc.is_encrypted() {
            log::warn!("Document is encrypted; pages that fail to decode will be degraded");
        }
        Ok(Self { doc })
    }

    /// Get PDF version string.
    pub fn version(&self) -> String {
        self.doc.version.to_string()
    }

    fn resolve<'a>(&'a self, obj: &'a Object) -> &'a Object {
        match obj {
            Object::Reference(id) => self.doc.get_object(*id).unwrap_or(obj),
            _ => obj,
        }
    }

    fn dict_number(&self, dict: &Dictionary, key: &[u8]) -> Option<f64> {
        dict.get(key).ok().and_then(|o| number(self.resolve(o)))
    }

    fn font_metrics(&self, font: &Dictionary) -> FontMetrics {
        let base_font = font
            .get(b"BaseFont")
            .ok()
            .and_then(|o| o.as_name().ok())
            .map(|n| String::from_utf8_lossy(n).to_string())
            .unwrap_or_else(|| "Unknown".to_string());

        let is_type0 = font
            .get(b"Subtype")
            .ok()
            .and_then(|o| o.as_name().ok())
            .map_or(false, |n| n == b"Type0");

        if is_type0 {
            return self.composite_metrics(font, base_font);
        }

        let first_char = self
            .dict_number(font, b"FirstChar")
            .map(|n| n.max(0.0) as u32)
            .unwrap_or(0);
        let widths: Vec<f64> = font
            .get(b"Widths")
            .ok()
            .and_then(|o| self.resolve(o).as_array().ok())
            .map(|arr| {
                arr.iter()
                    .map(|w| number(self.resolve(w)).unwrap_or(0.0))
                    .collect()
            })
            .unwrap_or_default();

        let missing_width = font
            .get(b"FontDescriptor")
            .ok()
            .and_then(|o| self.resolve(o).as_dict().ok())
            .and_then(|d| self.dict_number(d, b"MissingWidth"));

        let default_width = missing_width.unwrap_or(if base_font.contains("Courier") {
            600.0
        } else {
            500.0
        });

        FontMetrics {
            base_font,
            two_byte: false,
            first_char,
            widths,
            cid_widths: HashMap::new(),
            default_width,
        }
    }

    fn composite_metrics(&self, font: &Dictionary, base_font: String) -> FontMetrics {
        let descendant = font
            .get(b"DescendantFonts")
            .ok()
            .and_then(|o| self.resolve(o).as_array().ok())
            .and_then(|arr| arr.first())
            .and_then(|o| self.resolve(o).as_dict().ok());

        let mut cid_widths = HashMap::new();
        let mut default_width = 1000.0;

        if let Some(cid_font) = descendant {
            if let Some(dw) = self.dict_number(cid_font, b"DW") {
                default_width = dw;
            }
            if let Some(w) = cid_font
                .get(b"W")
                .ok()
                .and_then(|o| self.resolve(o).as_array().ok())
            {
                self.read_cid_widths(w, &mut cid_widths);
            }
        }

        FontMetrics {
            base_font,
            two_byte: true,
            first_char: 0,
            widths: Vec::new(),
            cid_widths,
            default_width,
        }
    }

    /// Parse a CID `W` array: `c [w1 w2 ...]` and `c_first c_last w` runs.
    fn read_cid_widths(&self, w: &[Object], out: &mut HashMap<u32, f64>) {
        let mut i = 0;
        while i + 1 < w.len() {
            let Some(first) = number(self.resolve(&w[i])) else {
                break;
            };
            let first = first.max(0.0) as u32;
            match self.resolve(&w[i + 1]) {
                Object::Array(run) => {
                    for (offset, width) in run.iter().enumerate() {
                        if let Some(width) = number(self.resolve(width)) {
                            out.insert(first + offset as u32, width);
                        }
                    }
                    i += 2;
                }
                other => {
                    let (Some(last), Some(width)) =
                        (number(other), w.get(i + 2).and_then(|o| number(self.resolve(o))))
                    else {
                        break;
                    };
                    let last = (last.max(0.0) as u32).min(first.saturating_add(0xFFFF));
                    for cid in first..=last {
                        out.insert(cid, width);
                    }
                    i += 3;
                }
            }
        }
    }

    fn stream_bytes(&self, obj: &Object) -> Result<Vec<u8>> {
        match self.resolve(obj) {
            Object::Stream(stream) => {
                if stream.dict.has(b"Filter") {
                    Ok(stream.decompressed_content()?)
                } else {
                    Ok(stream.content.clone())
                }
            }
            _ => Err(Error::malformed(
                DocumentKind::Pdf,
                "content entry is not a stream",
            )),
        }
    }
}

impl PdfBackend for LopdfBackend {
    fn pages(&self) -> BTreeMap<u32, PageId> {
        self.doc.get_pages()
    }

    fn media_box(&self, page: PageId) -> PageBox {
        let mut current = Some(page);
        // Bounded walk up the page tree.
        for _ in 0..32 {
            let Some(id) = current else { break };
            let Ok(dict) = self.doc.get_dictionary(id) else {
                break;
            };
            if let Some(rect) = dict
                .get(b"MediaBox")
                .ok()
                .and_then(|o| self.resolve(o).as_array().ok())
                .and_then(|arr| rect(arr.iter().map(|o| number(self.resolve(o)))))
            {
                return rect;
            }
            current = dict.get(b"Parent").ok().and_then(|o| o.as_reference().ok());
        }
        PageBox::LETTER
    }

    fn page_fonts(&self, page: PageId) -> Result<HashMap<Vec<u8>, FontMetrics>> {
        let fonts = self.doc.get_page_fonts(page)?;
        Ok(fonts
            .iter()
            .map(|(name, dict)| (name.clone(), self.font_metrics(dict)))
            .collect())
    }

    fn page_content(&self, page: PageId) -> Result<Option<Vec<u8>>> {
        let page_dict = self.doc.get_dictionary(page)?;
        let Ok(contents) = page_dict.get(b"Contents") else {
            return Ok(None);
        };

        match self.resolve(contents) {
            Object::Array(parts) => {
                let mut content = Vec::new();
                for part in parts {
                    content.extend_from_slice(&self.stream_bytes(part)?);
                    content.push(b' ');
                }
                Ok(Some(content))
            }
            _ => self.stream_bytes(contents).map(Some),
        }
    }

    fn decode_content(&self, data: &[u8]) -> Result<Vec<ContentOp>> {
        let content = lopdf::content::Content::decode(data)?;

        Ok(content
            .operations
            .into_iter()
            .map(|op| ContentOp {
                operator: op.operator,
                operands: op.operands.iter().map(convert_object).collect(),
            })
            .collect())
    }

    fn decode_text(&self, page: PageId, font_name: &[u8], bytes: &[u8]) -> String {
        self.text_decoder(page, font_name)(bytes)
    }

    fn text_decoder<'s>(&'s self, page: PageId, font_name: &[u8]) -> TextDecoder<'s> {
        let font_dict = self
            .doc
            .get_page_fonts(page)
            .ok()
            .and_then(|fonts| fonts.get(font_name).copied());
        let encoding = font_dict.and_then(|dict| dict.get_font_encoding(&self.doc).ok());

        Box::new(move |bytes: &[u8]| {
            encoding
                .as_ref()
                .and_then(|enc| LopdfDocument::decode_text(enc, bytes).ok())
                .unwrap_or_else(|| decode_text_simple(bytes))
        })
    }
}

fn number(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(*r as f64),
        _ => None,
    }
}

fn rect(mut values: impl Iterator<Item = Option<f64>>) -> Option<PageBox> {
    let (a, b, c, d) = (values.next()??, values.next()??, values.next()??, values.next()??);
    Some(PageBox {
        x0: a.min(c),
        y0: b.min(d),
        x1: a.max(c),
        y1: b.max(d),
    })
}

/// Convert a `lopdf::Object` to [`PdfValue`].
fn convert_object(obj: &Object) -> PdfValue {
    match obj {
        Object::Integer(i) => PdfValue::Integer(*i),
        Object::Real(r) => PdfValue::Real(*r as f64),
        Object::Name(n) => PdfValue::Name(n.clone()),
        Object::String(b, _) => PdfValue::Str(b.clone()),
        Object::Array(arr) => PdfValue::Array(arr.iter().map(convert_object).collect()),
        _ => PdfValue::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::dictionary;

    #[test]
    fn test_decode_text_simple_utf8() {
        assert_eq!(decode_text_simple(b"Hello"), "Hello");
    }

    #[test]
    fn test_decode_text_simple_latin1() {
        let bytes = vec![0x48, 0x65, 0x6C, 0x6C, 0xE9];
        assert_eq!(decode_text_simple(&bytes), "Hellé");
    }

    #[test]
    fn test_decode_text_simple_utf16be() {
        let bytes = vec![0xFE, 0xFF, 0x00, 0x48, 0x00, 0x69];
        assert_eq!(decode_text_simple(&bytes), "Hi");
    }

    #[test]
    fn test_operand_numbers() {
        let op = ContentOp {
            operator: "Td".into(),
            operands: vec![PdfValue::Integer(42), PdfValue::Real(3.5), PdfValue::Other],
        };
        assert_eq!(op.number(0), Some(42.0));
        assert_eq!(op.number(1), Some(3.5));
        assert_eq!(op.number(2), None);
        assert_eq!(op.number(3), None);
    }

    #[test]
    fn test_simple_font_widths() {
        let backend = LopdfBackend::from_document(LopdfDocument::with_version("1.5"));
        let font = dictionary! {
            "Type" => "Font",
            "Subtype" => "TrueType",
            "BaseFont" => "Arial",
            "FirstChar" => 65,
            "Widths" => vec![Object::Integer(722), Object::Integer(667)],
        };
        let metrics = backend.font_metrics(&font);
        assert!(!metrics.two_byte);
        assert_eq!(metrics.width(65), 722.0);
        assert_eq!(metrics.width(66), 667.0);
        assert_eq!(metrics.width(67), 500.0);
        assert_eq!(metrics.width(10), 500.0);
    }

    #[test]
    fn test_cid_width_runs() {
        let backend = LopdfBackend::from_document(LopdfDocument::with_version("1.5"));
        let w = vec![
            Object::Integer(1),
            Object::Array(vec![Object::Integer(250), Object::Integer(300)]),
            Object::Integer(10),
            Object::Integer(12),
            Object::Integer(700),
        ];
        let mut widths = HashMap::new();
        backend.read_cid_widths(&w, &mut widths);
        assert_eq!(widths.get(&1), Some(&250.0));
        assert_eq!(widths.get(&2), Some(&300.0));
        assert_eq!(widths.get(&11), Some(&700.0));
        assert_eq!(widths.get(&13), None);
    }

    #[test]
    fn test_courier_default_width() {
        let backend = LopdfBackend::from_document(LopdfDocument::with_version("1.5"));
        let font = dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        };
        assert_eq!(backend.font_metrics(&font).width(65), 600.0);
    }
}
