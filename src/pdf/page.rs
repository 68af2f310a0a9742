//! Per-page extraction: text and ruled-line tables.

use crate::error::Degradation;
use crate::model::{PdfPage, PdfTable, Position};

use super::backend::{PageId, PdfBackend};
use super::content::{ContentInterpreter, PageGeometry};
use super::geometry::GeometryDetector;
use super::options::{PdfOptions, MIN_TABLE_COLS, MIN_TABLE_ROWS};
use super::text::extract_text;

/// Extracts pages of one document.
pub struct PageExtractor<'a, B: PdfBackend> {
    backend: &'a B,
    options: PdfOptions,
    detector: GeometryDetector,
}

impl<'a, B: PdfBackend> PageExtractor<'a, B> {
    /// Create an extractor over `backend`.
    pub fn new(backend: &'a B, options: PdfOptions) -> Self {
        Self {
            backend,
            options,
            detector: GeometryDetector::with_settings(options.table_settings),
        }
    }

    /// Extract one page.
    ///
    /// Never fails: a page whose content cannot be interpreted comes back
    /// empty together with the reason.
    pub fn extract(&self, page_number: u32, page: PageId) -> (PdfPage, Option<Degradation>) {
        let geometry = match self.geometry(page) {
            Ok(geometry) => geometry,
            Err(reason) => return degraded(PdfPage::new(page_number), page_number, reason),
        };

        let mut record = PdfPage::new(page_number);
        record.text = extract_text(
            geometry.chars.iter().filter(|c| c.is_finite()),
            self.options.text_tolerance,
        );

        match self.detector.extract_tables(&geometry.edges, &geometry.chars) {
            Ok(candidates) => {
                record.tables = candidates
                    .into_iter()
                    .filter(|(_, data)| {
                        data.len() >= MIN_TABLE_ROWS
                            && data.first().map_or(0, Vec::len) >= MIN_TABLE_COLS
                    })
                    .enumerate()
                    .map(|(i, (candidate, data))| {
                        let bbox = candidate.bbox();
                        PdfTable {
                            table_number: i as u32 + 1,
                            position: Position::from_bbox(bbox.x0, bbox.top, bbox.x1, bbox.bottom),
                            data,
                        }
                    })
                    .collect();
                log::debug!(
                    "PageExtractor: page {} has {} tables",
                    page_number,
                    record.tables.len()
                );
                (record, None)
            }
            Err(e) => degraded(record, page_number, e.to_string()),
        }
    }

    fn geometry(&self, page: PageId) -> std::result::Result<PageGeometry, String> {
        let content = match self.backend.page_content(page) {
            Ok(Some(content)) => content,
            Ok(None) => return Ok(PageGeometry::default()),
            Err(e) => return Err(format!("content stream unreadable: {}", e)),
        };
        let operations = self
            .backend
            .decode_content(&content)
            .map_err(|e| format!("content stream undecodable: {}", e))?;
        let fonts = self
            .backend
            .page_fonts(page)
            .map_err(|e| format!("font resources unreadable: {}", e))?;

        let media_box = self.backend.media_box(page);
        let interpreter = ContentInterpreter::new(self.backend, page, media_box, fonts);
        Ok(interpreter.run(&operations))
    }
}

fn degraded(
    page: PdfPage,
    page_number: u32,
    reason: String,
) -> (PdfPage, Option<Degradation>) {
    let degradation = Degradation::DetectionDegraded {
        page_number,
        reason,
    };
    log::warn!("{}", degradation);
    (page, Some(degradation))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::DocumentKind;
    use crate::error::{Error, Result};
    use crate::pdf::backend::{ContentOp, FontMetrics, PageBox, PdfValue};
    use std::collections::{BTreeMap, HashMap};

    /// Backend serving prepared operations for page (1, 0).
    struct FixedBackend {
        content: Option<Vec<ContentOp>>,
        fail_decode: bool,
    }

    impl PdfBackend for FixedBackend {
        fn pages(&self) -> BTreeMap<u32, PageId> {
            BTreeMap::from([(1, (1, 0))])
        }

        fn media_box(&self, _page: PageId) -> PageBox {
            PageBox::LETTER
        }

        fn page_fonts(&self, _page: PageId) -> Result<HashMap<Vec<u8>, FontMetrics>> {
            Ok(HashMap::new())
        }

        fn page_content(&self, _page: PageId) -> Result<Option<Vec<u8>>> {
            Ok(self.content.as_ref().map(|_| b"ops".to_vec()))
        }

        fn decode_content(&self, _data: &[u8]) -> Result<Vec<ContentOp>> {
            if self.fail_decode {
                return Err(Error::malformed(DocumentKind::Pdf, "bad operator"));
            }
            Ok(self.content.clone().unwrap_or_default())
        }

        fn decode_text(&self, _page: PageId, _font: &[u8], bytes: &[u8]) -> String {
            bytes.iter().map(|&b| b as char).collect()
        }
    }

    fn extract(backend: &FixedBackend, page_number: u32) -> (PdfPage, Option<Degradation>) {
        PageExtractor::new(backend, PdfOptions::default()).extract(page_number, (1, 0))
    }

    fn op(operator: &str, operands: &[f64]) -> ContentOp {
        ContentOp {
            operator: operator.to_string(),
            operands: operands.iter().map(|&v| PdfValue::Real(v)).collect(),
        }
    }

    fn text_at(x: f64, y: f64, text: &str) -> Vec<ContentOp> {
        vec![
            op("BT", &[]),
            ContentOp {
                operator: "Tf".into(),
                operands: vec![PdfValue::Name(b"F1".to_vec()), PdfValue::Real(10.0)],
            },
            op("Td", &[x, y]),
            ContentOp {
                operator: "Tj".into(),
                operands: vec![PdfValue::Str(text.as_bytes().to_vec())],
            },
            op("ET", &[]),
        ]
    }

    /// A 2x2 ruled grid from (100, 500) to (300, 600) in PDF space.
    fn grid() -> Vec<ContentOp> {
        let mut ops = Vec::new();
        for y in [500.0, 550.0, 600.0] {
            ops.push(op("m", &[100.0, y]));
            ops.push(op("l", &[300.0, y]));
        }
        for x in [100.0, 200.0, 300.0] {
            ops.push(op("m", &[x, 500.0]));
            ops.push(op("l", &[x, 600.0]));
        }
        ops.push(op("S", &[]));
        ops
    }

    #[test]
    fn test_page_without_content_is_empty() {
        let backend = FixedBackend {
            content: None,
            fail_decode: false,
        };
        let (page, degradation) = extract(&backend, 1);
        assert!(page.is_empty());
        assert!(degradation.is_none());
    }

    #[test]
    fn test_undecodable_content_degrades_page() {
        let backend = FixedBackend {
            content: Some(Vec::new()),
            fail_decode: true,
        };
        let (page, degradation) = extract(&backend, 3);
        assert!(page.is_empty());
        assert_eq!(page.page_number, 3);
        assert!(matches!(
            degradation,
            Some(Degradation::DetectionDegraded { page_number: 3, .. })
        ));
    }

    #[test]
    fn test_text_and_table() {
        let mut ops = grid();
        ops.extend(text_at(110.0, 570.0, "Name"));
        ops.extend(text_at(210.0, 570.0, "Qty"));
        ops.extend(text_at(110.0, 520.0, "Bolt"));
        ops.extend(text_at(210.0, 520.0, "12"));
        let backend = FixedBackend {
            content: Some(ops),
            fail_decode: false,
        };

        let (page, degradation) = extract(&backend, 1);
        assert!(degradation.is_none());
        assert_eq!(page.text, "Name Qty\nBolt 12");
        assert_eq!(page.tables.len(), 1);

        let table = &page.tables[0];
        assert_eq!(table.table_number, 1);
        assert_eq!(
            table.data,
            vec![
                vec![Some("Name".to_string()), Some("Qty".to_string())],
                vec![Some("Bolt".to_string()), Some("12".to_string())],
            ]
        );
        assert_eq!(table.position.x, 100.0);
        assert_eq!(table.position.y, 192.0);
        assert_eq!(table.position.width, 200.0);
        assert_eq!(table.position.height, 100.0);
    }

    #[test]
    fn test_single_row_candidate_rejected() {
        let mut ops = Vec::new();
        for y in [500.0, 550.0] {
            ops.push(op("m", &[100.0, y]));
            ops.push(op("l", &[300.0, y]));
        }
        for x in [100.0, 200.0, 300.0] {
            ops.push(op("m", &[x, 500.0]));
            ops.push(op("l", &[x, 550.0]));
        }
        ops.push(op("S", &[]));
        let backend = FixedBackend {
            content: Some(ops),
            fail_decode: false,
        };

        let (page, degradation) = extract(&backend, 1);
        assert!(degradation.is_none());
        assert!(page.tables.is_empty());
    }

    #[test]
    fn test_single_column_candidate_rejected() {
        let mut ops = Vec::new();
        for y in [500.0, 550.0, 600.0, 650.0] {
            ops.push(op("m", &[100.0, y]));
            ops.push(op("l", &[200.0, y]));
        }
        for x in [100.0, 200.0] {
            ops.push(op("m", &[x, 500.0]));
            ops.push(op("l", &[x, 650.0]));
        }
        ops.push(op("S", &[]));
        let backend = FixedBackend {
            content: Some(ops),
            fail_decode: false,
        };

        let (page, degradation) = extract(&backend, 1);
        assert!(degradation.is_none());
        assert!(page.tables.is_empty());
    }
}
