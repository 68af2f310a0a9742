//! Aggregation of adapter output into result envelopes.
//!
//! Pure functions: no I/O, no logging. Statistics for documents are
//! accumulated in the same pass that emits elements.

use crate::docx::{DocumentBlock, TableBlock};
use crate::error::Degradation;
use crate::model::{
    DocumentElement, DocumentResult, DocumentStatistics, PdfPage, PdfResult, SheetGrid,
    SpreadsheetResult, TableContent,
};

/// Single-pass builder for a [`DocumentResult`].
///
/// Every pushed block advances the walk position, which becomes the
/// `element_id` of the element it emits. Empty paragraphs advance the
/// position without emitting anything.
#[derive(Debug)]
pub struct DocumentAssembler {
    file_name: String,
    elements: Vec<DocumentElement>,
    statistics: DocumentStatistics,
    position: u32,
    table_counter: u32,
}

impl DocumentAssembler {
    /// Start assembling a document named `file_name`.
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            elements: Vec::new(),
            statistics: DocumentStatistics::default(),
            position: 0,
            table_counter: 0,
        }
    }

    /// Account for the next block of the walk.
    pub fn push(&mut self, block: DocumentBlock) {
        self.position += 1;
        self.statistics.total_elements += 1;

        match block {
            DocumentBlock::Paragraph(text) => {
                if !text.is_empty() {
                    self.statistics.paragraphs += 1;
                    self.elements
                        .push(DocumentElement::paragraph(self.position, text));
                }
            }
            DocumentBlock::Table(TableBlock { rows, grid_columns }) => {
                self.table_counter += 1;
                let table = TableContent::from_rows(self.table_counter, rows, grid_columns);
                self.statistics.tables += 1;
                self.statistics.table_rows += table.rows;
                self.statistics.table_cells += table.cells;
                self.elements.push(DocumentElement::table(self.position, table));
            }
        }
    }

    /// Finish and return the envelope.
    pub fn finish(self) -> DocumentResult {
        DocumentResult {
            file_name: self.file_name,
            elements: self.elements,
            statistics: self.statistics,
        }
    }
}

/// Assemble a document from a complete walk.
pub fn assemble_document<I>(file_name: impl Into<String>, blocks: I) -> DocumentResult
where
    I: IntoIterator<Item = DocumentBlock>,
{
    let mut assembler = DocumentAssembler::new(file_name);
    for block in blocks {
        assembler.push(block);
    }
    assembler.finish()
}

/// Wrap per-page records of a PDF.
pub fn assemble_pdf(
    source_file: impl Into<String>,
    pages: Vec<PdfPage>,
    degraded: Vec<Degradation>,
) -> PdfResult {
    PdfResult {
        source_file: source_file.into(),
        pages,
        degraded,
    }
}

/// Wrap per-sheet grids of a workbook.
pub fn assemble_spreadsheet(
    source_file: impl Into<String>,
    sheets: Vec<SheetGrid>,
    degraded: Vec<Degradation>,
) -> SpreadsheetResult {
    SpreadsheetResult {
        source_file: source_file.into(),
        sheets,
        degraded,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(rows: &[&[&str]], grid_columns: usize) -> DocumentBlock {
        DocumentBlock::Table(TableBlock {
            rows: rows
                .iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
            grid_columns,
        })
    }

    #[test]
    fn test_mixed_document() {
        let blocks = vec![
            DocumentBlock::Paragraph("Intro".into()),
            table(&[&["A", "B"], &["C", "D"]], 2),
            DocumentBlock::Paragraph("Outro".into()),
        ];
        let result = assemble_document("report.docx", blocks);

        let ids: Vec<u32> = result.elements.iter().map(|e| e.element_id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(result.elements[0].text(), Some("Intro"));
        let t = result.elements[1].as_table().unwrap();
        assert_eq!((t.table_id, t.rows, t.columns, t.cells), (1, 2, 2, 4));
        assert_eq!(
            result.statistics,
            DocumentStatistics {
                paragraphs: 2,
                tables: 1,
                table_rows: 2,
                table_cells: 4,
                total_elements: 3,
            }
        );
    }

    #[test]
    fn test_empty_paragraphs_leave_id_gaps() {
        let blocks = vec![
            DocumentBlock::Paragraph("a".into()),
            DocumentBlock::Paragraph(String::new()),
            DocumentBlock::Paragraph("b".into()),
        ];
        let result = assemble_document("gaps.docx", blocks);
        let ids: Vec<u32> = result.elements.iter().map(|e| e.element_id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(result.statistics.paragraphs, 2);
        assert_eq!(result.statistics.total_elements, 3);
        assert_eq!(result.statistics.skipped_elements(), 1);
    }

    #[test]
    fn test_table_ids_count_tables_only() {
        let blocks = vec![
            table(&[&["x"]], 1),
            DocumentBlock::Paragraph("between".into()),
            table(&[], 3),
        ];
        let result = assemble_document("t.docx", blocks);
        let second = result.elements[2].as_table().unwrap();
        assert_eq!(second.table_id, 2);
        assert_eq!(second.rows, 0);
        assert_eq!(second.columns, 0);
        assert_eq!(result.statistics.tables, 2);
        assert_eq!(result.statistics.table_cells, 1);
    }

    #[test]
    fn test_empty_document() {
        let result = assemble_document("empty.docx", Vec::new());
        assert!(result.elements.is_empty());
        assert_eq!(result.statistics, DocumentStatistics::default());
    }
}
