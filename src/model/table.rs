//! Table types.

use serde::{Deserialize, Serialize};

/// A word-processing table flattened to rows of cell text.
///
/// Cells are plain strings: a table nested inside a cell is not represented,
/// only the text of the cell's own paragraphs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableContent {
    /// 1-based sequence number among the document's tables
    pub table_id: u32,

    /// Number of rows
    pub rows: usize,

    /// Number of grid columns (0 when there are no rows)
    pub columns: usize,

    /// Number of cells visited
    pub cells: usize,

    /// Cell text, row by row
    pub data: Vec<Vec<String>>,
}

impl TableContent {
    /// Build a table from flattened rows and the table grid's column count.
    pub fn from_rows(table_id: u32, data: Vec<Vec<String>>, grid_columns: usize) -> Self {
        let rows = data.len();
        let cells = data.iter().map(Vec::len).sum();
        let columns = if rows > 0 { grid_columns } else { 0 };
        Self {
            table_id,
            rows,
            columns,
            cells,
            data,
        }
    }

    /// Check if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }
}

/// Bounding box of a detected PDF table, top-left origin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Left edge
    pub x: f64,
    /// Top edge
    pub y: f64,
    /// Width
    pub width: f64,
    /// Height
    pub height: f64,
}

impl Position {
    /// Build a position from corner coordinates, rounded to one decimal.
    pub fn from_bbox(x0: f64, top: f64, x1: f64, bottom: f64) -> Self {
        Self {
            x: round1(x0),
            y: round1(top),
            width: round1(x1 - x0),
            height: round1(bottom - top),
        }
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// A ruled-line table found on a PDF page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PdfTable {
    /// 1-based sequence number among the page's accepted tables
    pub table_number: u32,

    /// Bounding box of the table's dividers
    pub position: Position,

    /// Cell text as extracted; `None` where the grid has no cell
    pub data: Vec<Vec<Option<String>>>,
}

impl PdfTable {
    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.data.len()
    }

    /// Number of columns (based on first row).
    pub fn column_count(&self) -> usize {
        self.data.first().map(Vec::len).unwrap_or(0)
    }
}
