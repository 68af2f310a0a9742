//! Spreadsheet grid types.

use serde::{Deserialize, Serialize};

/// One worksheet as rows of string cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetGrid {
    /// Sheet name as listed by the workbook
    pub sheet_name: String,

    /// Cell text, row by row; empty cells are `""`
    pub data: Vec<Vec<String>>,
}

impl SheetGrid {
    /// Create a grid.
    pub fn new(sheet_name: impl Into<String>, data: Vec<Vec<String>>) -> Self {
        Self {
            sheet_name: sheet_name.into(),
            data,
        }
    }

    /// Get the number of rows.
    pub fn row_count(&self) -> usize {
        self.data.len()
    }

    /// Get the number of columns (based on first row).
    pub fn column_count(&self) -> usize {
        self.data.first().map(Vec::len).unwrap_or(0)
    }

    /// Check if the sheet has no rows.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Plain-text preview: a header naming the sheet and its size, then up to
    /// `max_rows` rows of at most `max_cols` tab-separated cells.
    pub fn preview(&self, max_rows: usize, max_cols: usize) -> String {
        let mut out = format!("Preview of sheet: {}\n", self.sheet_name);
        out.push_str(&format!(
            "Total rows: {}, columns: {}\n\n",
            self.row_count(),
            self.column_count()
        ));
        let body = self
            .data
            .iter()
            .take(max_rows)
            .map(|row| {
                row.iter()
                    .take(max_cols)
                    .map(String::as_str)
                    .collect::<Vec<_>>()
                    .join("\t")
            })
            .collect::<Vec<_>>()
            .join("\n");
        out.push_str(&body);
        out
    }
}
