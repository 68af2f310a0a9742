//! Spreadsheet workbook normalization.
//!
//! Every sheet becomes a rectangular grid of strings anchored at `A1`,
//! running to the last used row and column. Values are rendered in their
//! stored form; nothing is trimmed, sorted or de-duplicated.

use std::io::{Cursor, Read, Seek};
use std::path::Path;

use calamine::{open_workbook_auto, open_workbook_auto_from_rs, Data, Range, Reader, Sheets};
use chrono::NaiveDateTime;
use log::{debug, warn};

use crate::error::{Degradation, Result};
use crate::model::SheetGrid;

/// Layout of date-time cells.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Layout of time-only cells.
pub const TIME_FORMAT: &str = "%H:%M:%S";

/// Readable sheets of a workbook plus the sheets that had to be omitted.
#[derive(Debug, Clone, Default)]
pub struct WorkbookGrids {
    /// Grids in workbook order
    pub sheets: Vec<SheetGrid>,
    /// One entry per omitted sheet
    pub degraded: Vec<Degradation>,
}

/// Read every sheet of the workbook at `path`.
///
/// The container format (`.xlsx`, `.xlsm`, `.xls`, `.ods`) is chosen from
/// the file extension.
pub fn read_workbook<P: AsRef<Path>>(path: P) -> Result<WorkbookGrids> {
    let mut workbook = open_workbook_auto(path)?;
    Ok(read_sheets(&mut workbook))
}

/// Read every sheet of a workbook held in memory.
pub fn read_workbook_bytes(data: &[u8]) -> Result<WorkbookGrids> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(data))?;
    Ok(read_sheets(&mut workbook))
}

fn read_sheets<RS: Read + Seek>(workbook: &mut Sheets<RS>) -> WorkbookGrids {
    let names: Vec<String> = workbook.sheet_names().to_vec();
    let mut grids = WorkbookGrids::default();

    for name in names {
        match workbook.worksheet_range(&name) {
            Ok(range) => {
                let grid = normalize(&name, &range);
                debug!(
                    "sheet '{}': {} rows x {} columns",
                    name,
                    grid.row_count(),
                    grid.column_count()
                );
                grids.sheets.push(grid);
            }
            Err(e) => {
                let degradation = Degradation::UnreadableSheet {
                    sheet_name: name,
                    reason: e.to_string(),
                };
                warn!("{}", degradation);
                grids.degraded.push(degradation);
            }
        }
    }

    grids
}

/// Convert one sheet's used range into a string grid anchored at `A1`.
pub fn normalize(name: &str, range: &Range<Data>) -> SheetGrid {
    let Some((last_row, last_col)) = range.end() else {
        return SheetGrid::new(name, Vec::new());
    };

    let data = (0..=last_row)
        .map(|row| {
            (0..=last_col)
                .map(|col| range.get_value((row, col)).map(cell_to_string).unwrap_or_default())
                .collect()
        })
        .collect();

    SheetGrid::new(name, data)
}

/// Render a cell value in its stored string form.
pub fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => float_to_string(*f),
        Data::Bool(b) => if *b { "True" } else { "False" }.to_string(),
        Data::DateTime(dt) => match dt.as_datetime() {
            // Serials below one carry no date part.
            Some(value) if dt.is_datetime() && (0.0..1.0).contains(&dt.as_f64()) => {
                value.time().format(TIME_FORMAT).to_string()
            }
            Some(value) => format_datetime(value),
            None => float_to_string(dt.as_f64()),
        },
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
        Data::Error(e) => e.to_string(),
    }
}

fn format_datetime(value: NaiveDateTime) -> String {
    value.format(DATETIME_FORMAT).to_string()
}

fn float_to_string(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{:.0}", value)
    } else {
        value.to_string()
    }
}
