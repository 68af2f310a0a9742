//! Persisted JSON artifacts.
//!
//! Artifacts are rendered fully in memory, written to a temporary file in
//! the target directory and renamed into place, so a failed extraction or
//! write never leaves a partial or zero-byte file behind.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::{Error, Result};
use crate::model::{ExtractionResult, SpreadsheetResult};

use super::json::{to_json, to_json_indented, JsonFormat};

/// Rows shown in a sheet preview.
pub const PREVIEW_ROWS: usize = 5;

/// Columns shown in a sheet preview.
pub const PREVIEW_COLS: usize = 10;

/// `<output_dir>/<input-stem>.json`.
pub fn artifact_path(input: &Path, output_dir: &Path) -> PathBuf {
    output_dir.join(format!("{}.json", file_stem(input)))
}

/// Render `result` and write it next to its siblings in `output_dir`.
///
/// Returns the path of the written artifact.
pub fn write_artifact(
    result: &ExtractionResult,
    input: &Path,
    output_dir: &Path,
    format: JsonFormat,
) -> Result<PathBuf> {
    let json = to_json(result, format)?;
    let target = artifact_path(input, output_dir);
    write_atomic(&target, json.as_bytes())?;
    log::debug!("Wrote {}", target.display());
    Ok(target)
}

/// Write each sheet's grid as its own JSON file plus a text preview.
///
/// Files land in `<output_dir>/<input-stem>/`: `<sheet>.json` holds the
/// grid rows and `previews/<sheet>_preview.txt` the first
/// [`PREVIEW_ROWS`] x [`PREVIEW_COLS`] cells. Returns the JSON paths in
/// sheet order.
pub fn write_sheet_artifacts(
    result: &SpreadsheetResult,
    input: &Path,
    output_dir: &Path,
) -> Result<Vec<PathBuf>> {
    let sheet_dir = output_dir.join(file_stem(input));
    let preview_dir = sheet_dir.join("previews");
    fs::create_dir_all(&preview_dir)?;

    let mut written = Vec::with_capacity(result.sheets.len());
    for sheet in &result.sheets {
        let name = sanitize_sheet_name(&sheet.sheet_name);

        let json = to_json_indented(&sheet.data, b"    ")?;
        let json_path = sheet_dir.join(format!("{}.json", name));
        write_atomic(&json_path, json.as_bytes())?;

        let preview = sheet.preview(PREVIEW_ROWS, PREVIEW_COLS);
        write_atomic(
            &preview_dir.join(format!("{}_preview.txt", name)),
            preview.as_bytes(),
        )?;

        log::debug!("Sheet '{}' -> {}", sheet.sheet_name, json_path.display());
        written.push(json_path);
    }
    Ok(written)
}

/// File-name-safe form of a sheet name.
///
/// Keeps alphanumerics, space, `_` and `-`, replaces everything else with
/// `_` and trims surrounding whitespace.
pub fn sanitize_sheet_name(name: &str) -> String {
    let safe: String = name
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, ' ' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let safe = safe.trim();
    if safe.is_empty() {
        "empty_sheet_name".to_string()
    } else {
        safe.to_string()
    }
}

fn file_stem(input: &Path) -> String {
    input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string())
}

fn write_atomic(target: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(bytes)?;
    file.flush()?;
    file.persist(target).map_err(|e| Error::Io(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assemble::assemble_spreadsheet;
    use crate::model::SheetGrid;
    use tempfile::TempDir;

    fn grid(name: &str, rows: usize, cols: usize) -> SheetGrid {
        SheetGrid::new(
            name,
            (0..rows)
                .map(|r| (0..cols).map(|c| format!("{}{}", r, c)).collect())
                .collect(),
        )
    }

    #[test]
    fn test_artifact_path_uses_stem() {
        let path = artifact_path(Path::new("in/report.final.docx"), Path::new("out"));
        assert_eq!(path, Path::new("out/report.final.json"));
    }

    #[test]
    fn test_sanitize_sheet_name() {
        assert_eq!(sanitize_sheet_name("Q1/Q2 *draft*"), "Q1_Q2 _draft_");
        assert_eq!(sanitize_sheet_name("Лист 1"), "Лист 1");
        assert_eq!(sanitize_sheet_name("  "), "empty_sheet_name");
        assert_eq!(sanitize_sheet_name(""), "empty_sheet_name");
    }

    #[test]
    fn test_write_artifact_replaces_existing() {
        let dir = TempDir::new().unwrap();
        let input = Path::new("book.xlsx");
        let result: ExtractionResult =
            assemble_spreadsheet("book.xlsx", vec![grid("S", 1, 1)], Vec::new()).into();

        fs::write(dir.path().join("book.json"), "stale").unwrap();
        let path = write_artifact(&result, input, dir.path(), JsonFormat::Pretty).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("\"sheet_name\": \"S\""));
        let leftovers = fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[test]
    fn test_write_sheet_artifacts() {
        let dir = TempDir::new().unwrap();
        let result = assemble_spreadsheet(
            "book.xlsx",
            vec![grid("Data: 2024", 7, 12), grid("Empty", 0, 0)],
            Vec::new(),
        );

        let paths = write_sheet_artifacts(&result, Path::new("book.xlsx"), dir.path()).unwrap();
        assert_eq!(paths.len(), 2);
        assert_eq!(paths[0], dir.path().join("book").join("Data_ 2024.json"));

        let rows: Vec<Vec<String>> =
            serde_json::from_str(&fs::read_to_string(&paths[0]).unwrap()).unwrap();
        assert_eq!(rows.len(), 7);

        let preview = fs::read_to_string(
            dir.path()
                .join("book")
                .join("previews")
                .join("Data_ 2024_preview.txt"),
        )
        .unwrap();
        assert!(preview.starts_with("Preview of sheet: Data: 2024\nTotal rows: 7, columns: 12\n\n"));
        assert_eq!(preview.lines().count(), 3 + PREVIEW_ROWS);
        assert_eq!(preview.lines().last().unwrap().split('\t').count(), PREVIEW_COLS);

        let empty = fs::read_to_string(&paths[1]).unwrap();
        assert_eq!(empty, "[]");
    }
}
