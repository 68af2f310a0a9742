//! Human-readable summaries of extraction results.

use crate::model::{DocumentResult, ExtractionResult, PdfResult, SpreadsheetResult};

const RULE_WIDTH: usize = 50;

/// Per-file statistics as plain text, one `label: value` line each.
pub fn summary(result: &ExtractionResult) -> String {
    let mut lines = match result {
        ExtractionResult::Document(r) => document_summary(r),
        ExtractionResult::Pdf(r) => pdf_summary(r),
        ExtractionResult::Spreadsheet(r) => spreadsheet_summary(r),
    };
    for degradation in result.degradations() {
        lines.push(format!("Warning: {}", degradation));
    }
    lines.join("\n")
}

fn document_summary(result: &DocumentResult) -> Vec<String> {
    let stats = &result.statistics;
    vec![
        format!("File name: {}", result.file_name),
        format!("Total elements: {}", stats.total_elements),
        format!("Paragraphs: {}", stats.paragraphs),
        format!("Tables: {}", stats.tables),
        format!("Table rows: {}", stats.table_rows),
        format!("Table cells: {}", stats.table_cells),
    ]
}

fn pdf_summary(result: &PdfResult) -> Vec<String> {
    vec![
        format!("Source file: {}", result.source_file),
        format!("Pages: {}", result.pages.len()),
        format!("Pages with text: {}", result.pages_with_text()),
        format!("Tables: {}", result.table_count()),
    ]
}

fn spreadsheet_summary(result: &SpreadsheetResult) -> Vec<String> {
    let mut lines = vec![
        format!("Source file: {}", result.source_file),
        format!("Sheets: {}", result.sheets.len()),
    ];
    lines.extend(result.sheets.iter().map(|sheet| {
        format!(
            "  {}: {} rows x {} columns",
            sheet.sheet_name,
            sheet.row_count(),
            sheet.column_count()
        )
    }));
    lines
}

/// Page texts of a PDF, each headed by its page number, between rules.
pub fn page_texts(result: &PdfResult) -> String {
    let rule = "-".repeat(RULE_WIDTH);
    let pages = result
        .pages
        .iter()
        .map(|page| format!("Page {}:\n{}", page.page_number, page.text))
        .collect::<Vec<_>>()
        .join(&format!("\n\n{}\n\n", rule));
    format!("{rule}\n\n{pages}\n\n{rule}")
}
