//! Rendering of extraction results: JSON, artifacts on disk and summaries.

mod artifact;
mod json;
mod summary;

pub use artifact::{
    artifact_path, sanitize_sheet_name, write_artifact, write_sheet_artifacts, PREVIEW_COLS,
    PREVIEW_ROWS,
};
pub use json::{indent_for, to_json, to_json_indented, JsonFormat};
pub use summary::{page_texts, summary};
