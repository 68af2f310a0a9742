//! Directory batch processing.
//!
//! Supported files are discovered recursively, extracted in parallel and
//! written as JSON artifacts into per-kind subfolders of the output
//! directory (`docx/`, `pdf/`, `excel/`). One file failing never affects
//! the others.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use rayon::prelude::*;
use walkdir::WalkDir;

use crate::convert::ExtractorRegistry;
use crate::detect::DocumentKind;
use crate::error::{Error, Result};
use crate::model::ExtractionResult;
use crate::pdf::PdfOptions;
use crate::render::{artifact_path, write_artifact, write_sheet_artifacts, JsonFormat};

/// Options for a batch run.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Directory receiving the per-kind subfolders
    pub output_dir: PathBuf,

    /// JSON layout of the artifacts
    pub format: JsonFormat,

    /// Also write one JSON file and a preview per sheet for workbooks
    pub split_sheets: bool,

    /// Tolerances for PDF files
    pub pdf_options: PdfOptions,
}

impl BatchOptions {
    /// Create options writing into `output_dir`.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            format: JsonFormat::Pretty,
            split_sheets: false,
            pdf_options: PdfOptions::default(),
        }
    }

    /// Set the JSON layout.
    pub fn with_format(mut self, format: JsonFormat) -> Self {
        self.format = format;
        self
    }

    /// Enable per-sheet artifacts.
    pub fn with_split_sheets(mut self, split: bool) -> Self {
        self.split_sheets = split;
        self
    }

    /// Set PDF tolerances.
    pub fn with_pdf_options(mut self, options: PdfOptions) -> Self {
        self.pdf_options = options;
        self
    }
}

/// A file that was extracted and written.
#[derive(Debug, Clone)]
pub struct BatchSuccess {
    pub input: PathBuf,
    pub kind: DocumentKind,
    /// Main artifact first, then any per-sheet artifacts
    pub outputs: Vec<PathBuf>,
    /// Pages or sheets recorded as degraded
    pub degradations: usize,
    pub elapsed_secs: f64,
}

/// A file that could not be extracted or written.
#[derive(Debug, Clone)]
pub struct BatchFailure {
    pub input: PathBuf,
    pub error: String,
}

/// Outcome of a batch run, in discovery order.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub succeeded: Vec<BatchSuccess>,
    pub failed: Vec<BatchFailure>,
}

impl BatchReport {
    /// Number of files attempted.
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    /// Whether every file succeeded.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// Successful files of one kind.
    pub fn count_of(&self, kind: DocumentKind) -> usize {
        self.succeeded.iter().filter(|s| s.kind == kind).count()
    }
}

/// Find supported files under `input_dir`, skipping `output_dir`.
///
/// Paths come back sorted.
pub fn discover(
    input_dir: &Path,
    output_dir: &Path,
    registry: &ExtractorRegistry,
) -> Result<Vec<PathBuf>> {
    if !input_dir.is_dir() {
        return Err(Error::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("not a directory: {}", input_dir.display()),
        )));
    }
    let skip = output_dir.canonicalize().ok();

    let mut files = Vec::new();
    let walker = WalkDir::new(input_dir).into_iter().filter_entry(|entry| {
        match (&skip, entry.path().canonicalize()) {
            (Some(skip), Ok(path)) => !path.starts_with(skip),
            _ => true,
        }
    });
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };
        if entry.file_type().is_file() && registry.get_for_path(entry.path()).is_some() {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}

/// Process every supported file under `input_dir`.
pub fn run_batch(input_dir: &Path, options: &BatchOptions) -> Result<BatchReport> {
    run_batch_with_progress(input_dir, options, |_| {}, |_| {})
}

/// Process every supported file under `input_dir`, reporting progress.
///
/// `on_start` receives the number of files discovered; `on_done` is called
/// from worker threads after each file. Files whose artifacts would land on
/// the same path are processed in discovery order by one worker, so the
/// last of them determines the artifact.
pub fn run_batch_with_progress<S, D>(
    input_dir: &Path,
    options: &BatchOptions,
    on_start: S,
    on_done: D,
) -> Result<BatchReport>
where
    S: FnOnce(usize),
    D: Fn(&Path) + Sync,
{
    options.pdf_options.validate()?;
    let registry = ExtractorRegistry::with_pdf_options(options.pdf_options);
    let files = discover(input_dir, &options.output_dir, &registry)?;
    log::info!("Found {} supported files in {}", files.len(), input_dir.display());
    on_start(files.len());

    let groups = group_by_target(&files, &options.output_dir, &registry);
    let mut outcomes: Vec<(usize, std::result::Result<BatchSuccess, BatchFailure>)> = groups
        .par_iter()
        .flat_map_iter(|group| {
            // Inputs sharing a target run one after another so the last wins.
            group
                .iter()
                .map(|&index| {
                    let input = &files[index];
                    let outcome = process_file(input, &registry, options);
                    on_done(input);
                    (index, outcome)
                })
                .collect::<Vec<_>>()
        })
        .collect();
    outcomes.sort_by_key(|(index, _)| *index);

    let mut report = BatchReport::default();
    for (_, outcome) in outcomes {
        match outcome {
            Ok(success) => report.succeeded.push(success),
            Err(failure) => report.failed.push(failure),
        }
    }
    Ok(report)
}

/// Indices of `files` grouped by the artifact they would write, each group
/// in discovery order.
fn group_by_target(
    files: &[PathBuf],
    output_dir: &Path,
    registry: &ExtractorRegistry,
) -> Vec<Vec<usize>> {
    let mut groups: Vec<Vec<usize>> = Vec::new();
    let mut by_target: HashMap<PathBuf, usize> = HashMap::new();

    for (index, input) in files.iter().enumerate() {
        let Some(target) = target_path(input, output_dir, registry) else {
            groups.push(vec![index]);
            continue;
        };
        match by_target.get(&target) {
            Some(&group) => {
                log::warn!(
                    "{} and {} both write {}; the later file wins",
                    files[groups[group][0]].display(),
                    input.display(),
                    target.display()
                );
                groups[group].push(index);
            }
            None => {
                by_target.insert(target, groups.len());
                groups.push(vec![index]);
            }
        }
    }
    groups
}

fn target_path(input: &Path, output_dir: &Path, registry: &ExtractorRegistry) -> Option<PathBuf> {
    let extractor = registry.get_for_path(input)?;
    let target_dir = output_dir.join(extractor.kind().output_folder());
    Some(artifact_path(input, &target_dir))
}

fn process_file(
    input: &Path,
    registry: &ExtractorRegistry,
    options: &BatchOptions,
) -> std::result::Result<BatchSuccess, BatchFailure> {
    let start = Instant::now();
    match extract_and_write(input, registry, options) {
        Ok((result, outputs)) => {
            let elapsed_secs = start.elapsed().as_secs_f64();
            log::info!(
                "Processed {} -> {} ({:.2}s)",
                input.display(),
                outputs[0].display(),
                elapsed_secs
            );
            Ok(BatchSuccess {
                input: input.to_path_buf(),
                kind: result.kind(),
                outputs,
                degradations: result.degradations().len(),
                elapsed_secs,
            })
        }
        Err(e) => {
            log::warn!("Failed to process {}: {}", input.display(), e);
            Err(BatchFailure {
                input: input.to_path_buf(),
                error: e.to_string(),
            })
        }
    }
}

fn extract_and_write(
    input: &Path,
    registry: &ExtractorRegistry,
    options: &BatchOptions,
) -> Result<(ExtractionResult, Vec<PathBuf>)> {
    let extractor = registry.get_for_path(input).ok_or_else(|| {
        Error::UnsupportedFormat(format!("no extractor for {}", input.display()))
    })?;
    let result = extractor.extract(input)?;

    let target_dir = options.output_dir.join(extractor.kind().output_folder());
    let mut outputs = vec![write_artifact(&result, input, &target_dir, options.format)?];

    if let (true, ExtractionResult::Spreadsheet(workbook)) = (options.split_sheets, &result) {
        outputs.extend(write_sheet_artifacts(workbook, input, &target_dir)?);
    }
    Ok((result, outputs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_discover_filters_and_skips_output() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("nested")).unwrap();
        fs::create_dir_all(root.join("out/pdf")).unwrap();
        fs::write(root.join("a.docx"), b"").unwrap();
        fs::write(root.join("nested/b.PDF"), b"").unwrap();
        fs::write(root.join("notes.txt"), b"").unwrap();
        fs::write(root.join("out/pdf/old.pdf"), b"").unwrap();

        let registry = ExtractorRegistry::with_defaults();
        let files = discover(root, &root.join("out"), &registry).unwrap();
        assert_eq!(files, vec![root.join("a.docx"), root.join("nested/b.PDF")]);
    }

    #[test]
    fn test_discover_missing_dir() {
        let registry = ExtractorRegistry::with_defaults();
        let err = discover(Path::new("no/such/dir"), Path::new("out"), &registry).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_failed_file_leaves_no_artifact() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        fs::write(input.path().join("broken.docx"), b"not a zip").unwrap();

        let report = run_batch(input.path(), &BatchOptions::new(output.path())).unwrap();
        assert_eq!(report.total(), 1);
        assert!(!report.is_success());
        assert_eq!(report.failed[0].input, input.path().join("broken.docx"));
        assert!(!output.path().join("docx").join("broken.json").exists());
    }

    #[test]
    fn test_group_by_target_keeps_discovery_order() {
        let files = vec![
            PathBuf::from("a/book.xls"),
            PathBuf::from("a/report.docx"),
            PathBuf::from("b/book.xlsx"),
            PathBuf::from("b/report.docx"),
            PathBuf::from("b/report.pdf"),
        ];
        let registry = ExtractorRegistry::with_defaults();
        let groups = group_by_target(&files, Path::new("out"), &registry);
        assert_eq!(groups, vec![vec![0, 2], vec![1, 3], vec![4]]);
    }

    #[test]
    fn test_report_counts() {
        let report = BatchReport {
            succeeded: vec![BatchSuccess {
                input: PathBuf::from("a.pdf"),
                kind: DocumentKind::Pdf,
                outputs: vec![PathBuf::from("out/pdf/a.json")],
                degradations: 0,
                elapsed_secs: 0.1,
            }],
            failed: Vec::new(),
        };
        assert_eq!(report.total(), 1);
        assert!(report.is_success());
        assert_eq!(report.count_of(DocumentKind::Pdf), 1);
        assert_eq!(report.count_of(DocumentKind::Docx), 0);
    }
}
