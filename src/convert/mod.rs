//! Extractor registry dispatching on file extension.
//!
//! Each input family has an [`Extractor`]; the registry maps lowercase
//! extensions to extractors so callers such as the batch driver can handle
//! mixed directories.
//!
//! # Example
//!
//! ```no_run
//! use docextract::convert::ExtractorRegistry;
//! use std::path::Path;
//!
//! fn main() -> docextract::Result<()> {
//!     let registry = ExtractorRegistry::with_defaults();
//!     let result = registry.extract(Path::new("budget.xlsx"))?;
//!     println!("{}", docextract::render::summary(&result));
//!     Ok(())
//! }
//! ```

mod docx;
mod pdf;
mod sheet;

pub use docx::DocxExtractor;
pub use pdf::PdfExtractor;
pub use sheet::SpreadsheetExtractor;

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::detect::DocumentKind;
use crate::error::{Error, Result};
use crate::model::ExtractionResult;
use crate::pdf::PdfOptions;

/// Trait for per-family extractors.
///
/// Implementations hold only immutable configuration, so one instance can
/// serve many worker threads.
pub trait Extractor: Send + Sync {
    /// Supported file extensions, lowercase without the leading dot.
    fn supported_extensions(&self) -> &[&str];

    /// Name of this extractor.
    fn name(&self) -> &str;

    /// Input family handled.
    fn kind(&self) -> DocumentKind;

    /// Extract a file at the given path.
    fn extract(&self, path: &Path) -> Result<ExtractionResult>;

    /// Extract an in-memory file; `name` identifies it in the result.
    fn extract_bytes(&self, bytes: &[u8], name: &str) -> Result<ExtractionResult>;

    /// Check if this extractor supports the given extension.
    fn supports_extension(&self, ext: &str) -> bool {
        let ext_lower = ext.to_lowercase();
        self.supported_extensions().iter().any(|e| *e == ext_lower)
    }
}

/// Registry of extractors by extension and by name.
pub struct ExtractorRegistry {
    extractors: HashMap<String, Arc<dyn Extractor>>,
    by_name: HashMap<String, Arc<dyn Extractor>>,
}

impl ExtractorRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            extractors: HashMap::new(),
            by_name: HashMap::new(),
        }
    }

    /// Create a registry with the document, PDF and spreadsheet extractors.
    pub fn with_defaults() -> Self {
        Self::with_pdf_options(PdfOptions::default())
    }

    /// Default extractors, with the PDF extractor using `options`.
    pub fn with_pdf_options(options: PdfOptions) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(DocxExtractor::new()));
        registry.register(Arc::new(PdfExtractor::with_options(options)));
        registry.register(Arc::new(SpreadsheetExtractor::new()));
        registry
    }

    /// Register an extractor for all its supported extensions.
    pub fn register(&mut self, extractor: Arc<dyn Extractor>) {
        for ext in extractor.supported_extensions() {
            self.extractors
                .insert(ext.to_lowercase(), extractor.clone());
        }
        self.by_name
            .insert(extractor.name().to_lowercase(), extractor);
    }

    /// Get an extractor by file extension.
    pub fn get_by_extension(&self, ext: &str) -> Option<Arc<dyn Extractor>> {
        self.extractors.get(&ext.to_lowercase()).cloned()
    }

    /// Get an extractor by name.
    pub fn get_by_name(&self, name: &str) -> Option<Arc<dyn Extractor>> {
        self.by_name.get(&name.to_lowercase()).cloned()
    }

    /// Get the extractor for a path's extension.
    pub fn get_for_path(&self, path: &Path) -> Option<Arc<dyn Extractor>> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(|ext| self.get_by_extension(ext))
    }

    /// Check if an extension is supported.
    pub fn supports(&self, ext: &str) -> bool {
        self.extractors.contains_key(&ext.to_lowercase())
    }

    /// Get all supported extensions, sorted.
    pub fn supported_extensions(&self) -> Vec<&str> {
        let mut exts: Vec<&str> = self.extractors.keys().map(|s| s.as_str()).collect();
        exts.sort_unstable();
        exts
    }

    /// Extract a file using the extractor for its extension.
    pub fn extract(&self, path: &Path) -> Result<ExtractionResult> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| Error::UnsupportedFormat("file has no extension".into()))?;

        let extractor = self
            .get_by_extension(ext)
            .ok_or_else(|| Error::UnsupportedFormat(format!("no extractor for extension: {}", ext)))?;

        extractor.extract(path)
    }

    /// Extract bytes, choosing the extractor by `ext`.
    pub fn extract_bytes(&self, bytes: &[u8], ext: &str, name: &str) -> Result<ExtractionResult> {
        let extractor = self
            .get_by_extension(ext)
            .ok_or_else(|| Error::UnsupportedFormat(format!("no extractor for extension: {}", ext)))?;

        extractor.extract_bytes(bytes, name)
    }
}

impl Default for ExtractorRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
