//! Tolerances and table-finding settings for PDF extraction.
//!
//! Every tolerance must be finite and greater than zero; edge lengths must
//! be finite and not negative. [`PdfOptions::validate`] checks this before
//! any page is read.

use crate::error::{Error, Result};

/// Fewest rows a detected table must have to be reported.
pub const MIN_TABLE_ROWS: usize = 2;

/// Fewest columns a detected table must have to be reported.
pub const MIN_TABLE_COLS: usize = 2;

/// Word and line grouping tolerances for page text, in page units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextTolerance {
    /// Largest horizontal gap between chars of one word
    pub x: f64,
    /// Largest vertical offset between chars of one line
    pub y: f64,
}

impl TextTolerance {
    /// Create a tolerance pair.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl TextTolerance {
    /// Check both tolerances.
    pub fn validate(&self) -> Result<()> {
        positive("text x tolerance", self.x)?;
        positive("text y tolerance", self.y)
    }
}

impl Default for TextTolerance {
    fn default() -> Self {
        Self { x: 1.0, y: 1.0 }
    }
}

/// Settings of the ruled-line table finder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableSettings {
    /// Edges closer than this on their cross axis are snapped together
    pub snap_tolerance: f64,

    /// Collinear edges with a gap up to this are joined
    pub join_tolerance: f64,

    /// Joined edges shorter than this are dropped
    pub edge_min_length: f64,

    /// Raw edges shorter than this are dropped before snapping
    pub edge_min_length_prefilter: f64,

    /// Slack allowed when intersecting vertical and horizontal edges
    pub intersection_tolerance: f64,

    /// Text tolerance used for cell text when the per-axis values are unset
    pub text_tolerance: f64,

    /// Horizontal text tolerance inside cells
    pub text_x_tolerance: Option<f64>,

    /// Vertical text tolerance inside cells
    pub text_y_tolerance: Option<f64>,
}

impl TableSettings {
    /// Create settings with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the snap tolerance.
    pub fn with_snap_tolerance(mut self, tolerance: f64) -> Self {
        self.snap_tolerance = tolerance;
        self
    }

    /// Set the join tolerance.
    pub fn with_join_tolerance(mut self, tolerance: f64) -> Self {
        self.join_tolerance = tolerance;
        self
    }

    /// Set the minimum length of joined edges.
    pub fn with_edge_min_length(mut self, length: f64) -> Self {
        self.edge_min_length = length;
        self
    }

    /// Set the intersection tolerance.
    pub fn with_intersection_tolerance(mut self, tolerance: f64) -> Self {
        self.intersection_tolerance = tolerance;
        self
    }

    /// Set the shared cell text tolerance.
    pub fn with_text_tolerance(mut self, tolerance: f64) -> Self {
        self.text_tolerance = tolerance;
        self
    }

    /// Override the per-axis cell text tolerances.
    pub fn with_text_tolerances(mut self, x: f64, y: f64) -> Self {
        self.text_x_tolerance = Some(x);
        self.text_y_tolerance = Some(y);
        self
    }

    /// Check every tolerance and length.
    pub fn validate(&self) -> Result<()> {
        positive("snap tolerance", self.snap_tolerance)?;
        positive("join tolerance", self.join_tolerance)?;
        positive("intersection tolerance", self.intersection_tolerance)?;
        positive("cell text tolerance", self.text_tolerance)?;
        if let Some(x) = self.text_x_tolerance {
            positive("cell text x tolerance", x)?;
        }
        if let Some(y) = self.text_y_tolerance {
            positive("cell text y tolerance", y)?;
        }
        non_negative("edge min length", self.edge_min_length)?;
        non_negative("edge min length prefilter", self.edge_min_length_prefilter)
    }

    /// Resolved tolerances used for cell text.
    pub fn cell_text_tolerance(&self) -> TextTolerance {
        TextTolerance {
            x: self.text_x_tolerance.unwrap_or(self.text_tolerance),
            y: self.text_y_tolerance.unwrap_or(self.text_tolerance),
        }
    }
}

impl Default for TableSettings {
    fn default() -> Self {
        Self {
            snap_tolerance: 5.0,
            join_tolerance: 5.0,
            edge_min_length: 10.0,
            edge_min_length_prefilter: 1.0,
            intersection_tolerance: 3.0,
            text_tolerance: 5.0,
            text_x_tolerance: None,
            text_y_tolerance: None,
        }
    }
}

/// Options for extracting a PDF document.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PdfOptions {
    /// Grouping tolerances for page text
    pub text_tolerance: TextTolerance,

    /// Table finder settings
    pub table_settings: TableSettings,
}

impl PdfOptions {
    /// Create new options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set page text tolerances.
    pub fn with_text_tolerance(mut self, tolerance: TextTolerance) -> Self {
        self.text_tolerance = tolerance;
        self
    }

    /// Set table finder settings.
    pub fn with_table_settings(mut self, settings: TableSettings) -> Self {
        self.table_settings = settings;
        self
    }

    /// Check page text tolerances and table settings.
    pub fn validate(&self) -> Result<()> {
        self.text_tolerance.validate()?;
        self.table_settings.validate()
    }
}

fn positive(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidOption(format!(
            "{} must be greater than 0, got {}",
            name, value
        )))
    }
}

fn non_negative(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidOption(format!(
            "{} must not be negative, got {}",
            name, value
        )))
    }
}
