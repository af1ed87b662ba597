//! Pipeline configuration.
//!
//! Every detection heuristic reads its thresholds from [`LayoutConfig`]
//! instead of hiding constants in the code, so behavior can be tuned per
//! document corpus without touching the detectors.

/// Tunable thresholds for the geometry-to-structure pipeline.
#[derive(Debug, Clone)]
pub struct LayoutConfig {
    /// Cross-axis tolerance for clustering near-collinear segments into one
    /// canonical boundary (points). The effective tolerance per cluster is
    /// `max(line_tolerance, stroke width)`.
    pub line_tolerance: f32,

    /// Segments shorter than this are treated as noise (points).
    pub min_segment_length: f32,

    /// A primitive counts as a line when its thin dimension is at most this
    /// thick (points); anything thicker in both dimensions is a rectangle
    /// and contributes its four edges instead.
    pub max_stroke_thickness: f32,

    /// Minimum rows for an accepted table.
    pub min_table_rows: usize,

    /// Minimum columns for an accepted table.
    pub min_table_cols: usize,

    /// Baseline tolerance for grouping spans into rows/lines (points).
    pub row_gap_tolerance: f32,

    /// Left-edge tolerance for column alignment in the fallback detector
    /// (points).
    pub column_align_tolerance: f32,

    /// A block is a heading when its font size reaches this multiple of the
    /// page's median body size. The threshold is inclusive.
    pub heading_size_ratio: f32,

    /// A vertical gap larger than the line's font size times this factor
    /// starts a new text block.
    pub block_gap_factor: f32,

    /// Indent width of one list nesting level (points).
    pub list_indent_step: f32,
}

impl LayoutConfig {
    /// Create a config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the boundary clustering tolerance.
    pub fn with_line_tolerance(mut self, tolerance: f32) -> Self {
        self.line_tolerance = tolerance;
        self
    }

    /// Set the minimum segment length.
    pub fn with_min_segment_length(mut self, length: f32) -> Self {
        self.min_segment_length = length;
        self
    }

    /// Set the minimum table dimensions.
    pub fn with_min_table_size(mut self, rows: usize, cols: usize) -> Self {
        self.min_table_rows = rows;
        self.min_table_cols = cols;
        self
    }

    /// Set the row baseline tolerance.
    pub fn with_row_gap_tolerance(mut self, tolerance: f32) -> Self {
        self.row_gap_tolerance = tolerance;
        self
    }

    /// Set the column alignment tolerance.
    pub fn with_column_align_tolerance(mut self, tolerance: f32) -> Self {
        self.column_align_tolerance = tolerance;
        self
    }

    /// Set the heading size ratio.
    pub fn with_heading_size_ratio(mut self, ratio: f32) -> Self {
        self.heading_size_ratio = ratio;
        self
    }

    /// Set the block gap factor.
    pub fn with_block_gap_factor(mut self, factor: f32) -> Self {
        self.block_gap_factor = factor;
        self
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            line_tolerance: 1.0,
            min_segment_length: 10.0,
            max_stroke_thickness: 2.0,
            min_table_rows: 2,
            min_table_cols: 2,
            row_gap_tolerance: 2.0,
            column_align_tolerance: 3.0,
            heading_size_ratio: 1.2,
            block_gap_factor: 1.5,
            list_indent_step: 18.0,
        }
    }
}
