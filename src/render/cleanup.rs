//! Post-render text cleanup.
//!
//! Geometry-derived output tends to carry artifacts: decomposed accents
//! from glyph extraction, stray trailing spaces from span joining, and
//! runs of blank lines where empty regions were skipped.

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Cleanup configuration.
#[derive(Debug, Clone)]
pub struct CleanupOptions {
    /// Recompose decomposed characters (NFC normalization)
    pub normalize_unicode: bool,

    /// Collapse runs of 3+ newlines to a single blank line
    pub collapse_blank_lines: bool,

    /// Strip trailing whitespace from every line
    pub trim_line_whitespace: bool,
}

impl Default for CleanupOptions {
    fn default() -> Self {
        Self {
            normalize_unicode: true,
            collapse_blank_lines: true,
            trim_line_whitespace: true,
        }
    }
}

/// Applies the configured cleanup steps in order.
pub struct CleanupPipeline {
    options: CleanupOptions,
    blank_lines: Regex,
    trailing_space: Regex,
}

impl CleanupPipeline {
    /// Build a pipeline for the given options.
    pub fn new(options: CleanupOptions) -> Self {
        Self {
            options,
            blank_lines: Regex::new(r"\n{3,}").unwrap(),
            trailing_space: Regex::new(r"(?m)[ \t]+$").unwrap(),
        }
    }

    /// Run the pipeline over rendered text.
    pub fn process(&self, text: &str) -> String {
        let mut result = if self.options.normalize_unicode {
            text.nfc().collect()
        } else {
            text.to_string()
        };

        if self.options.trim_line_whitespace {
            result = self.trailing_space.replace_all(&result, "").to_string();
        }

        if self.options.collapse_blank_lines {
            result = self.blank_lines.replace_all(&result, "\n\n").to_string();
        }

        result
    }
}
