//! Rendering options and configuration.

use super::CleanupOptions;

/// Options for rendering document content.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// How to render tables with merged cells
    pub table_fallback: TableFallback,

    /// Maximum heading level (1-6)
    pub max_heading_level: u8,

    /// Character to use for unordered list markers
    pub list_marker: char,

    /// Pad table cells so pipes align across rows
    pub pad_cells: bool,

    /// Escape special Markdown characters in text runs
    pub escape_special_chars: bool,

    /// Text cleanup options
    pub cleanup: Option<CleanupOptions>,
}

impl RenderOptions {
    /// Create new render options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the table fallback mode.
    pub fn with_table_fallback(mut self, fallback: TableFallback) -> Self {
        self.table_fallback = fallback;
        self
    }

    /// Set the maximum heading level.
    pub fn with_max_heading(mut self, level: u8) -> Self {
        self.max_heading_level = level.clamp(1, 6);
        self
    }

    /// Set the list marker character.
    pub fn with_list_marker(mut self, marker: char) -> Self {
        self.list_marker = marker;
        self
    }

    /// Enable or disable cell padding.
    pub fn with_pad_cells(mut self, pad: bool) -> Self {
        self.pad_cells = pad;
        self
    }

    /// Enable or disable Markdown escaping.
    pub fn with_escaping(mut self, escape: bool) -> Self {
        self.escape_special_chars = escape;
        self
    }

    /// Set cleanup options.
    pub fn with_cleanup(mut self, cleanup: CleanupOptions) -> Self {
        self.cleanup = Some(cleanup);
        self
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            table_fallback: TableFallback::Markdown,
            max_heading_level: 6,
            list_marker: '-',
            pad_cells: false,
            escape_special_chars: false,
            cleanup: None,
        }
    }
}

/// How to render tables that plain GFM cannot express.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TableFallback {
    /// Always emit a GFM pipe table; merged regions keep their text in the
    /// anchor cell with empty continuation cells
    #[default]
    Markdown,
    /// Emit an HTML table with rowspan/colspan attributes when the table
    /// has merged cells
    Html,
}
