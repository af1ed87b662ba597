//! # pagemark
//!
//! Reconstructs semantic document structure from low-level page geometry.
//!
//! PDF parsing is delegated to an external [`PageLayoutProvider`]; this
//! library takes the provider's flat primitives per page (positioned text
//! spans, drawn line segments, link rectangles) and rebuilds tables,
//! headings, lists, and hyperlinks, rendering the result as
//! GitHub-Flavored Markdown.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pagemark::{to_markdown, PageLayoutProvider};
//!
//! fn convert(provider: &dyn PageLayoutProvider) -> pagemark::Result<()> {
//!     let markdown = to_markdown(provider)?;
//!     println!("{}", markdown);
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Border-based table detection**: grids rebuilt from drawn rulings,
//!   merged cells included
//! - **Alignment fallback**: borderless tables inferred from text position
//! - **Block classification**: headings, list items, and paragraphs from
//!   font metrics and marker glyphs
//! - **Hyperlink embedding**: link annotations matched to the spans they
//!   cover
//! - **Parallel processing**: pages and batch files fan out via Rayon

pub mod config;
pub mod error;
pub mod layout;
pub mod model;
pub mod pipeline;
pub mod provider;
pub mod render;

// Re-export commonly used types
pub use config::LayoutConfig;
pub use error::{Error, Result};
pub use model::{
    Alignment, Block, Document, InlineContent, Page, Paragraph, Table, TableCell, TableRow,
    TextRun, TextStyle,
};
pub use pipeline::{process_batch, process_document, BatchEntry, ErrorMode, ProcessOptions};
pub use provider::{BoundingBox, LinePrimitive, LinkRect, PageGeometry, PageLayoutProvider, TextSpan};
pub use render::{CleanupOptions, JsonFormat, RenderOptions, TableFallback};

/// Convert a provider's document to Markdown with default settings.
///
/// # Example
///
/// ```no_run
/// # fn provider() -> Box<dyn pagemark::PageLayoutProvider> { unimplemented!() }
/// let markdown = pagemark::to_markdown(provider().as_ref()).unwrap();
/// std::fs::write("output.md", markdown).unwrap();
/// ```
pub fn to_markdown(provider: &dyn PageLayoutProvider) -> Result<String> {
    pipeline::document_to_markdown(
        provider,
        &LayoutConfig::default(),
        &ProcessOptions::default(),
        &RenderOptions::default(),
    )
}

/// Convert a single page's geometry to a Markdown string.
///
/// The page pipeline is a pure function of the geometry and configuration,
/// so this is safe to call concurrently from any number of threads.
pub fn page_to_markdown(
    geometry: &PageGeometry,
    config: &LayoutConfig,
    options: &RenderOptions,
) -> String {
    let page = layout::process_page(geometry, config);
    render::MarkdownRenderer::new(options.clone()).render_page(&page)
}

/// Builder for structure reconstruction with custom settings.
///
/// # Example
///
/// ```no_run
/// use pagemark::{Pagemark, LayoutConfig, TableFallback};
///
/// # fn provider() -> Box<dyn pagemark::PageLayoutProvider> { unimplemented!() }
/// let markdown = Pagemark::new()
///     .with_config(LayoutConfig::new().with_heading_size_ratio(1.3))
///     .with_table_fallback(TableFallback::Html)
///     .strict()
///     .process(provider().as_ref())?
///     .to_markdown()?;
/// # Ok::<(), pagemark::Error>(())
/// ```
pub struct Pagemark {
    config: LayoutConfig,
    process_options: ProcessOptions,
    render_options: RenderOptions,
}

impl Pagemark {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            config: LayoutConfig::default(),
            process_options: ProcessOptions::default(),
            render_options: RenderOptions::default(),
        }
    }

    /// Set the layout configuration.
    pub fn with_config(mut self, config: LayoutConfig) -> Self {
        self.config = config;
        self
    }

    /// Fail on the first provider error instead of skipping pages.
    pub fn strict(mut self) -> Self {
        self.process_options = self.process_options.strict();
        self
    }

    /// Disable parallel page processing.
    pub fn sequential(mut self) -> Self {
        self.process_options = self.process_options.sequential();
        self
    }

    /// Set the table fallback mode.
    pub fn with_table_fallback(mut self, fallback: TableFallback) -> Self {
        self.render_options = self.render_options.with_table_fallback(fallback);
        self
    }

    /// Enable output cleanup.
    pub fn with_cleanup(mut self, cleanup: CleanupOptions) -> Self {
        self.render_options = self.render_options.with_cleanup(cleanup);
        self
    }

    /// Pad table cells so pipes align.
    pub fn with_padded_cells(mut self) -> Self {
        self.render_options = self.render_options.with_pad_cells(true);
        self
    }

    /// Process a provider's document and return a result wrapper.
    pub fn process(self, provider: &dyn PageLayoutProvider) -> Result<ProcessedDocument> {
        let document = process_document(provider, &self.config, &self.process_options)?;
        Ok(ProcessedDocument {
            document,
            render_options: self.render_options,
        })
    }
}

impl Default for Pagemark {
    fn default() -> Self {
        Self::new()
    }
}

/// A processed document ready for rendering.
pub struct ProcessedDocument {
    /// The reconstructed document
    pub document: Document,
    render_options: RenderOptions,
}

impl ProcessedDocument {
    /// Convert to Markdown.
    pub fn to_markdown(&self) -> Result<String> {
        render::to_markdown(&self.document, &self.render_options)
    }

    /// Convert to plain text.
    pub fn to_text(&self) -> Result<String> {
        render::to_text(&self.document, &self.render_options)
    }

    /// Convert to JSON.
    pub fn to_json(&self, format: JsonFormat) -> Result<String> {
        render::to_json(&self.document, format)
    }

    /// Get the document.
    pub fn document(&self) -> &Document {
        &self.document
    }
}
