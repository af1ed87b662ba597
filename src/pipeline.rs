//! Document and batch processing drivers.
//!
//! Each page's geometry-to-blocks pass depends only on that page's
//! primitives and the configuration, so pages fan out across worker
//! threads with no shared state. Failure isolation follows the same
//! boundary: a failing page is skipped (lenient mode), a failing file
//! taints only its own batch entry.

use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::config::LayoutConfig;
use crate::error::Result;
use crate::layout::process_page;
use crate::model::{Document, Page};
use crate::provider::PageLayoutProvider;
use crate::render::{self, RenderOptions};

/// Error handling mode during document processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Skip pages whose provider call fails, keep the rest
    #[default]
    Lenient,
    /// Fail the document on the first provider error
    Strict,
}

/// Options for document processing.
#[derive(Debug, Clone)]
pub struct ProcessOptions {
    /// Error handling mode
    pub error_mode: ErrorMode,

    /// Whether to process pages in parallel
    pub parallel: bool,
}

impl ProcessOptions {
    /// Create new options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail on the first provider error.
    pub fn strict(mut self) -> Self {
        self.error_mode = ErrorMode::Strict;
        self
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self {
            error_mode: ErrorMode::Lenient,
            parallel: true,
        }
    }
}

/// Process every page of a provider's document into the structured model.
pub fn process_document(
    provider: &dyn PageLayoutProvider,
    config: &LayoutConfig,
    options: &ProcessOptions,
) -> Result<Document> {
    let count = provider.page_count();
    let numbers: Vec<u32> = (1..=count).collect();

    let run = |n: &u32| -> (u32, Result<Page>) {
        let page = provider
            .page_geometry(*n)
            .map(|geometry| process_page(&geometry, config));
        (*n, page)
    };

    let results: Vec<(u32, Result<Page>)> = if options.parallel {
        numbers.par_iter().map(run).collect()
    } else {
        numbers.iter().map(run).collect()
    };

    let mut document = Document::new();
    for (number, result) in results {
        match result {
            Ok(page) => document.add_page(page),
            Err(e) => match options.error_mode {
                ErrorMode::Strict => return Err(e),
                ErrorMode::Lenient => {
                    log::warn!("skipping page {}: {}", number, e);
                }
            },
        }
    }

    Ok(document)
}

/// Outcome of one file in a batch run.
#[derive(Debug)]
pub struct BatchEntry {
    /// Source file path
    pub path: PathBuf,
    /// Rendered Markdown, or the error that stopped this file
    pub result: Result<String>,
}

impl BatchEntry {
    /// Whether this file produced output.
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Process a pre-resolved list of files, one provider per file.
///
/// Files are independent: any file whose provider fails to open or whose
/// processing errors gets an `Err` entry while the rest of the batch
/// completes normally. Entries come back in input order.
pub fn process_batch<F>(
    paths: &[PathBuf],
    open: F,
    config: &LayoutConfig,
    options: &ProcessOptions,
    render_options: &RenderOptions,
) -> Vec<BatchEntry>
where
    F: Fn(&Path) -> Result<Box<dyn PageLayoutProvider>> + Sync,
{
    let run = |path: &PathBuf| -> BatchEntry {
        let result = open(path)
            .and_then(|provider| process_document(provider.as_ref(), config, options))
            .and_then(|document| render::to_markdown(&document, render_options));
        if let Err(ref e) = result {
            log::error!("batch: {} failed: {}", path.display(), e);
        }
        BatchEntry {
            path: path.clone(),
            result,
        }
    };

    if options.parallel {
        paths.par_iter().map(run).collect()
    } else {
        paths.iter().map(run).collect()
    }
}

/// Convenience: process a document and render it straight to Markdown.
pub fn document_to_markdown(
    provider: &dyn PageLayoutProvider,
    config: &LayoutConfig,
    options: &ProcessOptions,
    render_options: &RenderOptions,
) -> Result<String> {
    let document = process_document(provider, config, options)?;
    render::to_markdown(&document, render_options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::provider::{BoundingBox, PageGeometry, TextSpan};

    struct StubProvider {
        pages: Vec<PageGeometry>,
        fail_page: Option<u32>,
    }

    impl StubProvider {
        fn with_text(lines: &[&str]) -> Self {
            let mut geometry = PageGeometry::new(1, 612.0, 792.0);
            for (i, line) in lines.iter().enumerate() {
                geometry.spans.push(TextSpan::new(
                    *line,
                    BoundingBox::new(
                        50.0,
                        100.0 + i as f32 * 40.0,
                        300.0,
                        110.0 + i as f32 * 40.0,
                    ),
                    "Helvetica",
                    10.0,
                ));
            }
            Self {
                pages: vec![geometry],
                fail_page: None,
            }
        }
    }

    impl PageLayoutProvider for StubProvider {
        fn page_count(&self) -> u32 {
            self.pages.len() as u32
        }

        fn page_geometry(&self, page: u32) -> Result<PageGeometry> {
            if self.fail_page == Some(page) {
                return Err(Error::provider("simulated extraction failure"));
            }
            self.pages
                .get(page as usize - 1)
                .cloned()
                .ok_or(Error::PageOutOfRange(page, self.pages.len() as u32))
        }
    }

    #[test]
    fn test_process_document() {
        let provider = StubProvider::with_text(&["Hello world."]);
        let doc = process_document(
            &provider,
            &LayoutConfig::default(),
            &ProcessOptions::default(),
        )
        .unwrap();
        assert_eq!(doc.page_count(), 1);
        assert_eq!(doc.plain_text(), "Hello world.");
    }

    #[test]
    fn test_lenient_mode_skips_failing_page() {
        let mut provider = StubProvider::with_text(&["Page one."]);
        provider.pages.push({
            let mut g = PageGeometry::new(2, 612.0, 792.0);
            g.spans.push(TextSpan::new(
                "Page two.",
                BoundingBox::new(50.0, 100.0, 120.0, 110.0),
                "Helvetica",
                10.0,
            ));
            g
        });
        provider.fail_page = Some(1);

        let doc = process_document(
            &provider,
            &LayoutConfig::default(),
            &ProcessOptions::default(),
        )
        .unwrap();
        assert_eq!(doc.page_count(), 1);
        assert_eq!(doc.plain_text(), "Page two.");
    }

    #[test]
    fn test_strict_mode_surfaces_page_error() {
        let mut provider = StubProvider::with_text(&["Page one."]);
        provider.fail_page = Some(1);

        let result = process_document(
            &provider,
            &LayoutConfig::default(),
            &ProcessOptions::new().strict(),
        );
        assert!(matches!(result, Err(Error::Provider(_))));
    }

    #[test]
    fn test_pages_stay_in_order_under_parallelism() {
        let mut provider = StubProvider::with_text(&["Page one."]);
        for n in 2..=8 {
            let mut g = PageGeometry::new(n, 612.0, 792.0);
            g.spans.push(TextSpan::new(
                format!("Page {}.", n),
                BoundingBox::new(50.0, 100.0, 120.0, 110.0),
                "Helvetica",
                10.0,
            ));
            provider.pages.push(g);
        }

        let doc = process_document(
            &provider,
            &LayoutConfig::default(),
            &ProcessOptions::default(),
        )
        .unwrap();
        assert_eq!(doc.page_count(), 8);
        for (i, page) in doc.pages.iter().enumerate() {
            assert_eq!(page.number as usize, i + 1);
        }
    }

    #[test]
    fn test_batch_isolates_failures() {
        let paths: Vec<PathBuf> = ["good-a.pdf", "bad.pdf", "good-b.pdf"]
            .iter()
            .map(PathBuf::from)
            .collect();

        let entries = process_batch(
            &paths,
            |path| -> Result<Box<dyn PageLayoutProvider>> {
                if path.to_string_lossy().contains("bad") {
                    Err(Error::provider("cannot open"))
                } else {
                    Ok(Box::new(StubProvider::with_text(&["Survived."])))
                }
            },
            &LayoutConfig::default(),
            &ProcessOptions::default(),
            &RenderOptions::default(),
        );

        assert_eq!(entries.len(), 3);
        assert!(entries[0].is_ok());
        assert!(!entries[1].is_ok());
        assert!(entries[2].is_ok());
        assert_eq!(entries[0].result.as_ref().unwrap(), "Survived.");
        assert_eq!(entries[0].path, PathBuf::from("good-a.pdf"));
    }
}
