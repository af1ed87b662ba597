//! Batch processing tests: per-file failure isolation.

use std::path::PathBuf;

use pagemark::{
    process_batch, BoundingBox, Error, LayoutConfig, PageGeometry, PageLayoutProvider,
    ProcessOptions, RenderOptions, Result, TextSpan,
};

struct FixtureProvider {
    pages: Vec<PageGeometry>,
    broken: bool,
}

impl FixtureProvider {
    fn new(paragraphs: &[&str]) -> Self {
        let mut geometry = PageGeometry::new(1, 612.0, 792.0);
        for (i, text) in paragraphs.iter().enumerate() {
            geometry.spans.push(TextSpan::new(
                *text,
                BoundingBox::new(50.0, 100.0 + i as f32 * 40.0, 350.0, 110.0 + i as f32 * 40.0),
                "Helvetica",
                10.0,
            ));
        }
        Self {
            pages: vec![geometry],
            broken: false,
        }
    }

    fn broken() -> Self {
        Self {
            pages: Vec::new(),
            broken: true,
        }
    }
}

impl PageLayoutProvider for FixtureProvider {
    fn page_count(&self) -> u32 {
        if self.broken {
            1
        } else {
            self.pages.len() as u32
        }
    }

    fn page_geometry(&self, page: u32) -> Result<PageGeometry> {
        if self.broken {
            return Err(Error::provider("encrypted document"));
        }
        self.pages
            .get(page as usize - 1)
            .cloned()
            .ok_or(Error::PageOutOfRange(page, self.pages.len() as u32))
    }
}

fn open_fixture(path: &std::path::Path) -> Result<Box<dyn PageLayoutProvider>> {
    let name = path.to_string_lossy();
    if name.contains("encrypted") {
        Ok(Box::new(FixtureProvider::broken()))
    } else if name.contains("missing") {
        Err(Error::provider("file not found"))
    } else {
        Ok(Box::new(FixtureProvider::new(&[
            "Recovered content.",
            "Second paragraph.",
        ])))
    }
}

#[test]
fn one_failing_file_does_not_taint_the_batch() {
    let paths: Vec<PathBuf> = ["report.pdf", "encrypted.pdf", "appendix.pdf"]
        .iter()
        .map(PathBuf::from)
        .collect();

    let entries = process_batch(
        &paths,
        open_fixture,
        &LayoutConfig::default(),
        // Strict so the broken provider's page error surfaces as a file error
        &ProcessOptions::new().strict(),
        &RenderOptions::default(),
    );

    assert_eq!(entries.len(), 3);
    assert!(entries[0].is_ok());
    assert!(!entries[1].is_ok());
    assert!(entries[2].is_ok());

    let markdown = entries[0].result.as_ref().unwrap();
    assert!(markdown.contains("Recovered content."));
    assert!(markdown.contains("Second paragraph."));
}

#[test]
fn unopenable_file_reports_its_own_error() {
    let paths: Vec<PathBuf> = ["missing.pdf", "report.pdf"].iter().map(PathBuf::from).collect();

    let entries = process_batch(
        &paths,
        open_fixture,
        &LayoutConfig::default(),
        &ProcessOptions::default(),
        &RenderOptions::default(),
    );

    assert!(matches!(entries[0].result, Err(Error::Provider(_))));
    assert!(entries[1].is_ok());
}

#[test]
fn lenient_mode_turns_broken_pages_into_empty_output() {
    let paths = vec![PathBuf::from("encrypted.pdf")];

    let entries = process_batch(
        &paths,
        open_fixture,
        &LayoutConfig::default(),
        &ProcessOptions::default(),
        &RenderOptions::default(),
    );

    // The page is skipped rather than failing the file
    assert!(entries[0].is_ok());
    assert_eq!(entries[0].result.as_ref().unwrap(), "");
}

#[test]
fn entries_preserve_input_order() {
    let paths: Vec<PathBuf> = (0..6).map(|i| PathBuf::from(format!("doc-{}.pdf", i))).collect();

    let entries = process_batch(
        &paths,
        open_fixture,
        &LayoutConfig::default(),
        &ProcessOptions::default(),
        &RenderOptions::default(),
    );

    for (i, entry) in entries.iter().enumerate() {
        assert_eq!(entry.path, paths[i]);
    }
}
