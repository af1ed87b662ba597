//! Layout analysis: from page geometry to ordered content blocks.
//!
//! The per-page pipeline is a pure function of the extracted primitives
//! and the configuration; pages never share state, which is what makes
//! page-parallel processing safe without synchronization.

mod alignment;
mod classify;
mod grid;
mod links;
mod rulings;

pub use alignment::{AlignedTable, AlignmentDetector};
pub use classify::{BlockClassifier, ClassifiedBlock};
pub use grid::{detect_bordered_tables, BorderedTable};
pub use links::resolve_span_links;
pub use rulings::{normalize, Orientation, Ruling, RulingSet, Segment};

use crate::config::LayoutConfig;
use crate::model::{Block, Page};
use crate::provider::{BoundingBox, PageGeometry, TextSpan};

/// Reconstruct one page's structure from its geometry.
///
/// Border-based table detection runs first; the alignment fallback is
/// consulted only when no bordered grid was accepted. Spans consumed by
/// tables are excluded from text classification, and all blocks are merged
/// into top-to-bottom, left-to-right reading order.
pub fn process_page(geometry: &PageGeometry, config: &LayoutConfig) -> Page {
    let mut page = Page::new(geometry.number, geometry.width, geometry.height);
    if geometry.spans.is_empty() && geometry.lines.is_empty() {
        return page;
    }

    let rulings = rulings::normalize(&geometry.lines, config);
    let (bordered, mut consumed) = grid::detect_bordered_tables(&rulings, &geometry.spans, config);

    let mut positioned: Vec<(BoundingBox, Block)> = bordered
        .into_iter()
        .map(|t| (t.bbox, Block::Table(t.table)))
        .collect();

    if positioned.is_empty() {
        let detector = AlignmentDetector::new(config);
        let (aligned, aligned_consumed) = detector.detect(&geometry.spans);
        positioned.extend(
            aligned
                .into_iter()
                .map(|t| (t.bbox, Block::Table(t.table))),
        );
        consumed.extend(aligned_consumed);
    }

    // Spans left to the text flow
    let mut remaining: Vec<TextSpan> = Vec::new();
    for (i, span) in geometry.spans.iter().enumerate() {
        if !consumed.contains(&i) {
            remaining.push(span.clone());
        }
    }

    let span_links = links::resolve_span_links(&remaining, &geometry.links);
    let classifier = BlockClassifier::new(config);
    for block in classifier.classify(&remaining, &span_links) {
        positioned.push((block.bbox, block.block));
    }

    positioned.sort_by(|(a, _), (b, _)| a.y0.total_cmp(&b.y0).then(a.x0.total_cmp(&b.x0)));
    for (_, block) in positioned {
        page.add_block(block);
    }

    log::debug!(
        "page {}: {} blocks ({} spans, {} primitives, {} links)",
        geometry.number,
        page.block_count(),
        geometry.spans.len(),
        geometry.lines.len(),
        geometry.links.len()
    );

    page
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::LinePrimitive;

    fn span(text: &str, x: f32, y: f32) -> TextSpan {
        TextSpan::new(
            text,
            BoundingBox::new(x, y, x + text.len() as f32 * 5.0, y + 10.0),
            "Helvetica",
            10.0,
        )
    }

    fn hline(y: f32, x0: f32, x1: f32) -> LinePrimitive {
        LinePrimitive::new(BoundingBox::new(x0, y, x1, y + 0.8), 0.8)
    }

    fn vline(x: f32, y0: f32, y1: f32) -> LinePrimitive {
        LinePrimitive::new(BoundingBox::new(x, y0, x + 0.8, y1), 0.8)
    }

    #[test]
    fn test_empty_page() {
        let config = LayoutConfig::default();
        let page = process_page(&PageGeometry::new(1, 612.0, 792.0), &config);
        assert!(page.is_empty());
        assert_eq!(page.number, 1);
    }

    #[test]
    fn test_table_and_surrounding_text_ordered() {
        let config = LayoutConfig::default();
        let mut geometry = PageGeometry::new(1, 612.0, 792.0);
        geometry.spans = vec![
            span("Before the table", 50.0, 60.0),
            span("A", 60.0, 105.0),
            span("B", 140.0, 105.0),
            span("C", 60.0, 125.0),
            span("D", 140.0, 125.0),
            span("After the table", 50.0, 200.0),
        ];
        geometry.lines = vec![
            hline(100.0, 50.0, 210.0),
            hline(120.0, 50.0, 210.0),
            hline(140.0, 50.0, 210.0),
            vline(50.0, 100.0, 140.0),
            vline(130.0, 100.0, 140.0),
            vline(210.0, 100.0, 140.0),
        ];

        let page = process_page(&geometry, &config);
        assert_eq!(page.block_count(), 3);
        assert!(matches!(page.elements[0], Block::Paragraph(_)));
        assert!(page.elements[1].is_table());
        assert!(matches!(page.elements[2], Block::Paragraph(_)));
        assert_eq!(page.elements[0].plain_text(), "Before the table");
    }

    #[test]
    fn test_alignment_fallback_when_no_borders() {
        let config = LayoutConfig::default();
        let mut geometry = PageGeometry::new(1, 612.0, 792.0);
        geometry.spans = vec![
            span("Name", 10.0, 100.0),
            span("Age", 80.0, 100.0),
            span("Alice", 10.0, 115.0),
            span("30", 80.0, 115.0),
            span("Bob", 10.0, 130.0),
            span("25", 80.0, 130.0),
        ];

        let page = process_page(&geometry, &config);
        assert_eq!(page.block_count(), 1);
        assert!(page.elements[0].is_table());
    }

    #[test]
    fn test_fallback_skipped_when_borders_found() {
        let config = LayoutConfig::default();
        let mut geometry = PageGeometry::new(1, 612.0, 792.0);
        // Bordered 2x2 grid plus loose aligned text below it
        geometry.spans = vec![
            span("A", 60.0, 105.0),
            span("B", 140.0, 105.0),
            span("C", 60.0, 125.0),
            span("D", 140.0, 125.0),
            span("left", 50.0, 300.0),
            span("right", 120.0, 300.0),
            span("left2", 50.0, 315.0),
            span("right2", 120.0, 315.0),
        ];
        geometry.lines = vec![
            hline(100.0, 50.0, 210.0),
            hline(120.0, 50.0, 210.0),
            hline(140.0, 50.0, 210.0),
            vline(50.0, 100.0, 140.0),
            vline(130.0, 100.0, 140.0),
            vline(210.0, 100.0, 140.0),
        ];

        let page = process_page(&geometry, &config);
        let tables = page.elements.iter().filter(|b| b.is_table()).count();
        assert_eq!(tables, 1, "alignment fallback must not run");
    }
}
