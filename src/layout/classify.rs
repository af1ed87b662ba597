//! Block classification: headings, list items, paragraphs.
//!
//! Spans left over after table detection are grouped into lines (shared
//! baseline), lines into blocks (vertical gap thresholding), and each
//! block is classified from font metrics and leading marker glyphs.

use regex::Regex;

use crate::config::LayoutConfig;
use crate::model::{Block, InlineContent, Paragraph, TextRun, TextStyle};
use crate::provider::{BoundingBox, TextSpan};

/// A classified block tagged with its page-space region for ordering.
#[derive(Debug, Clone)]
pub struct ClassifiedBlock {
    /// Region the block occupies
    pub bbox: BoundingBox,
    /// The classified content
    pub block: Block,
}

/// A text line: spans sharing a baseline, sorted by x.
#[derive(Debug, Clone)]
struct Line {
    items: Vec<usize>,
    baseline: f32,
    x0: f32,
    font_size: f32,
    bold: bool,
}

/// Classifies non-table spans into structural blocks.
pub struct BlockClassifier<'a> {
    config: &'a LayoutConfig,
    enumeration: Regex,
}

impl<'a> BlockClassifier<'a> {
    /// Create a classifier reading thresholds from `config`.
    pub fn new(config: &'a LayoutConfig) -> Self {
        Self {
            config,
            enumeration: Regex::new(r"^(\d{1,3})[.)](\s+|$)").unwrap(),
        }
    }

    /// Classify spans into ordered blocks.
    ///
    /// `links` runs parallel to `spans`: the URI covering each span, if any,
    /// as resolved by the hyperlink embedder.
    pub fn classify(&self, spans: &[TextSpan], links: &[Option<String>]) -> Vec<ClassifiedBlock> {
        if spans.is_empty() {
            return Vec::new();
        }

        let lines = self.group_into_lines(spans);
        let median = char_weighted_median(spans);
        let scale = HeadingScale::build(&lines, median, self.config);
        log::debug!(
            "classify: {} lines, body size {:.1}, {} heading sizes",
            lines.len(),
            median,
            scale.sizes.len()
        );

        let margin = lines
            .iter()
            .map(|l| l.x0)
            .fold(f32::INFINITY, f32::min);

        let mut blocks = Vec::new();
        let mut current: Vec<&Line> = Vec::new();

        for line in &lines {
            let break_before = match current.last() {
                None => false,
                Some(prev) => {
                    let gap = line.baseline - prev.baseline;
                    scale.is_heading(line, median)
                        || scale.is_heading(prev, median)
                        || gap > prev.font_size * self.config.block_gap_factor
                        || self.starts_with_marker(line, spans)
                }
            };

            if break_before && !current.is_empty() {
                blocks.push(self.finish_block(&current, spans, links, &scale, median, margin));
                current.clear();
            }
            current.push(line);
        }
        if !current.is_empty() {
            blocks.push(self.finish_block(&current, spans, links, &scale, median, margin));
        }

        blocks.retain(|b| !b.block.plain_text().trim().is_empty());
        blocks
    }

    /// Group spans into baseline-clustered lines.
    fn group_into_lines(&self, spans: &[TextSpan]) -> Vec<Line> {
        let mut order: Vec<usize> = (0..spans.len()).collect();
        order.sort_by(|&a, &b| {
            spans[a]
                .baseline
                .total_cmp(&spans[b].baseline)
                .then(spans[a].bbox.x0.total_cmp(&spans[b].bbox.x0))
        });

        let mut grouped: Vec<Vec<usize>> = Vec::new();
        let mut last_baseline = f32::NEG_INFINITY;
        for i in order {
            if (spans[i].baseline - last_baseline).abs() <= self.config.row_gap_tolerance {
                grouped.last_mut().unwrap().push(i);
            } else {
                grouped.push(vec![i]);
            }
            last_baseline = spans[i].baseline;
        }

        grouped
            .into_iter()
            .map(|mut items| {
                items.sort_by(|&a, &b| spans[a].bbox.x0.total_cmp(&spans[b].bbox.x0));
                let baseline = spans[items[0]].baseline;
                let x0 = items
                    .iter()
                    .map(|&i| spans[i].bbox.x0)
                    .fold(f32::INFINITY, f32::min);
                let total: usize = items.iter().map(|&i| spans[i].text.chars().count()).sum();
                let weighted: f32 = items
                    .iter()
                    .map(|&i| spans[i].font_size * spans[i].text.chars().count() as f32)
                    .sum();
                let font_size = if total > 0 {
                    weighted / total as f32
                } else {
                    spans[items[0]].font_size
                };
                let bold_chars: usize = items
                    .iter()
                    .filter(|&&i| spans[i].bold)
                    .map(|&i| spans[i].text.chars().count())
                    .sum();
                let bold = total > 0 && bold_chars * 2 > total;
                Line {
                    items,
                    baseline,
                    x0,
                    font_size,
                    bold,
                }
            })
            .collect()
    }

    fn starts_with_marker(&self, line: &Line, spans: &[TextSpan]) -> bool {
        let first = line.items.first().map(|&i| spans[i].text.trim());
        match first {
            Some(text) => {
                is_bullet_marker(text)
                    || is_enumeration_marker(text)
                    || starts_with_bullet(text)
                    || self.enumeration.is_match(text)
            }
            None => false,
        }
    }

    /// Classify and assemble one block.
    fn finish_block(
        &self,
        lines: &[&Line],
        spans: &[TextSpan],
        links: &[Option<String>],
        scale: &HeadingScale,
        median: f32,
        margin: f32,
    ) -> ClassifiedBlock {
        let bbox = lines
            .iter()
            .flat_map(|l| l.items.iter())
            .map(|&i| spans[i].bbox)
            .reduce(|a, b| a.union(&b))
            .expect("block has at least one span");

        let first = lines[0];
        if scale.is_heading(first, median) {
            let content = self.assemble(lines, spans, links, 0);
            return ClassifiedBlock {
                bbox,
                block: Block::Heading {
                    level: scale.level(first.font_size),
                    content,
                },
            };
        }

        if self.starts_with_marker(first, spans) {
            let (number, skip) = self.strip_marker(first, spans);
            let content = self.assemble(lines, spans, links, skip);
            let depth = ((first.x0 - margin) / self.config.list_indent_step)
                .floor()
                .max(0.0) as u8;
            return ClassifiedBlock {
                bbox,
                block: Block::ListItem {
                    depth,
                    number,
                    content,
                },
            };
        }

        ClassifiedBlock {
            bbox,
            block: Block::Paragraph(self.assemble(lines, spans, links, 0)),
        }
    }

    /// Determine how much of the first line is list marker and, for
    /// ordered items, the item number. Returns (number, leading chars to
    /// strip from the first span).
    fn strip_marker(&self, line: &Line, spans: &[TextSpan]) -> (Option<u32>, usize) {
        let first_idx = line.items[0];
        let text = spans[first_idx].text.trim_start();

        if let Some(caps) = self.enumeration.captures(text) {
            let number = caps.get(1).and_then(|m| m.as_str().parse().ok());
            let whole = caps.get(0).map(|m| m.len()).unwrap_or(0);
            return (number, whole);
        }
        if let Some(first_char) = text.chars().next() {
            if is_bullet_marker(&first_char.to_string()) {
                let mut skip = first_char.len_utf8();
                skip += text[skip..].len() - text[skip..].trim_start().len();
                return (None, skip);
            }
        }
        (None, 0)
    }

    /// Assemble inline content: spans in line order, adjacent spans
    /// covered by the same link merged into one link run (across line
    /// boundaries too), styled text runs merged while the style holds.
    fn assemble(
        &self,
        lines: &[&Line],
        spans: &[TextSpan],
        links: &[Option<String>],
        strip_first: usize,
    ) -> Paragraph {
        let mut paragraph = Paragraph::new();
        let mut first_span_of_block = true;

        for line in lines {
            let mut prev: Option<usize> = None;
            for &i in &line.items {
                let span = &spans[i];
                let text = if first_span_of_block && strip_first > 0 {
                    let t = span.text.trim_start();
                    t.get(strip_first..).unwrap_or("").to_string()
                } else {
                    span.text.clone()
                };
                first_span_of_block = false;

                if text.trim().is_empty() {
                    prev = Some(i);
                    continue;
                }

                let separate = match prev {
                    None => !paragraph.content.is_empty(),
                    Some(p) => needs_space(&spans[p], span),
                };

                push_run(
                    &mut paragraph,
                    &text,
                    separate,
                    TextStyle {
                        bold: span.bold,
                        italic: span.italic,
                    },
                    links[i].as_deref(),
                );
                prev = Some(i);
            }
        }

        normalize_runs(&mut paragraph);
        paragraph
    }
}

/// Whether a space belongs between two adjacent spans on a line: the gap
/// exceeds a fifth of the following span's average character width.
fn needs_space(prev: &TextSpan, next: &TextSpan) -> bool {
    if prev.text.ends_with(' ') || next.text.starts_with(' ') {
        return false;
    }
    let gap = next.bbox.x0 - prev.bbox.x1;
    let chars = next.text.chars().count().max(1) as f32;
    let avg_char = if next.bbox.width() > 0.0 {
        next.bbox.width() / chars
    } else {
        next.font_size * 0.5
    };
    gap > avg_char * 0.2
}

/// Append text to the paragraph, merging into the previous run when the
/// link target and style allow it. Separator spaces attach to text runs,
/// never to the outside edge of a link label.
fn push_run(paragraph: &mut Paragraph, text: &str, sep: bool, style: TextStyle, link: Option<&str>) {
    let merged = match (paragraph.content.last_mut(), link) {
        (Some(InlineContent::Link { text: t, url }), Some(uri)) if url.as_str() == uri => {
            if sep {
                t.push(' ');
            }
            t.push_str(text);
            true
        }
        (Some(InlineContent::Text(run)), None) if run.style == style => {
            if sep {
                run.text.push(' ');
            }
            run.text.push_str(text);
            true
        }
        _ => false,
    };
    if merged {
        return;
    }

    let after_link = matches!(paragraph.content.last(), Some(InlineContent::Link { .. }));
    if sep && !after_link {
        if let Some(InlineContent::Text(run)) = paragraph.content.last_mut() {
            run.text.push(' ');
        }
    }

    match link {
        Some(uri) => {
            if sep && after_link {
                paragraph.add_run(TextRun::plain(" "));
            }
            paragraph.add_link(text, uri);
        }
        None => {
            let mut t = String::new();
            if sep && after_link {
                t.push(' ');
            }
            t.push_str(text);
            paragraph.add_run(TextRun { text: t, style });
        }
    }
}

/// Trim stray edge whitespace that span joining can leave behind.
fn normalize_runs(paragraph: &mut Paragraph) {
    if let Some(first) = paragraph.content.first_mut() {
        match first {
            InlineContent::Text(run) => run.text = run.text.trim_start().to_string(),
            InlineContent::Link { text, .. } => *text = text.trim_start().to_string(),
        }
    }
    if let Some(last) = paragraph.content.last_mut() {
        match last {
            InlineContent::Text(run) => run.text = run.text.trim_end().to_string(),
            InlineContent::Link { text, .. } => *text = text.trim_end().to_string(),
        }
    }
    paragraph.content.retain(|c| match c {
        InlineContent::Text(run) => !run.text.is_empty(),
        InlineContent::Link { text, .. } => !text.is_empty(),
    });
}

/// Size-to-level mapping for headings on one page.
struct HeadingScale {
    /// Distinct heading sizes, largest first, rounded to half points
    sizes: Vec<f32>,
    ratio: f32,
}

impl HeadingScale {
    fn build(lines: &[Line], median: f32, config: &LayoutConfig) -> Self {
        let mut sizes: Vec<f32> = lines
            .iter()
            .filter(|l| size_qualifies(l.font_size, median, config.heading_size_ratio))
            .map(|l| round_half(l.font_size))
            .collect();
        sizes.sort_by(|a, b| b.total_cmp(a));
        sizes.dedup();
        Self {
            sizes,
            ratio: config.heading_size_ratio,
        }
    }

    /// Heading test: at or above the size ratio (inclusive), or bold and
    /// strictly larger than body text.
    fn is_heading(&self, line: &Line, median: f32) -> bool {
        size_qualifies(line.font_size, median, self.ratio) || (line.bold && line.font_size > median)
    }

    /// Level for a heading size: largest size maps to 1.
    fn level(&self, font_size: f32) -> u8 {
        let rounded = round_half(font_size);
        match self.sizes.iter().position(|s| rounded >= *s) {
            Some(i) => ((i + 1).min(6)) as u8,
            // Bold-qualified headings below every size tier
            None => ((self.sizes.len() + 1).min(6)) as u8,
        }
    }
}

fn size_qualifies(size: f32, median: f32, ratio: f32) -> bool {
    median > 0.0 && size >= median * ratio
}

fn round_half(v: f32) -> f32 {
    (v * 2.0).round() / 2.0
}

/// Character-count-weighted median font size of the page's spans.
fn char_weighted_median(spans: &[TextSpan]) -> f32 {
    let mut sizes: Vec<(f32, usize)> = spans
        .iter()
        .map(|s| (s.font_size, s.text.chars().count()))
        .filter(|(_, n)| *n > 0)
        .collect();
    if sizes.is_empty() {
        return 12.0;
    }
    sizes.sort_by(|a, b| a.0.total_cmp(&b.0));
    let total: usize = sizes.iter().map(|(_, n)| n).sum();
    let mut seen = 0;
    for (size, n) in &sizes {
        seen += n;
        if seen * 2 >= total {
            return *size;
        }
    }
    sizes.last().unwrap().0
}

/// Whether `text` is a standalone bullet glyph.
pub(crate) fn is_bullet_marker(text: &str) -> bool {
    matches!(
        text.trim(),
        "-" | "–" | "—" | "•" | "·" | "*" | "○" | "▪" | "◦" | "▸" | "►" | "■" | "●" | "□" | "▶"
    )
}

/// Whether `text` is a standalone enumeration marker ("1.", "12)", "a.").
pub(crate) fn is_enumeration_marker(text: &str) -> bool {
    let t = text.trim();
    if t.is_empty() || t.len() > 4 {
        return false;
    }
    let mut chars = t.chars();
    let last = chars.next_back();
    if !matches!(last, Some('.') | Some(')')) {
        return false;
    }
    let head: String = chars.collect();
    !head.is_empty()
        && (head.chars().all(|c| c.is_ascii_digit())
            || (head.chars().count() == 1 && head.chars().all(|c| c.is_alphabetic())))
}

/// Whether `text` begins with a bullet glyph followed by more content.
fn starts_with_bullet(text: &str) -> bool {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(first), Some(second)) => {
            is_bullet_marker(&first.to_string()) && second.is_whitespace()
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(text: &str, x: f32, y: f32, size: f32) -> TextSpan {
        TextSpan::new(
            text,
            BoundingBox::new(x, y, x + text.len() as f32 * size * 0.5, y + size),
            "Helvetica",
            size,
        )
    }

    fn bold_span(text: &str, x: f32, y: f32, size: f32) -> TextSpan {
        TextSpan::new(
            text,
            BoundingBox::new(x, y, x + text.len() as f32 * size * 0.5, y + size),
            "Helvetica-Bold",
            size,
        )
    }

    fn classify(spans: &[TextSpan]) -> Vec<ClassifiedBlock> {
        let config = LayoutConfig::default();
        let links = vec![None; spans.len()];
        BlockClassifier::new(&config).classify(spans, &links)
    }

    #[test]
    fn test_heading_and_paragraph() {
        let mut spans = vec![span("Introduction", 50.0, 50.0, 18.0)];
        // Enough body text to anchor the median at 10pt
        for i in 0..6 {
            spans.push(span(
                "Body text line with many characters here",
                50.0,
                100.0 + i as f32 * 14.0,
                10.0,
            ));
        }

        let blocks = classify(&spans);
        assert!(blocks[0].block.is_heading());
        match &blocks[0].block {
            Block::Heading { level, content } => {
                assert_eq!(*level, 1);
                assert_eq!(content.plain_text(), "Introduction");
            }
            _ => unreachable!(),
        }
        assert!(matches!(blocks[1].block, Block::Paragraph(_)));
    }

    #[test]
    fn test_heading_ratio_boundary_inclusive() {
        let config = LayoutConfig::default();
        // Median body 10pt, ratio 1.2: exactly 12pt is a heading
        let mut spans = Vec::new();
        for i in 0..8 {
            spans.push(span(
                "body body body body body body body",
                50.0,
                100.0 + i as f32 * 14.0,
                10.0,
            ));
        }
        spans.push(span("At threshold", 50.0, 40.0, 10.0 * config.heading_size_ratio));

        let blocks = classify(&spans);
        assert!(blocks[0].block.is_heading(), "threshold is inclusive");

        // Just below the threshold: a paragraph
        let below = spans.len() - 1;
        let mut spans_below = spans.clone();
        spans_below[below] = span("Below threshold", 50.0, 40.0, 11.9);
        let blocks = classify(&spans_below);
        assert!(
            !blocks[0].block.is_heading(),
            "below threshold stays a paragraph"
        );
    }

    #[test]
    fn test_bold_above_median_is_heading() {
        let mut spans = Vec::new();
        for i in 0..8 {
            spans.push(span(
                "plain body text of normal size here",
                50.0,
                100.0 + i as f32 * 14.0,
                10.0,
            ));
        }
        // Bold and slightly larger than body, but below the size ratio
        spans.push(bold_span("Subsection", 50.0, 40.0, 11.0));

        let blocks = classify(&spans);
        assert!(blocks[0].block.is_heading());
    }

    #[test]
    fn test_heading_levels_by_size() {
        let mut spans = vec![
            span("Title", 50.0, 30.0, 24.0),
            span("Section", 50.0, 70.0, 18.0),
        ];
        for i in 0..10 {
            spans.push(span(
                "body copy body copy body copy body copy",
                50.0,
                120.0 + i as f32 * 14.0,
                10.0,
            ));
        }

        let blocks = classify(&spans);
        match &blocks[0].block {
            Block::Heading { level, .. } => assert_eq!(*level, 1),
            _ => unreachable!(),
        }
        match &blocks[1].block {
            Block::Heading { level, .. } => assert_eq!(*level, 2),
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_bullet_list_item() {
        let spans = vec![
            span("- First point", 50.0, 100.0, 10.0),
            span("- Second point", 50.0, 114.0, 10.0),
        ];

        let blocks = classify(&spans);
        assert_eq!(blocks.len(), 2);
        match &blocks[0].block {
            Block::ListItem {
                depth,
                number,
                content,
            } => {
                assert_eq!(*depth, 0);
                assert!(number.is_none());
                assert_eq!(content.plain_text(), "First point");
            }
            other => panic!("expected list item, got {:?}", other),
        }
    }

    #[test]
    fn test_numbered_list_item_with_separate_marker_span() {
        let spans = vec![
            span("1.", 50.0, 100.0, 10.0),
            span("First step", 65.0, 100.0, 10.0),
            span("2.", 50.0, 114.0, 10.0),
            span("Second step", 65.0, 114.0, 10.0),
        ];

        let blocks = classify(&spans);
        assert_eq!(blocks.len(), 2);
        match &blocks[0].block {
            Block::ListItem {
                number, content, ..
            } => {
                assert_eq!(*number, Some(1));
                assert_eq!(content.plain_text(), "First step");
            }
            other => panic!("expected list item, got {:?}", other),
        }
    }

    #[test]
    fn test_list_depth_from_indent() {
        let spans = vec![
            span("- Top level", 50.0, 100.0, 10.0),
            span("- Nested", 68.0, 114.0, 10.0),
        ];

        let blocks = classify(&spans);
        match &blocks[1].block {
            Block::ListItem { depth, .. } => assert_eq!(*depth, 1),
            other => panic!("expected list item, got {:?}", other),
        }
    }

    #[test]
    fn test_gap_splits_paragraphs() {
        let spans = vec![
            span("First paragraph line one", 50.0, 100.0, 10.0),
            span("first paragraph line two", 50.0, 112.0, 10.0),
            // 40pt gap: well past font size * block_gap_factor
            span("Second paragraph", 50.0, 152.0, 10.0),
        ];

        let blocks = classify(&spans);
        assert_eq!(blocks.len(), 2);
        assert_eq!(
            blocks[0].block.plain_text(),
            "First paragraph line one first paragraph line two"
        );
        assert_eq!(blocks[1].block.plain_text(), "Second paragraph");
    }

    #[test]
    fn test_link_merges_across_spans() {
        let config = LayoutConfig::default();
        let spans = vec![
            span("See the", 50.0, 100.0, 10.0),
            span("full", 90.0, 100.0, 10.0),
            span("manual", 115.0, 100.0, 10.0),
        ];
        let links = vec![
            None,
            Some("https://example.com/manual".to_string()),
            Some("https://example.com/manual".to_string()),
        ];

        let blocks = BlockClassifier::new(&config).classify(&spans, &links);
        match &blocks[0].block {
            Block::Paragraph(p) => {
                assert_eq!(p.content.len(), 2);
                match &p.content[1] {
                    InlineContent::Link { text, url } => {
                        assert_eq!(text, "full manual");
                        assert_eq!(url, "https://example.com/manual");
                    }
                    other => panic!("expected link run, got {:?}", other),
                }
            }
            other => panic!("expected paragraph, got {:?}", other),
        }
    }

    #[test]
    fn test_marker_helpers() {
        assert!(is_bullet_marker("•"));
        assert!(is_bullet_marker("-"));
        assert!(is_enumeration_marker("1."));
        assert!(is_enumeration_marker("12)"));
        assert!(is_enumeration_marker("a."));
        assert!(!is_enumeration_marker("Name"));
        assert!(!is_enumeration_marker("3.14"));
        assert!(!is_bullet_marker("word"));
    }

    #[test]
    fn test_decimal_number_is_not_a_marker() {
        let spans = vec![
            span("3.14 approximates pi", 50.0, 100.0, 10.0),
            span("2.71 approximates e", 50.0, 114.0, 10.0),
        ];

        let blocks = classify(&spans);
        assert!(blocks
            .iter()
            .all(|b| matches!(b.block, Block::Paragraph(_))));
    }

    #[test]
    fn test_empty_input() {
        assert!(classify(&[]).is_empty());
    }
}
