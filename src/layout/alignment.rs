//! Alignment-based table detection (fallback path).
//!
//! Infers a grid from text position alone when no bordered grid was found:
//! spans cluster into rows by baseline and into columns by left-edge
//! agreement across rows. Best-effort by design: a real table without
//! alignment is missed rather than guessed at, and incidental alignment
//! can produce a false positive.

use std::collections::HashSet;

use crate::config::LayoutConfig;
use crate::model::{Table, TableCell, TableRow};
use crate::provider::{BoundingBox, TextSpan};

use super::classify::{is_bullet_marker, is_enumeration_marker};

/// A table inferred from alignment, tagged with its page-space region.
#[derive(Debug, Clone)]
pub struct AlignedTable {
    /// Region the rows occupy
    pub bbox: BoundingBox,
    /// The reconstructed table
    pub table: Table,
}

/// A baseline-clustered row of span indices.
#[derive(Debug, Clone)]
struct RowCluster {
    /// Representative baseline
    y: f32,
    /// Member spans, sorted by x
    items: Vec<usize>,
}

/// Detects unbordered tables from span alignment.
pub struct AlignmentDetector<'a> {
    config: &'a LayoutConfig,
}

impl<'a> AlignmentDetector<'a> {
    /// Create a detector reading thresholds from `config`.
    pub fn new(config: &'a LayoutConfig) -> Self {
        Self { config }
    }

    /// Detect aligned tables among `spans`.
    ///
    /// Returns detected tables and the indices of spans consumed by them.
    pub fn detect(&self, spans: &[TextSpan]) -> (Vec<AlignedTable>, HashSet<usize>) {
        let mut tables = Vec::new();
        let mut consumed = HashSet::new();

        let min_spans = self.config.min_table_rows * self.config.min_table_cols;
        if spans.len() < min_spans {
            return (tables, consumed);
        }

        let rows = self.group_into_rows(spans);
        log::debug!("alignment: {} rows from {} spans", rows.len(), spans.len());
        if rows.len() < self.config.min_table_rows {
            return (tables, consumed);
        }

        for region in self.find_regions(&rows) {
            let region_rows = &rows[region.0..=region.1];
            let columns = self.detect_columns(region_rows, spans);

            if columns.len() < self.config.min_table_cols {
                continue;
            }
            if !self.majority_aligned(region_rows, &columns, spans) {
                log::debug!(
                    "alignment: region rows {}..={} lacks majority column agreement",
                    region.0,
                    region.1
                );
                continue;
            }
            if self.is_list_layout(region_rows, spans) {
                log::debug!(
                    "alignment: region rows {}..={} looks like a list, skipping",
                    region.0,
                    region.1
                );
                continue;
            }

            let table = self.build_table(region_rows, &columns, spans);
            let bbox = region_bbox(region_rows, spans);
            for row in region_rows {
                consumed.extend(row.items.iter().copied());
            }
            tables.push(AlignedTable { bbox, table });
        }

        (tables, consumed)
    }

    /// Cluster spans into rows by baseline within the configured tolerance.
    fn group_into_rows(&self, spans: &[TextSpan]) -> Vec<RowCluster> {
        let mut order: Vec<usize> = (0..spans.len()).collect();
        order.sort_by(|&a, &b| {
            spans[a]
                .baseline
                .total_cmp(&spans[b].baseline)
                .then(spans[a].bbox.x0.total_cmp(&spans[b].bbox.x0))
        });

        let mut rows: Vec<RowCluster> = Vec::new();
        for i in order {
            let baseline = spans[i].baseline;
            match rows.last_mut() {
                Some(row) if (baseline - row.y).abs() <= self.config.row_gap_tolerance => {
                    row.items.push(i);
                }
                _ => rows.push(RowCluster {
                    y: baseline,
                    items: vec![i],
                }),
            }
        }

        for row in &mut rows {
            row.items
                .sort_by(|&a, &b| spans[a].bbox.x0.total_cmp(&spans[b].bbox.x0));
        }
        rows
    }

    /// Detect column positions: left edges that agree across at least two
    /// rows within the alignment tolerance. Returns the median edge of
    /// each cluster, sorted left to right.
    fn detect_columns(&self, rows: &[RowCluster], spans: &[TextSpan]) -> Vec<f32> {
        let mut edges: Vec<(f32, usize)> = Vec::new(); // (x0, row index)
        for (ri, row) in rows.iter().enumerate() {
            for &i in &row.items {
                edges.push((spans[i].bbox.x0, ri));
            }
        }
        if edges.is_empty() {
            return Vec::new();
        }
        edges.sort_by(|a, b| a.0.total_cmp(&b.0));

        let tol = self.config.column_align_tolerance;
        let mut columns = Vec::new();
        let mut cluster: Vec<(f32, usize)> = vec![edges[0]];

        for e in edges.into_iter().skip(1) {
            if e.0 - cluster.last().unwrap().0 <= tol {
                cluster.push(e);
            } else {
                if let Some(col) = finish_column(&cluster) {
                    columns.push(col);
                }
                cluster.clear();
                cluster.push(e);
            }
        }
        if let Some(col) = finish_column(&cluster) {
            columns.push(col);
        }

        log::debug!("alignment: column edges at {:?}", columns);
        columns
    }

    /// Contiguous runs of rows that could belong to one table: every row
    /// holds at least `min_table_cols` spans. Single-span rows break the
    /// run (they read as ordinary text between tables).
    fn find_regions(&self, rows: &[RowCluster]) -> Vec<(usize, usize)> {
        let mut regions = Vec::new();
        let mut start: Option<usize> = None;

        for (i, row) in rows.iter().enumerate() {
            if row.items.len() >= self.config.min_table_cols {
                start.get_or_insert(i);
            } else if let Some(s) = start.take() {
                if i - s >= self.config.min_table_rows {
                    regions.push((s, i - 1));
                }
            }
        }
        if let Some(s) = start {
            if rows.len() - s >= self.config.min_table_rows {
                regions.push((s, rows.len() - 1));
            }
        }

        regions
    }

    /// Whether a majority (>50%) of the region's rows align at least
    /// `min_table_cols` spans with distinct detected columns.
    fn majority_aligned(&self, rows: &[RowCluster], columns: &[f32], spans: &[TextSpan]) -> bool {
        let tol = self.config.column_align_tolerance;
        let aligned_rows = rows
            .iter()
            .filter(|row| {
                let mut hit: Vec<bool> = vec![false; columns.len()];
                for &i in &row.items {
                    let x = spans[i].bbox.x0;
                    if let Some(c) = columns.iter().position(|col| (x - col).abs() <= tol) {
                        hit[c] = true;
                    }
                }
                hit.iter().filter(|h| **h).count() >= self.config.min_table_cols
            })
            .count();

        aligned_rows * 2 > rows.len()
    }

    /// Whether the region is really a bulleted or numbered list: separate
    /// marker and text spans align like a two-column table but should be
    /// classified as list items downstream.
    fn is_list_layout(&self, rows: &[RowCluster], spans: &[TextSpan]) -> bool {
        let mut marker_rows = 0;
        for row in rows {
            if let Some(&first) = row.items.first() {
                let text = spans[first].text.trim();
                if is_bullet_marker(text) || is_enumeration_marker(text) {
                    marker_rows += 1;
                }
            }
        }
        marker_rows * 2 >= rows.len()
    }

    /// Build the model table: one cell per (row, column); spans map to the
    /// column whose range contains their left edge; absent pairs yield
    /// empty cells.
    fn build_table(&self, rows: &[RowCluster], columns: &[f32], spans: &[TextSpan]) -> Table {
        let mut table = Table::with_header(if rows.len() > 1 { 1 } else { 0 });

        for (ri, row) in rows.iter().enumerate() {
            let mut contents: Vec<Vec<&str>> = vec![Vec::new(); columns.len()];
            for &i in &row.items {
                let c = column_for(spans[i].bbox.x0, columns, self.config.column_align_tolerance);
                contents[c].push(spans[i].text.trim());
            }

            let cells: Vec<TableCell> = contents
                .into_iter()
                .map(|parts| TableCell::text(parts.join(" ")))
                .collect();

            let table_row = if ri == 0 && table.header_rows > 0 {
                TableRow::header(cells)
            } else {
                TableRow::new(cells)
            };
            table.add_row(table_row);
        }

        table
    }
}

/// Collapse one edge cluster into a column position, requiring agreement
/// across at least two distinct rows.
fn finish_column(cluster: &[(f32, usize)]) -> Option<f32> {
    let rows: HashSet<usize> = cluster.iter().map(|(_, r)| *r).collect();
    if rows.len() < 2 {
        return None;
    }
    let mut xs: Vec<f32> = cluster.iter().map(|(x, _)| *x).collect();
    xs.sort_by(f32::total_cmp);
    Some(xs[xs.len() / 2])
}

/// Map a left edge to its column: the rightmost column starting at or
/// before the edge (within tolerance), else the nearest one.
fn column_for(x: f32, columns: &[f32], tol: f32) -> usize {
    let mut best = 0;
    for (c, col) in columns.iter().enumerate() {
        if x >= col - tol {
            best = c;
        }
    }
    best
}

/// Union of the bounding boxes of all spans in the region.
fn region_bbox(rows: &[RowCluster], spans: &[TextSpan]) -> BoundingBox {
    let mut bbox: Option<BoundingBox> = None;
    for row in rows {
        for &i in &row.items {
            bbox = Some(match bbox {
                Some(b) => b.union(&spans[i].bbox),
                None => spans[i].bbox,
            });
        }
    }
    bbox.unwrap_or(BoundingBox::new(0.0, 0.0, 0.0, 0.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(text: &str, x: f32, y: f32) -> TextSpan {
        TextSpan::new(
            text,
            BoundingBox::new(x, y, x + text.len() as f32 * 6.0, y + 10.0),
            "Helvetica",
            10.0,
        )
    }

    #[test]
    fn test_detect_simple_aligned_table() {
        let config = LayoutConfig::default();
        let detector = AlignmentDetector::new(&config);
        let spans = vec![
            span("Name", 10.0, 100.0),
            span("Age", 80.0, 100.0),
            span("Alice", 10.0, 115.0),
            span("30", 80.0, 115.0),
            span("Bob", 10.0, 130.0),
            span("25", 80.0, 130.0),
        ];

        let (tables, consumed) = detector.detect(&spans);
        assert_eq!(tables.len(), 1);
        assert_eq!(consumed.len(), 6);

        let t = &tables[0].table;
        assert_eq!(t.row_count(), 3);
        assert_eq!(t.column_count(), 2);
        assert_eq!(t.rows[0].cells[0].text, "Name");
        assert_eq!(t.rows[2].cells[1].text, "25");
        assert_eq!(t.header_rows, 1);
    }

    #[test]
    fn test_single_column_text_not_a_table() {
        let config = LayoutConfig::default();
        let detector = AlignmentDetector::new(&config);
        let spans = vec![
            span("Line one", 10.0, 100.0),
            span("Line two", 10.0, 115.0),
            span("Line three", 10.0, 130.0),
        ];

        let (tables, consumed) = detector.detect(&spans);
        assert!(tables.is_empty());
        assert!(consumed.is_empty());
    }

    #[test]
    fn test_single_row_alignment_rejected() {
        let config = LayoutConfig::default();
        let detector = AlignmentDetector::new(&config);
        // One multi-span row between plain lines: not a table
        let spans = vec![
            span("Intro text", 10.0, 85.0),
            span("left", 10.0, 100.0),
            span("right", 80.0, 100.0),
            span("Closing text", 10.0, 115.0),
        ];

        let (tables, _) = detector.detect(&spans);
        assert!(tables.is_empty());
    }

    #[test]
    fn test_missing_cell_yields_empty() {
        let config = LayoutConfig::default();
        let detector = AlignmentDetector::new(&config);
        let spans = vec![
            span("Host", 10.0, 100.0),
            span("Port", 80.0, 100.0),
            span("Notes", 150.0, 100.0),
            span("alpha", 10.0, 115.0),
            span("80", 80.0, 115.0),
            span("public", 150.0, 115.0),
            // Middle cell missing in the last row
            span("beta", 10.0, 130.0),
            span("internal", 150.0, 130.0),
        ];

        let (tables, _) = detector.detect(&spans);
        assert_eq!(tables.len(), 1);
        let t = &tables[0].table;
        assert_eq!(t.column_count(), 3);
        let last = t.rows.last().unwrap();
        assert_eq!(last.cells[0].text, "beta");
        assert!(last.cells[1].is_empty());
        assert_eq!(last.cells[2].text, "internal");
    }

    #[test]
    fn test_numbered_list_not_detected_as_table() {
        let config = LayoutConfig::default();
        let detector = AlignmentDetector::new(&config);
        // A numbered list where marker and text are separate spans
        let spans = vec![
            span("1.", 50.0, 100.0),
            span("Device management", 80.0, 100.0),
            span("2.", 50.0, 115.0),
            span("Object management", 80.0, 115.0),
            span("3.", 50.0, 130.0),
            span("Policy and routing", 80.0, 130.0),
        ];

        let (tables, consumed) = detector.detect(&spans);
        assert!(tables.is_empty(), "numbered list must not become a table");
        assert!(consumed.is_empty());
    }

    #[test]
    fn test_bullet_list_not_detected_as_table() {
        let config = LayoutConfig::default();
        let detector = AlignmentDetector::new(&config);
        let spans = vec![
            span("-", 50.0, 100.0),
            span("Management", 80.0, 100.0),
            span("-", 50.0, 115.0),
            span("Interface options", 80.0, 115.0),
            span("-", 50.0, 130.0),
            span("Firmware", 80.0, 130.0),
        ];

        let (tables, _) = detector.detect(&spans);
        assert!(tables.is_empty());
    }

    #[test]
    fn test_column_for_mapping() {
        let columns = vec![10.0, 80.0, 150.0];
        assert_eq!(column_for(10.0, &columns, 3.0), 0);
        assert_eq!(column_for(81.0, &columns, 3.0), 1);
        assert_eq!(column_for(200.0, &columns, 3.0), 2);
        // Slightly left of a column start, within tolerance
        assert_eq!(column_for(78.0, &columns, 3.0), 1);
    }
}
