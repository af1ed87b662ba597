//! Border-based table detection.
//!
//! Builds grids from intersecting canonical rulings. Rulings are grouped
//! into connected components (a horizontal and a vertical ruling connect
//! when they cross), so several independent bordered tables on one page
//! are recovered as separate grids.

use std::collections::HashSet;

use crate::config::LayoutConfig;
use crate::model::{Table, TableCell, TableRow};
use crate::provider::{BoundingBox, TextSpan};

use super::rulings::{Ruling, RulingSet};

/// A table recovered from borders, tagged with its page-space region so
/// downstream stages can exclude contained spans from the text flow.
#[derive(Debug, Clone)]
pub struct BorderedTable {
    /// Region the grid occupies
    pub bbox: BoundingBox,
    /// The reconstructed table
    pub table: Table,
}

/// Detect bordered tables on a page.
///
/// Returns the tables plus the indices of the spans consumed by them.
/// An empty ruling set or a set that forms no qualifying grid returns
/// nothing; the caller falls through to the alignment detector.
pub fn detect_bordered_tables(
    rulings: &RulingSet,
    spans: &[TextSpan],
    config: &LayoutConfig,
) -> (Vec<BorderedTable>, HashSet<usize>) {
    let mut tables = Vec::new();
    let mut consumed = HashSet::new();

    if rulings.is_empty() {
        return (tables, consumed);
    }

    for component in connected_components(rulings, config) {
        if let Some(grid) = component.accept(config) {
            log::debug!(
                "grid: accepted {}x{} grid at ({:.1}, {:.1})",
                grid.row_count(),
                grid.col_count(),
                grid.bbox().x0,
                grid.bbox().y0
            );
            let table = grid.fill(spans, &mut consumed, config);
            tables.push(BorderedTable {
                bbox: grid.bbox(),
                table,
            });
        }
    }

    tables.sort_by(|a, b| {
        a.bbox
            .y0
            .total_cmp(&b.bbox.y0)
            .then(a.bbox.x0.total_cmp(&b.bbox.x0))
    });

    (tables, consumed)
}

/// Rulings belonging to one crossing-connected group.
struct Component {
    horizontal: Vec<Ruling>,
    vertical: Vec<Ruling>,
}

/// An accepted grid: strictly increasing boundary coordinates on both axes.
struct Grid {
    rows: Vec<f32>,
    cols: Vec<f32>,
    horizontal: Vec<Ruling>,
    vertical: Vec<Ruling>,
    tol: f32,
}

/// Group rulings into components connected by crossings.
fn connected_components(rulings: &RulingSet, config: &LayoutConfig) -> Vec<Component> {
    let nh = rulings.horizontal.len();
    let nv = rulings.vertical.len();
    let total = nh + nv;
    let tol = crossing_tolerance(config);

    let mut dsu = Dsu::new(total);
    for (i, h) in rulings.horizontal.iter().enumerate() {
        for (j, v) in rulings.vertical.iter().enumerate() {
            if crosses(h, v, tol) {
                dsu.union(i, nh + j);
            }
        }
    }

    let mut components: Vec<Component> = Vec::new();
    let mut roots: Vec<usize> = Vec::new();
    for idx in 0..total {
        let root = dsu.find(idx);
        let slot = match roots.iter().position(|r| *r == root) {
            Some(pos) => pos,
            None => {
                roots.push(root);
                components.push(Component {
                    horizontal: Vec::new(),
                    vertical: Vec::new(),
                });
                roots.len() - 1
            }
        };
        if idx < nh {
            components[slot].horizontal.push(rulings.horizontal[idx]);
        } else {
            components[slot].vertical.push(rulings.vertical[idx - nh]);
        }
    }

    components
}

/// Whether a horizontal and a vertical ruling cross within tolerance.
fn crosses(h: &Ruling, v: &Ruling, tol: f32) -> bool {
    v.position >= h.start - tol
        && v.position <= h.end + tol
        && h.position >= v.start - tol
        && h.position <= v.end + tol
}

/// Slack for crossing and enclosure checks: clustered rulings can fall
/// short of the shared corner by up to a stroke width on each side.
fn crossing_tolerance(config: &LayoutConfig) -> f32 {
    2.0 * config.line_tolerance.max(config.max_stroke_thickness)
}

impl Component {
    /// Validate the component as a table grid.
    ///
    /// Requires enough boundaries for the configured minimum row/column
    /// counts, and enclosure: at least one ruling per axis spanning the
    /// component's full extent, so a coincidental line crossing does not
    /// qualify.
    fn accept(self, config: &LayoutConfig) -> Option<Grid> {
        if self.horizontal.len() < config.min_table_rows + 1
            || self.vertical.len() < config.min_table_cols + 1
        {
            return None;
        }

        let mut rows: Vec<f32> = self.horizontal.iter().map(|r| r.position).collect();
        let mut cols: Vec<f32> = self.vertical.iter().map(|r| r.position).collect();
        rows.sort_by(f32::total_cmp);
        cols.sort_by(f32::total_cmp);

        let tol = crossing_tolerance(config);
        let (x0, x1) = (cols[0], cols[cols.len() - 1]);
        let (y0, y1) = (rows[0], rows[rows.len() - 1]);

        let enclosed = self.horizontal.iter().any(|r| r.covers(x0, x1, tol))
            && self.vertical.iter().any(|r| r.covers(y0, y1, tol));
        if !enclosed {
            log::debug!("grid: rejected open component at ({:.1}, {:.1})", x0, y0);
            return None;
        }

        Some(Grid {
            rows,
            cols,
            horizontal: self.horizontal,
            vertical: self.vertical,
            tol,
        })
    }
}

impl Grid {
    fn row_count(&self) -> usize {
        self.rows.len() - 1
    }

    fn col_count(&self) -> usize {
        self.cols.len() - 1
    }

    fn bbox(&self) -> BoundingBox {
        BoundingBox::new(
            self.cols[0],
            self.rows[0],
            self.cols[self.cols.len() - 1],
            self.rows[self.rows.len() - 1],
        )
    }

    /// Assign spans to cells by centroid containment and build the table.
    fn fill(
        &self,
        spans: &[TextSpan],
        consumed: &mut HashSet<usize>,
        config: &LayoutConfig,
    ) -> Table {
        let nrows = self.row_count();
        let ncols = self.col_count();

        // Span indices per candidate cell
        let mut cell_spans: Vec<Vec<usize>> = vec![Vec::new(); nrows * ncols];
        for (i, span) in spans.iter().enumerate() {
            let (cx, cy) = span.centroid();
            let (Some(c), Some(r)) = (interval_index(&self.cols, cx), interval_index(&self.rows, cy))
            else {
                continue;
            };
            cell_spans[r * ncols + c].push(i);
            consumed.insert(i);
        }

        let merges = self.merge_plan(nrows, ncols);

        let mut table = Table::with_header(if nrows > 1 { 1 } else { 0 });
        for r in 0..nrows {
            let mut cells = Vec::with_capacity(ncols);
            for c in 0..ncols {
                match merges[r * ncols + c] {
                    CellRole::Anchor { rowspan, colspan } => {
                        let mut indices = Vec::new();
                        for rr in r..r + rowspan {
                            for cc in c..c + colspan {
                                indices.extend(&cell_spans[rr * ncols + cc]);
                            }
                        }
                        let text = join_in_reading_order(spans, indices, config);
                        let cell = TableCell::text(text)
                            .rowspan(rowspan as u8)
                            .colspan(colspan as u8);
                        cells.push(cell);
                    }
                    CellRole::Covered => cells.push(TableCell::empty()),
                }
            }
            let row = if r == 0 && table.header_rows > 0 {
                TableRow::header(cells)
            } else {
                TableRow::new(cells)
            };
            table.add_row(row);
        }

        table
    }

    /// Whether the vertical boundary between cells (r, c) and (r, c+1)
    /// is actually drawn.
    fn vertical_separator(&self, r: usize, c: usize) -> bool {
        let x = self.cols[c + 1];
        let (top, bottom) = (self.rows[r], self.rows[r + 1]);
        self.vertical
            .iter()
            .any(|v| (v.position - x).abs() <= self.tol && v.covers(top, bottom, self.tol))
    }

    /// Whether the horizontal boundary between cells (r, c) and (r+1, c)
    /// is actually drawn.
    fn horizontal_separator(&self, r: usize, c: usize) -> bool {
        let y = self.rows[r + 1];
        let (left, right) = (self.cols[c], self.cols[c + 1]);
        self.horizontal
            .iter()
            .any(|h| (h.position - y).abs() <= self.tol && h.covers(left, right, self.tol))
    }

    /// Greedy rectangular merging of candidate cells whose shared interior
    /// boundary is not drawn. The anchor keeps the merged region's content;
    /// covered cells stay in the grid as empty placeholders so the table
    /// remains rectangular.
    fn merge_plan(&self, nrows: usize, ncols: usize) -> Vec<CellRole> {
        let mut roles = vec![CellRole::Anchor {
            rowspan: 1,
            colspan: 1,
        }; nrows * ncols];
        let mut visited = vec![false; nrows * ncols];

        for r in 0..nrows {
            for c in 0..ncols {
                if visited[r * ncols + c] {
                    continue;
                }

                let mut colspan = 1;
                while c + colspan < ncols && !self.vertical_separator(r, c + colspan - 1) {
                    colspan += 1;
                }

                let mut rowspan = 1;
                'grow: while r + rowspan < nrows {
                    for cc in c..c + colspan {
                        if self.horizontal_separator(r + rowspan - 1, cc) {
                            break 'grow;
                        }
                    }
                    for cc in c..c + colspan - 1 {
                        if self.vertical_separator(r + rowspan, cc) {
                            break 'grow;
                        }
                    }
                    rowspan += 1;
                }

                for rr in r..r + rowspan {
                    for cc in c..c + colspan {
                        visited[rr * ncols + cc] = true;
                        roles[rr * ncols + cc] = CellRole::Covered;
                    }
                }
                roles[r * ncols + c] = CellRole::Anchor { rowspan, colspan };
            }
        }

        roles
    }
}

#[derive(Debug, Clone, Copy)]
enum CellRole {
    Anchor { rowspan: usize, colspan: usize },
    Covered,
}

/// Find the interval of `bounds` containing `v`.
///
/// `bounds` is strictly increasing. A value exactly on a boundary lands in
/// the higher-index interval; a value on the last boundary has no higher
/// interval and is reported as outside.
fn interval_index(bounds: &[f32], v: f32) -> Option<usize> {
    if v < bounds[0] {
        return None;
    }
    for i in 0..bounds.len() - 1 {
        if v >= bounds[i] && v < bounds[i + 1] {
            return Some(i);
        }
    }
    None
}

/// Concatenate span texts in reading order with single spaces.
fn join_in_reading_order(spans: &[TextSpan], mut indices: Vec<usize>, config: &LayoutConfig) -> String {
    indices.sort_by(|&a, &b| {
        let (sa, sb) = (&spans[a], &spans[b]);
        let dy = sa.baseline - sb.baseline;
        if dy.abs() > config.row_gap_tolerance {
            sa.baseline.total_cmp(&sb.baseline)
        } else {
            sa.bbox.x0.total_cmp(&sb.bbox.x0)
        }
    });
    let parts: Vec<&str> = indices
        .iter()
        .map(|&i| spans[i].text.trim())
        .filter(|t| !t.is_empty())
        .collect();
    parts.join(" ")
}

/// Minimal union-find over ruling indices.
struct Dsu {
    parent: Vec<usize>,
}

impl Dsu {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
        }
    }

    fn find(&mut self, x: usize) -> usize {
        if self.parent[x] != x {
            let root = self.find(self.parent[x]);
            self.parent[x] = root;
        }
        self.parent[x]
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            self.parent[ra] = rb;
        }
    }
}
