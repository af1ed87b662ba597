//! Geometry normalization: from raw drawing primitives to canonical
//! boundary lines.
//!
//! Providers report borders as a soup of thin rectangles, one per stroked
//! path, often fragmented and never perfectly collinear. This module
//! classifies each primitive as horizontal or vertical, decomposes filled
//! rectangles into their four edges, and clusters near-collinear segments
//! into one canonical ruling per boundary.

use crate::config::LayoutConfig;
use crate::provider::LinePrimitive;

/// Orientation of a classified segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Width much greater than height
    Horizontal,
    /// Height much greater than width
    Vertical,
}

/// A classified line segment in one axis.
#[derive(Debug, Clone, Copy)]
pub struct Segment {
    /// Cross-axis coordinate (y for horizontal, x for vertical)
    pub position: f32,
    /// Along-axis start coordinate
    pub start: f32,
    /// Along-axis end coordinate
    pub end: f32,
    /// Stroke width
    pub stroke_width: f32,
}

impl Segment {
    /// Length along the segment's axis.
    pub fn length(&self) -> f32 {
        self.end - self.start
    }
}

/// A canonical boundary: the median coordinate of a cluster of
/// near-collinear segments, with the merged extent of its members.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ruling {
    /// Cross-axis coordinate
    pub position: f32,
    /// Along-axis start of the merged extent
    pub start: f32,
    /// Along-axis end of the merged extent
    pub end: f32,
}

impl Ruling {
    /// Whether the ruling's extent covers `[from, to]` within `tol`.
    pub fn covers(&self, from: f32, to: f32, tol: f32) -> bool {
        self.start <= from + tol && self.end >= to - tol
    }
}

/// Canonical boundaries of one page, split by axis.
///
/// Horizontal rulings are candidate row boundaries (sorted by y),
/// vertical rulings candidate column boundaries (sorted by x).
#[derive(Debug, Clone, Default)]
pub struct RulingSet {
    /// Row boundary candidates
    pub horizontal: Vec<Ruling>,
    /// Column boundary candidates
    pub vertical: Vec<Ruling>,
}

impl RulingSet {
    /// Whether the set cannot describe any grid.
    pub fn is_empty(&self) -> bool {
        self.horizontal.is_empty() && self.vertical.is_empty()
    }
}

/// Normalize raw primitives into canonical row/column boundaries.
///
/// Returns an empty set when fewer than 2 boundaries exist on either axis;
/// that is the "no bordered table" signal, not an error.
pub fn normalize(lines: &[LinePrimitive], config: &LayoutConfig) -> RulingSet {
    let mut horizontal = Vec::new();
    let mut vertical = Vec::new();

    for prim in lines {
        for (orientation, segment) in classify(prim, config) {
            match orientation {
                Orientation::Horizontal => horizontal.push(segment),
                Orientation::Vertical => vertical.push(segment),
            }
        }
    }

    log::debug!(
        "rulings: {} horizontal / {} vertical segments after classification",
        horizontal.len(),
        vertical.len()
    );

    let horizontal = cluster(horizontal, config.line_tolerance);
    let vertical = cluster(vertical, config.line_tolerance);

    if horizontal.len() < 2 || vertical.len() < 2 {
        log::debug!(
            "rulings: insufficient boundaries ({} rows, {} cols), no grid",
            horizontal.len(),
            vertical.len()
        );
        return RulingSet::default();
    }

    RulingSet {
        horizontal,
        vertical,
    }
}

/// Classify one primitive into zero or more oriented segments.
///
/// Thin primitives become a single segment; primitives thick in both
/// dimensions are rectangle outlines and contribute their four edges.
/// Degenerate and short primitives are dropped.
fn classify(prim: &LinePrimitive, config: &LayoutConfig) -> Vec<(Orientation, Segment)> {
    let b = prim.bbox;
    let w = b.width();
    let h = b.height();
    let thick = config.max_stroke_thickness;

    if w <= thick && h <= thick {
        // Dot or zero-area degenerate
        return Vec::new();
    }

    if h <= thick {
        if w < config.min_segment_length {
            return Vec::new();
        }
        return vec![(
            Orientation::Horizontal,
            Segment {
                position: (b.y0 + b.y1) / 2.0,
                start: b.x0,
                end: b.x1,
                stroke_width: h.max(prim.stroke_width),
            },
        )];
    }

    if w <= thick {
        if h < config.min_segment_length {
            return Vec::new();
        }
        return vec![(
            Orientation::Vertical,
            Segment {
                position: (b.x0 + b.x1) / 2.0,
                start: b.y0,
                end: b.y1,
                stroke_width: w.max(prim.stroke_width),
            },
        )];
    }

    // Rectangle outline: top, bottom, left, right edges
    let sw = prim.stroke_width.max(0.5);
    let mut edges = Vec::with_capacity(4);
    if w >= config.min_segment_length {
        for y in [b.y0, b.y1] {
            edges.push((
                Orientation::Horizontal,
                Segment {
                    position: y,
                    start: b.x0,
                    end: b.x1,
                    stroke_width: sw,
                },
            ));
        }
    }
    if h >= config.min_segment_length {
        for x in [b.x0, b.x1] {
            edges.push((
                Orientation::Vertical,
                Segment {
                    position: x,
                    start: b.y0,
                    end: b.y1,
                    stroke_width: sw,
                },
            ));
        }
    }
    edges
}

/// Cluster segments whose cross-axis coordinates agree within tolerance
/// into canonical rulings. The representative coordinate is the median of
/// the cluster; member extents are merged.
fn cluster(mut segments: Vec<Segment>, line_tolerance: f32) -> Vec<Ruling> {
    if segments.is_empty() {
        return Vec::new();
    }

    segments.sort_by(|a, b| a.position.total_cmp(&b.position));

    let mut rulings = Vec::new();
    let mut members: Vec<Segment> = vec![segments[0]];

    for seg in segments.into_iter().skip(1) {
        let anchor = *members.last().unwrap();
        let tol = line_tolerance.max(anchor.stroke_width).max(seg.stroke_width);
        if (seg.position - anchor.position).abs() < tol {
            members.push(seg);
        } else {
            rulings.push(collapse(&members));
            members.clear();
            members.push(seg);
        }
    }
    rulings.push(collapse(&members));

    rulings
}

/// Collapse one cluster into its canonical ruling.
fn collapse(members: &[Segment]) -> Ruling {
    let mut positions: Vec<f32> = members.iter().map(|s| s.position).collect();
    positions.sort_by(f32::total_cmp);
    let mid = positions.len() / 2;
    let position = if positions.len() % 2 == 1 {
        positions[mid]
    } else {
        (positions[mid - 1] + positions[mid]) / 2.0
    };

    let start = members
        .iter()
        .map(|s| s.start)
        .fold(f32::INFINITY, f32::min);
    let end = members
        .iter()
        .map(|s| s.end)
        .fold(f32::NEG_INFINITY, f32::max);

    Ruling {
        position,
        start,
        end,
    }
}
