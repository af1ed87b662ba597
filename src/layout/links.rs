//! Hyperlink embedding: match link annotations to the spans they cover.
//!
//! A link owns no spans; it is matched once against span geometry and the
//! winning URI is carried alongside each covered span into block assembly,
//! where adjacent covered spans merge into a single link run.

use crate::provider::{LinkRect, TextSpan};

/// Resolve the covering link for each span.
///
/// A link covers a span when their boxes intersect with at least half the
/// span's area. Returns a vector parallel to `spans`. Links that cover no
/// span are dropped: there is no bare-URL fallback.
pub fn resolve_span_links(spans: &[TextSpan], links: &[LinkRect]) -> Vec<Option<String>> {
    let mut resolved: Vec<Option<String>> = vec![None; spans.len()];
    if links.is_empty() {
        return resolved;
    }

    let mut matched = vec![false; links.len()];

    for (i, span) in spans.iter().enumerate() {
        let span_area = span.bbox.area();
        if span_area <= 0.0 {
            continue;
        }
        for (j, link) in links.iter().enumerate() {
            let covered = link
                .bbox
                .intersection(&span.bbox)
                .map(|overlap| overlap.area() >= span_area / 2.0)
                .unwrap_or(false);
            if covered {
                resolved[i] = Some(link.uri.clone());
                matched[j] = true;
                break;
            }
        }
    }

    for (j, link) in links.iter().enumerate() {
        if !matched[j] {
            log::debug!("links: no span under annotation for {}, dropped", link.uri);
        }
    }

    resolved
}
