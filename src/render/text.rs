//! Plain text rendering.

use crate::error::Result;
use crate::model::Document;

use super::{CleanupPipeline, RenderOptions};

/// Convert a document to plain text, applying cleanup when configured.
pub fn to_text(doc: &Document, options: &RenderOptions) -> Result<String> {
    let mut text = doc.plain_text();

    if let Some(ref cleanup_options) = options.cleanup {
        let pipeline = CleanupPipeline::new(cleanup_options.clone());
        text = pipeline.process(&text);
    }

    Ok(text.trim().to_string())
}
