//! Document model types for reconstructed content.
//!
//! This module defines the intermediate representation (IR) that bridges
//! geometric layout analysis and content rendering. The model is
//! provider-agnostic: once a page's primitives have been classified, the
//! IR carries no geometry, only structure.

mod document;
mod page;
mod paragraph;
mod table;

pub use document::Document;
pub use page::{Block, Page};
pub use paragraph::{InlineContent, Paragraph, TextRun, TextStyle};
pub use table::{Alignment, Table, TableCell, TableRow};
