//! Paragraph and text-level types.

use serde::{Deserialize, Serialize};

/// A run of inline content: styled text or an embedded hyperlink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InlineContent {
    /// A styled text run
    Text(TextRun),

    /// A hyperlink wrapping its label text
    Link {
        /// Link label
        text: String,
        /// Target URI
        url: String,
    },
}

/// A piece of text with uniform styling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRun {
    /// The text content
    pub text: String,

    /// Character style
    pub style: TextStyle,
}

impl TextRun {
    /// Create an unstyled run.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: TextStyle::default(),
        }
    }
}

/// Character-level style flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextStyle {
    /// Bold text
    pub bold: bool,

    /// Italic text
    pub italic: bool,
}

/// A paragraph of inline content.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    /// Runs in the paragraph
    pub content: Vec<InlineContent>,
}

impl Paragraph {
    /// Create a new empty paragraph.
    pub fn new() -> Self {
        Self {
            content: Vec::new(),
        }
    }

    /// Create a paragraph with plain text.
    pub fn with_text(text: impl Into<String>) -> Self {
        let mut p = Self::new();
        p.add_text(text);
        p
    }

    /// Add plain text to the paragraph.
    pub fn add_text(&mut self, text: impl Into<String>) {
        self.content
            .push(InlineContent::Text(TextRun::plain(text)));
    }

    /// Add a styled text run.
    pub fn add_run(&mut self, run: TextRun) {
        self.content.push(InlineContent::Text(run));
    }

    /// Add a hyperlink run.
    pub fn add_link(&mut self, text: impl Into<String>, url: impl Into<String>) {
        self.content.push(InlineContent::Link {
            text: text.into(),
            url: url.into(),
        });
    }

    /// Get plain text content of the paragraph.
    pub fn plain_text(&self) -> String {
        self.content
            .iter()
            .map(|c| match c {
                InlineContent::Text(run) => run.text.as_str(),
                InlineContent::Link { text, .. } => text.as_str(),
            })
            .collect()
    }

    /// Check if the paragraph is empty.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty() || self.plain_text().trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paragraph_plain_text() {
        let mut p = Paragraph::with_text("See ");
        p.add_link("the docs", "https://example.com/docs");
        p.add_text(" for details.");

        assert_eq!(p.plain_text(), "See the docs for details.");
        assert!(!p.is_empty());
    }

    #[test]
    fn test_empty_paragraph() {
        assert!(Paragraph::new().is_empty());
        assert!(Paragraph::with_text("   ").is_empty());
    }

    #[test]
    fn test_styled_run() {
        let run = TextRun {
            text: "bold".to_string(),
            style: TextStyle {
                bold: true,
                italic: false,
            },
        };
        let mut p = Paragraph::new();
        p.add_run(run);
        assert_eq!(p.plain_text(), "bold");
    }
}
