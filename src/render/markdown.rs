//! Markdown (GFM) rendering for reconstructed documents.

use crate::error::Result;
use crate::model::{Alignment, Block, Document, InlineContent, Page, Paragraph, Table, TextRun};

use super::{CleanupPipeline, RenderOptions, TableFallback};

/// Convert a document to Markdown.
pub fn to_markdown(doc: &Document, options: &RenderOptions) -> Result<String> {
    let renderer = MarkdownRenderer::new(options.clone());
    renderer.render(doc)
}

/// Markdown renderer.
pub struct MarkdownRenderer {
    options: RenderOptions,
}

impl MarkdownRenderer {
    /// Create a new Markdown renderer.
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    /// Render a document to Markdown. Pages are joined with a blank line.
    pub fn render(&self, doc: &Document) -> Result<String> {
        let pages: Vec<String> = doc
            .pages
            .iter()
            .map(|p| self.render_page(p))
            .filter(|s| !s.is_empty())
            .collect();

        let mut output = pages.join("\n\n");
        if let Some(ref cleanup_options) = self.options.cleanup {
            let pipeline = CleanupPipeline::new(cleanup_options.clone());
            output = pipeline.process(&output);
        }

        Ok(output.trim().to_string())
    }

    /// Render one page to Markdown.
    pub fn render_page(&self, page: &Page) -> String {
        let mut output = String::new();
        for (i, block) in page.elements.iter().enumerate() {
            self.render_block(&mut output, block);

            // List items end with a single newline; give the list a
            // closing blank line when something else follows.
            if matches!(block, Block::ListItem { .. }) {
                let next_is_item = matches!(page.elements.get(i + 1), Some(Block::ListItem { .. }));
                if !next_is_item {
                    output.push('\n');
                }
            }
        }
        output.trim_end().to_string()
    }

    fn render_block(&self, output: &mut String, block: &Block) {
        match block {
            Block::Heading { level, content } => {
                let level = (*level).min(self.options.max_heading_level);
                output.push_str(&"#".repeat(level as usize));
                output.push(' ');
                self.render_inline(output, content);
                output.push_str("\n\n");
            }
            Block::ListItem {
                depth,
                number,
                content,
            } => {
                output.push_str(&"  ".repeat(*depth as usize));
                match number {
                    Some(n) => output.push_str(&format!("{}.", n)),
                    None => output.push(self.options.list_marker),
                }
                output.push(' ');
                self.render_inline(output, content);
                output.push('\n');
            }
            Block::Paragraph(p) => {
                if p.is_empty() {
                    return;
                }
                self.render_inline(output, p);
                output.push_str("\n\n");
            }
            Block::Table(t) => self.render_table(output, t),
        }
    }

    fn render_inline(&self, output: &mut String, paragraph: &Paragraph) {
        for item in &paragraph.content {
            match item {
                InlineContent::Text(run) => self.render_text_run(output, run),
                InlineContent::Link { text, url } => {
                    output.push_str(&format!("[{}]({})", text, url));
                }
            }
        }
    }

    fn render_text_run(&self, output: &mut String, run: &TextRun) {
        let text = if self.options.escape_special_chars {
            escape_markdown(&run.text)
        } else {
            run.text.clone()
        };

        // Emphasis markers hug the text, so surrounding spaces stay outside
        let trimmed = text.trim();
        if trimmed.is_empty() {
            output.push_str(&text);
            return;
        }

        let styled = if run.style.bold && run.style.italic {
            format!("***{}***", trimmed)
        } else if run.style.bold {
            format!("**{}**", trimmed)
        } else if run.style.italic {
            format!("*{}*", trimmed)
        } else {
            return output.push_str(&text);
        };

        let leading = text.len() - text.trim_start().len();
        let trailing = text.len() - text.trim_end().len();
        output.push_str(&text[..leading]);
        output.push_str(&styled);
        output.push_str(&text[text.len() - trailing..]);
    }

    fn render_table(&self, output: &mut String, table: &Table) {
        if table.is_empty() {
            return;
        }

        if table.has_merged_cells() && self.options.table_fallback == TableFallback::Html {
            self.render_table_html(output, table);
            return;
        }

        self.render_table_markdown(output, table);
    }

    fn render_table_markdown(&self, output: &mut String, table: &Table) {
        let col_count = table.column_count();
        if col_count == 0 {
            return;
        }

        let widths = if self.options.pad_cells {
            Some(column_widths(table))
        } else {
            None
        };

        for (i, row) in table.rows.iter().enumerate() {
            output.push('|');
            for (c, cell) in row.cells.iter().enumerate() {
                let content = cell_text(cell);
                match &widths {
                    Some(w) => output.push_str(&format!(" {:<width$} |", content, width = w[c])),
                    None => output.push_str(&format!(" {} |", content)),
                }
            }
            output.push('\n');

            let separator_after = if table.header_rows > 0 {
                i == table.header_rows as usize - 1
            } else {
                i == 0
            };
            if separator_after {
                output.push('|');
                for (c, cell) in row.cells.iter().enumerate() {
                    let width = widths.as_ref().map(|w| w[c]).unwrap_or(3);
                    output.push_str(&format!(" {} |", separator_marker(cell.alignment, width)));
                }
                output.push('\n');
            }
        }

        output.push('\n');
    }

    fn render_table_html(&self, output: &mut String, table: &Table) {
        let nrows = table.rows.len();
        let ncols = table.column_count();
        let covered = shadow_matrix(table, nrows, ncols);

        output.push_str("<table>\n");
        for (r, row) in table.rows.iter().enumerate() {
            let tag = if row.is_header { "th" } else { "td" };
            output.push_str("<tr>");
            for (c, cell) in row.cells.iter().enumerate() {
                if covered[r * ncols + c] {
                    continue;
                }
                let mut attrs = String::new();
                if cell.rowspan > 1 {
                    attrs.push_str(&format!(" rowspan=\"{}\"", cell.rowspan));
                }
                if cell.colspan > 1 {
                    attrs.push_str(&format!(" colspan=\"{}\"", cell.colspan));
                }
                output.push_str(&format!("<{}{}>{}</{}>", tag, attrs, cell.text, tag));
            }
            output.push_str("</tr>\n");
        }
        output.push_str("</table>\n\n");
    }
}

/// GFM separator cell of the given width.
fn separator_marker(alignment: Alignment, width: usize) -> String {
    match alignment {
        Alignment::Left => "-".repeat(width.max(3)),
        Alignment::Center => format!(":{}:", "-".repeat(width.max(5) - 2)),
        Alignment::Right => format!("{}:", "-".repeat(width.max(4) - 1)),
    }
}

/// Cell text safe for a pipe table: newlines flattened, pipes escaped.
fn cell_text(cell: &crate::model::TableCell) -> String {
    cell.text.replace('\n', " ").replace('|', "\\|").trim().to_string()
}

/// Widths (in characters) per column for padded rendering.
fn column_widths(table: &Table) -> Vec<usize> {
    let cols = table.column_count();
    let mut widths = vec![3; cols]; // at least room for "---"
    for row in &table.rows {
        for (c, cell) in row.cells.iter().enumerate().take(cols) {
            widths[c] = widths[c].max(cell_text(cell).chars().count());
        }
    }
    widths
}

/// Positions occupied by the shadow of a merged anchor cell.
fn shadow_matrix(table: &Table, nrows: usize, ncols: usize) -> Vec<bool> {
    let mut covered = vec![false; nrows * ncols];
    for (r, row) in table.rows.iter().enumerate() {
        for (c, cell) in row.cells.iter().enumerate().take(ncols) {
            if covered[r * ncols + c] || !cell.is_merged() {
                continue;
            }
            for rr in r..(r + cell.rowspan as usize).min(nrows) {
                for cc in c..(c + cell.colspan as usize).min(ncols) {
                    if rr != r || cc != c {
                        covered[rr * ncols + cc] = true;
                    }
                }
            }
        }
    }
    covered
}

/// Escape special Markdown characters.
/// Only characters that could be misinterpreted as Markdown syntax are
/// escaped, to keep extracted text readable.
fn escape_markdown(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' | '`' | '*' | '_' | '[' | ']' | '|' => {
                result.push('\\');
                result.push(c);
            }
            _ => result.push(c),
        }
    }
    result
}
