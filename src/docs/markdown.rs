//! Line-oriented Markdown builder.

use std::path::Path;

use crate::error::Result;

#[derive(Debug, Default)]
pub struct MarkdownWriter {
    buffer: String,
}

impl MarkdownWriter {
    pub fn new() -> Self {
        Self::default()
    }

    fn line(&mut self, line: &str) {
        self.buffer.push_str(line);
        self.buffer.push('\n');
    }

    pub fn h1_underline(&mut self, text: &str) {
        self.line(text);
        self.line("======");
        self.line("");
    }

    pub fn h2_underline(&mut self, text: &str) {
        self.line(text);
        self.line("------");
        self.line("");
    }

    pub fn paragraph(&mut self, text: &str) {
        self.line(text);
    }

    pub fn bullet(&mut self, text: &str) {
        self.line(&format!("* {}", text));
    }

    pub fn table<S: AsRef<str>>(&mut self, headers: &[&str], rows: &[Vec<S>]) {
        self.line(&format!("|{}|", headers.join(" | ")));
        self.line(&vec!["---"; headers.len()].join(" | "));
        for row in rows {
            let cells: Vec<String> = row.iter().map(|cell| escape_cell(cell.as_ref())).collect();
            self.line(&cells.join(" | "));
        }
        self.line("");
    }

    pub fn as_str(&self) -> &str {
        &self.buffer
    }

    pub fn into_string(self) -> String {
        self.buffer
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        std::fs::write(path, &self.buffer)?;
        Ok(())
    }
}

pub fn inline_code(text: &str) -> String {
    format!("`{}`", text)
}

pub fn link(text: &str, target: &str) -> String {
    format!("[{}]({})", text, target)
}

/// Keeps a value on one table row: pipes are escaped and line breaks folded.
fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
        .replace("\r\n", " ")
        .replace(['\n', '\r'], " ")
}
