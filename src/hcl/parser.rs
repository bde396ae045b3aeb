use std::path::{Path, PathBuf};

use crate::error::{DocError, Result};

/// Parses Terraform/HCL source into tree-sitter syntax trees.
pub struct HclParser {
    language: tree_sitter::Language,
}

impl HclParser {
    pub fn new() -> Self {
        Self {
            language: tree_sitter_hcl::LANGUAGE.into(),
        }
    }

    pub fn parse_file(&self, path: &Path) -> Result<ParsedFile> {
        let source = std::fs::read_to_string(path)?;
        self.parse_source(source, path)
    }

    /// Parses `source`, rejecting files that contain syntax errors.
    ///
    /// Numbers written with an exponent but no fraction (`1e3`) are valid HCL
    /// but not accepted by the grammar, so they are rewritten to `1.0e3`
    /// before parsing.
    pub fn parse_source(&self, source: impl Into<String>, path: &Path) -> Result<ParsedFile> {
        let source = normalize_exponents(source.into());
        let parse_error = |message: String| DocError::Parse {
            path: path.to_path_buf(),
            message,
        };

        let mut parser = tree_sitter::Parser::new();
        parser
            .set_language(&self.language)
            .map_err(|e| parse_error(e.to_string()))?;

        let tree = parser
            .parse(&source, None)
            .ok_or_else(|| parse_error("Failed to parse source".to_string()))?;

        if let Some(node) = first_error(tree.root_node()) {
            let position = node.start_position();
            return Err(parse_error(format!(
                "syntax error at line {}, column {}",
                position.row + 1,
                position.column + 1
            )));
        }

        Ok(ParsedFile {
            tree,
            source,
            path: path.to_path_buf(),
        })
    }
}

impl Default for HclParser {
    fn default() -> Self {
        Self::new()
    }
}

fn first_error(node: tree_sitter::Node<'_>) -> Option<tree_sitter::Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }

    let mut cursor = node.walk();
    let children: Vec<_> = node.children(&mut cursor).collect();
    children.into_iter().find_map(first_error).or(Some(node))
}

#[derive(Debug, Clone, Copy)]
enum LexMode {
    Code { braces: usize },
    Quoted,
}

/// Inserts `.0` before the exponent of every number literal that has none,
/// leaving strings, heredocs, comments and identifiers untouched.
fn normalize_exponents(source: String) -> String {
    let positions = bare_exponent_positions(&source);
    if positions.is_empty() {
        return source;
    }

    let mut out = String::with_capacity(source.len() + positions.len() * 2);
    let mut last = 0;
    for pos in positions {
        out.push_str(&source[last..pos]);
        out.push_str(".0");
        last = pos;
    }
    out.push_str(&source[last..]);
    out
}

/// Byte offsets of `e`/`E` in literals like `1e3`. All offsets are ASCII.
fn bare_exponent_positions(source: &str) -> Vec<usize> {
    let bytes = source.as_bytes();
    let at = |i: usize| bytes.get(i).copied().unwrap_or(0);
    let is_ident = |b: u8| b.is_ascii_alphanumeric() || b == b'_' || b == b'-' || b >= 0x80;

    let mut positions = Vec::new();
    let mut modes = vec![LexMode::Code { braces: 0 }];
    let mut i = 0;

    while i < bytes.len() {
        let depth = modes.len();
        let Some(mode) = modes.last_mut() else {
            break;
        };
        let b = bytes[i];

        match mode {
            LexMode::Quoted => match b {
                b'\\' => i += 2,
                b'$' | b'%' if at(i + 1) == b && at(i + 2) == b'{' => i += 3,
                b'$' | b'%' if at(i + 1) == b'{' => {
                    modes.push(LexMode::Code { braces: 0 });
                    i += 2;
                }
                b'"' | b'\n' => {
                    modes.pop();
                    i += 1;
                }
                _ => i += 1,
            },
            LexMode::Code { braces } => match b {
                b'#' => i = line_end(bytes, i),
                b'/' if at(i + 1) == b'/' => i = line_end(bytes, i),
                b'/' if at(i + 1) == b'*' => {
                    i = source[i + 2..]
                        .find("*/")
                        .map_or(bytes.len(), |end| i + 2 + end + 2);
                }
                b'"' => {
                    modes.push(LexMode::Quoted);
                    i += 1;
                }
                b'<' if at(i + 1) == b'<' => i = skip_heredoc(source, i),
                b'{' => {
                    *braces += 1;
                    i += 1;
                }
                b'}' => {
                    if *braces == 0 && depth > 1 {
                        modes.pop();
                    } else {
                        *braces = braces.saturating_sub(1);
                    }
                    i += 1;
                }
                b if b.is_ascii_digit() => {
                    let after_dot = i > 0 && bytes[i - 1] == b'.';
                    let mut j = i;
                    while at(j).is_ascii_digit() {
                        j += 1;
                    }
                    let signed = matches!(at(j + 1), b'+' | b'-');
                    let exponent_digit = if signed { at(j + 2) } else { at(j + 1) };
                    if !after_dot && matches!(at(j), b'e' | b'E') && exponent_digit.is_ascii_digit() {
                        positions.push(j);
                        j += if signed { 2 } else { 1 };
                        while at(j).is_ascii_digit() {
                            j += 1;
                        }
                    } else if at(j) == b'.' && at(j + 1).is_ascii_digit() {
                        // Fraction and any exponent are already in grammar form
                        j += 1;
                        while at(j).is_ascii_digit() {
                            j += 1;
                        }
                        if matches!(at(j), b'e' | b'E') {
                            j += 1;
                            if matches!(at(j), b'+' | b'-') {
                                j += 1;
                            }
                            while at(j).is_ascii_digit() {
                                j += 1;
                            }
                        }
                    }
                    i = j;
                }
                b if b.is_ascii_alphabetic() || b == b'_' || b >= 0x80 => {
                    while i < bytes.len() {
                        if is_ident(bytes[i]) {
                            i += 1;
                        } else if bytes[i] == b':' && at(i + 1) == b':' {
                            i += 2;
                        } else {
                            break;
                        }
                    }
                }
                _ => i += 1,
            },
        }
    }

    positions
}

fn line_end(bytes: &[u8], from: usize) -> usize {
    bytes[from..]
        .iter()
        .position(|&b| b == b'\n')
        .map_or(bytes.len(), |offset| from + offset)
}

/// Skips a heredoc starting at `<<`, returning the offset after its closing
/// marker. A `<<` that does not open a heredoc is skipped on its own.
fn skip_heredoc(source: &str, start: usize) -> usize {
    let rest = &source[start + 2..];
    let rest = rest.strip_prefix('-').unwrap_or(rest);
    let marker_len = rest
        .bytes()
        .take_while(|b| b.is_ascii_alphanumeric() || *b == b'_' || *b == b'-')
        .count();
    let marker = &rest[..marker_len];
    let after_marker = &rest[marker_len..];
    let body_start = match after_marker
        .strip_prefix("\r\n")
        .or_else(|| after_marker.strip_prefix('\n'))
    {
        Some(body) if !marker.is_empty() => source.len() - body.len(),
        _ => return start + 2,
    };

    let mut offset = body_start;
    for line in source[body_start..].split_inclusive('\n') {
        offset += line.len();
        if line.trim() == marker {
            return offset;
        }
    }
    source.len()
}

pub struct ParsedFile {
    pub tree: tree_sitter::Tree,
    /// Text the tree was built from; comments and strings are unchanged
    pub source: String,
    pub path: PathBuf,
}

impl ParsedFile {
    pub fn root_node(&self) -> tree_sitter::Node<'_> {
        self.tree.root_node()
    }

    pub fn node_text(&self, node: &tree_sitter::Node) -> &str {
        node.utf8_text(self.source.as_bytes()).unwrap_or("")
    }
}
