//! Module header comment extraction
//!
//! A module's main file may start its documentation with a block comment of
//! this fixed shape (the `partners` and `depends` lines are optional, but must
//! appear in this order):
//!
//! ```text
//! /*
//! title: s3-bucket
//! desc: Private S3 bucket with versioning and access logging
//! partners: cloudfront, iam-role
//! depends: kms-key
//! */
//! ```

use crate::error::{DocError, Result};
use crate::module::HeaderMetadata;

const OPEN: &str = "/*";
const CLOSE: &str = "*/";

/// Extracts the first header block found in `raw`.
///
/// Text without a header yields empty metadata. A block that has the header
/// shape but an empty title or description is an error.
pub fn extract_header(raw: &str) -> Result<HeaderMetadata> {
    let lines: Vec<&str> = raw.lines().map(str::trim_end).collect();

    for (i, line) in lines.iter().enumerate() {
        if *line != OPEN {
            continue;
        }
        if let Some(header) = match_header(&lines[i + 1..])? {
            return Ok(header);
        }
    }

    Ok(HeaderMetadata::default())
}

fn match_header(lines: &[&str]) -> Result<Option<HeaderMetadata>> {
    let mut lines = lines.iter().copied().peekable();

    let Some(title) = lines.next().and_then(|line| field(line, "title")) else {
        return Ok(None);
    };
    if !title.chars().all(is_token_char) {
        return Ok(None);
    }

    let Some(description) = lines.next().and_then(|line| field(line, "desc")) else {
        return Ok(None);
    };
    if description.contains(CLOSE) {
        return Ok(None);
    }

    let partners = lines.next_if(|line| field(line, "partners").is_some());
    let depends = lines.next_if(|line| field(line, "depends").is_some());

    if lines.next().map(str::trim) != Some(CLOSE) {
        return Ok(None);
    }

    if title.is_empty() {
        return Err(DocError::MalformedHeader("title is empty".to_string()));
    }
    if description.is_empty() {
        return Err(DocError::MalformedHeader(format!(
            "description of {} is empty",
            title
        )));
    }

    Ok(Some(HeaderMetadata {
        title: title.to_string(),
        description: description.to_string(),
        partners: partners.and_then(|line| field(line, "partners")).map(split_list).unwrap_or_default(),
        dependencies: depends.and_then(|line| field(line, "depends")).map(split_list).unwrap_or_default(),
    }))
}

/// Value of a `name: value` line, trimmed.
fn field<'a>(line: &'a str, name: &str) -> Option<&'a str> {
    line.strip_prefix(name)?.strip_prefix(':').map(str::trim)
}

fn is_token_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-'
}

/// Splits on commas. Empty elements are kept so authoring mistakes stay visible.
fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|item| item.trim_matches([' ', '\t', '\r', '\n']).to_string())
        .collect()
}
