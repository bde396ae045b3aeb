use tree_sitter::Node;

use crate::error::Result;
use crate::hcl::eval::{self, named_children, node_text};
use crate::hcl::parser::ParsedFile;
use crate::value::ConfigValue;

/// A top-level block such as `variable "name" { ... }`.
#[derive(Debug)]
pub struct ConfigBlock<'a> {
    pub kind: String,
    pub labels: Vec<String>,
    pub attributes: Vec<Attribute<'a>>,
    /// 1-based line of the block header
    pub line: usize,
}

impl ConfigBlock<'_> {
    /// First label, which names `variable` and `output` declarations.
    pub fn name(&self) -> Option<&str> {
        self.labels.first().map(String::as_str)
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute<'_>> {
        self.attributes.iter().find(|attr| attr.name == name)
    }
}

#[derive(Debug)]
pub struct Attribute<'a> {
    pub name: String,
    pub expr: Expression<'a>,
}

/// Unevaluated expression handle.
#[derive(Debug, Clone, Copy)]
pub struct Expression<'a> {
    node: Node<'a>,
    source: &'a str,
}

impl<'a> Expression<'a> {
    pub fn node(&self) -> Node<'a> {
        self.node
    }

    pub fn is_null(&self) -> bool {
        eval::is_null(self.node)
    }

    /// Evaluates the expression as a literal value.
    pub fn value(&self) -> Result<ConfigValue> {
        eval::evaluate_value(self.node, self.source)
    }

    /// Evaluates the expression as a type constraint, e.g. `list(string)`.
    pub fn type_string(&self) -> Result<String> {
        eval::evaluate_type(self.node, self.source)
    }
}

/// Collects the top-level blocks of a parsed file in source order.
pub fn blocks(parsed: &ParsedFile) -> Vec<ConfigBlock<'_>> {
    let source = parsed.source.as_str();
    let mut result = Vec::new();

    for child in named_children(parsed.root_node()) {
        match child.kind() {
            "body" => {
                for item in named_children(child) {
                    if item.kind() == "block" {
                        result.push(config_block(item, source));
                    }
                }
            }
            "block" => result.push(config_block(child, source)),
            _ => {}
        }
    }

    result
}

fn config_block<'a>(node: Node<'a>, source: &'a str) -> ConfigBlock<'a> {
    let mut kind = String::new();
    let mut labels = Vec::new();
    let mut attributes = Vec::new();
    let mut in_header = true;

    for child in named_children(node) {
        match child.kind() {
            "identifier" if in_header && kind.is_empty() => {
                kind = node_text(child, source).trim().to_string();
            }
            "identifier" if in_header => {
                labels.push(node_text(child, source).trim().to_string());
            }
            "string_lit" if in_header => {
                let raw = node_text(child, source);
                labels.push(eval::decode_quoted(raw).unwrap_or_else(|_| raw.trim_matches('"').to_string()));
            }
            "block_start" => in_header = false,
            "body" => {
                in_header = false;
                attributes.extend(
                    named_children(child)
                        .into_iter()
                        .filter(|item| item.kind() == "attribute")
                        .filter_map(|item| attribute(item, source)),
                );
            }
            _ => {}
        }
    }

    ConfigBlock {
        kind,
        labels,
        attributes,
        line: node.start_position().row + 1,
    }
}

fn attribute<'a>(node: Node<'a>, source: &'a str) -> Option<Attribute<'a>> {
    let children = named_children(node);
    let name = children.iter().find(|child| child.kind() == "identifier")?;
    let expr = children.iter().find(|child| child.kind() == "expression")?;

    Some(Attribute {
        name: node_text(*name, source).trim().to_string(),
        expr: Expression {
            node: *expr,
            source,
        },
    })
}
