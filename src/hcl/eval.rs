//! Literal evaluation of HCL expression nodes.
//!
//! Only constant expressions are supported: numbers, booleans, strings
//! without interpolation, heredocs without interpolation, tuples and objects.
//! Type expressions (`list(string)`, `object({...})`, ...) are evaluated
//! separately into their canonical type string.

use std::collections::BTreeMap;
use std::iter::Peekable;
use std::str::Chars;

use tree_sitter::Node;

use crate::error::{DocError, Result};
use crate::value::{ConfigValue, Number};

pub(crate) fn node_text<'a>(node: Node<'_>, source: &'a str) -> &'a str {
    source.get(node.start_byte()..node.end_byte()).unwrap_or("")
}

/// Named children of `node`, with comments removed.
pub(crate) fn named_children(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|child| child.kind() != "comment")
        .collect()
}

fn single_named_child(node: Node<'_>) -> Option<Node<'_>> {
    let children = named_children(node);
    match children.as_slice() {
        [only] => Some(*only),
        _ => None,
    }
}

/// Strips `expression`, `literal_value` and `collection_value` wrappers.
fn unwrap_expression(node: Node<'_>) -> Node<'_> {
    let mut current = node;
    while matches!(
        current.kind(),
        "expression" | "literal_value" | "collection_value" | "template_expr"
    ) {
        match single_named_child(current) {
            Some(inner) => current = inner,
            None => break,
        }
    }
    current
}

fn unrepresentable(node: Node<'_>, source: &str) -> DocError {
    DocError::UnrepresentableValue(format!(
        "`{}` is not a literal value",
        node_text(node, source).trim()
    ))
}

pub(crate) fn is_null(node: Node<'_>) -> bool {
    unwrap_expression(node).kind() == "null_lit"
}

pub(crate) fn evaluate_value(node: Node<'_>, source: &str) -> Result<ConfigValue> {
    match node.kind() {
        "expression" | "literal_value" | "collection_value" | "template_expr" | "operation" => {
            match single_named_child(node) {
                Some(inner) => evaluate_value(inner, source),
                None => Err(unrepresentable(node, source)),
            }
        }
        "numeric_lit" => Ok(ConfigValue::Num(node_text(node, source).parse::<Number>()?)),
        "bool_lit" => Ok(ConfigValue::Bool(node_text(node, source).trim() == "true")),
        "string_lit" | "quoted_template" => quoted_string(node, source).map(ConfigValue::Str),
        "heredoc_template" => heredoc_string(node, source).map(ConfigValue::Str),
        "tuple" => named_children(node)
            .into_iter()
            .filter(|child| child.kind() == "expression")
            .map(|child| evaluate_value(child, source))
            .collect::<Result<Vec<_>>>()
            .map(ConfigValue::Seq),
        "object" => {
            let mut entries = Vec::new();
            for elem in named_children(node)
                .into_iter()
                .filter(|child| child.kind() == "object_elem")
            {
                let (key, val) = object_elem_parts(elem, source)?;
                entries.push((object_key(key, source)?, evaluate_value(val, source)?));
            }
            ConfigValue::map(entries)
        }
        "unary_operation" => unary_operation(node, source),
        _ => Err(unrepresentable(node, source)),
    }
}

fn unary_operation(node: Node<'_>, source: &str) -> Result<ConfigValue> {
    let operand = named_children(node)
        .pop()
        .ok_or_else(|| unrepresentable(node, source))?;
    let operator = node_text(node, source).trim_start().chars().next();

    match (operator, evaluate_value(operand, source)?) {
        (Some('-'), ConfigValue::Num(n)) => Ok(ConfigValue::Num(n.negate())),
        (Some('!'), ConfigValue::Bool(b)) => Ok(ConfigValue::Bool(!b)),
        _ => Err(unrepresentable(node, source)),
    }
}

fn object_elem_parts<'t>(elem: Node<'t>, source: &str) -> Result<(Node<'t>, Node<'t>)> {
    if let (Some(key), Some(val)) = (
        elem.child_by_field_name("key"),
        elem.child_by_field_name("val"),
    ) {
        return Ok((key, val));
    }

    let parts: Vec<_> = named_children(elem)
        .into_iter()
        .filter(|child| child.kind() == "expression")
        .collect();
    match parts.as_slice() {
        [key, val] => Ok((*key, *val)),
        _ => Err(unrepresentable(elem, source)),
    }
}

/// Object keys are bare identifiers or literal strings/numbers.
fn object_key(node: Node<'_>, source: &str) -> Result<String> {
    let inner = unwrap_expression(node);
    if inner.kind() == "variable_expr" {
        return Ok(node_text(inner, source).trim().to_string());
    }

    match evaluate_value(inner, source)? {
        ConfigValue::Str(s) => Ok(s),
        ConfigValue::Num(n) => Ok(n.to_string()),
        other => Err(DocError::UnrepresentableValue(format!(
            "object key `{}` must be a string, found {}",
            node_text(node, source).trim(),
            other.kind()
        ))),
    }
}

fn has_interpolation(node: Node<'_>) -> bool {
    named_children(node)
        .iter()
        .any(|child| matches!(child.kind(), "template_interpolation" | "template_directive"))
}

fn quoted_string(node: Node<'_>, source: &str) -> Result<String> {
    if has_interpolation(node) {
        return Err(unrepresentable(node, source));
    }
    decode_quoted(node_text(node, source))
}

/// Decodes a double-quoted HCL string literal, including its quotes.
pub(crate) fn decode_quoted(raw: &str) -> Result<String> {
    let inner = raw
        .trim()
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .ok_or_else(|| DocError::UnrepresentableValue(format!("`{}` is not a quoted string", raw)))?;

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('n') => out.push('\n'),
                Some('r') => out.push('\r'),
                Some('t') => out.push('\t'),
                Some('"') => out.push('"'),
                Some('\\') => out.push('\\'),
                Some('u') => out.push(read_unicode(&mut chars, 4, raw)?),
                Some('U') => out.push(read_unicode(&mut chars, 8, raw)?),
                _ => {
                    return Err(DocError::UnrepresentableValue(format!(
                        "invalid escape sequence in {}",
                        raw
                    )))
                }
            },
            '$' | '%' => {
                push_template_marker(c, &mut chars, &mut out);
            }
            _ => out.push(c),
        }
    }
    Ok(out)
}

/// `$${` and `%%{` are literal `${` and `%{`.
fn push_template_marker(c: char, chars: &mut Peekable<Chars<'_>>, out: &mut String) {
    if chars.peek() == Some(&c) {
        let mut lookahead = chars.clone();
        lookahead.next();
        if lookahead.peek() == Some(&'{') {
            chars.next();
        }
    }
    out.push(c);
}

fn read_unicode(chars: &mut Peekable<Chars<'_>>, len: usize, raw: &str) -> Result<char> {
    let hex: String = chars.by_ref().take(len).collect();
    u32::from_str_radix(&hex, 16)
        .ok()
        .filter(|_| hex.len() == len)
        .and_then(char::from_u32)
        .ok_or_else(|| {
            DocError::UnrepresentableValue(format!("invalid unicode escape in {}", raw))
        })
}

fn heredoc_string(node: Node<'_>, source: &str) -> Result<String> {
    if has_interpolation(node) {
        return Err(unrepresentable(node, source));
    }

    let markers: Vec<_> = named_children(node)
        .into_iter()
        .filter(|child| child.kind() == "heredoc_identifier")
        .collect();
    let (open, close) = match markers.as_slice() {
        [open, .., close] => (*open, *close),
        _ => return Err(unrepresentable(node, source)),
    };

    let body = source.get(open.end_byte()..close.start_byte()).unwrap_or("");
    let body = body
        .strip_prefix("\r\n")
        .or_else(|| body.strip_prefix('\n'))
        .unwrap_or(body);
    let body = body.trim_end_matches([' ', '\t']);

    let body = if node_text(node, source).starts_with("<<-") {
        dedent(body)
    } else {
        body.to_string()
    };

    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '$' | '%' => push_template_marker(c, &mut chars, &mut out),
            _ => out.push(c),
        }
    }
    Ok(out)
}

fn dedent(body: &str) -> String {
    let indent = body
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start_matches([' ', '\t']).len())
        .min()
        .unwrap_or(0);

    body.split_inclusive('\n')
        .map(|line| {
            let strip = line
                .char_indices()
                .take_while(|(i, c)| *i < indent && (*c == ' ' || *c == '\t'))
                .count();
            &line[strip..]
        })
        .collect()
}

/// Evaluates a `type` attribute into its canonical type string.
pub(crate) fn evaluate_type(node: Node<'_>, source: &str) -> Result<String> {
    type_expr(node, source, false)
}

fn type_error(node: Node<'_>, source: &str, message: impl Into<String>) -> DocError {
    DocError::TypeExpression {
        expression: node_text(node, source).trim().to_string(),
        message: message.into(),
    }
}

fn type_expr(node: Node<'_>, source: &str, object_attribute: bool) -> Result<String> {
    let inner = unwrap_expression(node);
    match inner.kind() {
        "variable_expr" => {
            let keyword = node_text(inner, source).trim();
            match keyword {
                "string" | "number" | "bool" | "any" => Ok(keyword.to_string()),
                "list" | "set" | "map" | "tuple" | "object" => Err(type_error(
                    inner,
                    source,
                    format!("the {} type constructor requires an argument", keyword),
                )),
                _ => Err(type_error(
                    inner,
                    source,
                    format!("unknown type keyword {}", keyword),
                )),
            }
        }
        // Quoted type names from Terraform 0.11.
        "string_lit" | "quoted_template" => {
            let legacy = quoted_string(inner, source).map_err(|_| {
                type_error(inner, source, "quoted type names cannot use interpolation")
            })?;
            match legacy.as_str() {
                "string" => Ok("string".to_string()),
                "list" => Ok("list(string)".to_string()),
                "map" => Ok("map(string)".to_string()),
                _ => Err(type_error(inner, source, "unknown quoted type name")),
            }
        }
        "function_call" => type_constructor(inner, source, object_attribute),
        _ => Err(type_error(inner, source, "not a valid type expression")),
    }
}

fn type_constructor(node: Node<'_>, source: &str, object_attribute: bool) -> Result<String> {
    let children = named_children(node);
    let name = children
        .iter()
        .find(|child| child.kind() == "identifier")
        .map(|child| node_text(*child, source).trim())
        .unwrap_or("");
    let args: Vec<_> = children
        .iter()
        .find(|child| child.kind() == "function_arguments")
        .map(|list| {
            named_children(*list)
                .into_iter()
                .filter(|child| child.kind() == "expression")
                .collect()
        })
        .unwrap_or_default();

    match (name, args.as_slice()) {
        ("list" | "set" | "map", [element]) => {
            Ok(format!("{}({})", name, type_expr(*element, source, false)?))
        }
        ("tuple", [elements]) => {
            let tuple = unwrap_expression(*elements);
            if tuple.kind() != "tuple" {
                return Err(type_error(node, source, "tuple() expects a list of element types"));
            }
            let types = named_children(tuple)
                .into_iter()
                .filter(|child| child.kind() == "expression")
                .map(|child| type_expr(child, source, false))
                .collect::<Result<Vec<_>>>()?;
            Ok(format!("tuple([{}])", types.join(",")))
        }
        ("object", [attributes]) => {
            let object = unwrap_expression(*attributes);
            if object.kind() != "object" {
                return Err(type_error(node, source, "object() expects a map of attribute types"));
            }
            let mut types = BTreeMap::new();
            for elem in named_children(object)
                .into_iter()
                .filter(|child| child.kind() == "object_elem")
            {
                let (key, val) = object_elem_parts(elem, source)
                    .map_err(|_| type_error(elem, source, "invalid object attribute"))?;
                let key = object_key(key, source)
                    .map_err(|_| type_error(key, source, "invalid object attribute name"))?;
                let attr_type = type_expr(val, source, true)?;
                if types.insert(key.clone(), attr_type).is_some() {
                    return Err(type_error(
                        node,
                        source,
                        format!("duplicate object attribute {}", key),
                    ));
                }
            }
            let attrs: Vec<_> = types
                .into_iter()
                .map(|(key, attr_type)| format!("{}={}", key, attr_type))
                .collect();
            Ok(format!("object({{{}}})", attrs.join(",")))
        }
        ("optional", [inner, ..]) if object_attribute && args.len() <= 2 => {
            Ok(format!("optional({})", type_expr(*inner, source, false)?))
        }
        ("optional", _) if !object_attribute => Err(type_error(
            node,
            source,
            "optional() is only valid for object attributes",
        )),
        ("list" | "set" | "map" | "tuple" | "object" | "optional", _) => Err(type_error(
            node,
            source,
            format!("wrong number of arguments for {}()", name),
        )),
        _ => Err(type_error(
            node,
            source,
            format!("unknown type constructor {}", name),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hcl::{blocks, HclParser};
    use crate::value::canonicalize;
    use std::path::Path;

    /// Parses `locals { v = <expr> }` and runs `f` on the expression.
    fn with_expr<T>(expr: &str, f: impl FnOnce(Node<'_>, &str) -> T) -> T {
        let source = format!("locals {{\n  v = {}\n}}\n", expr);
        let parsed = HclParser::new()
            .parse_source(source, Path::new("test.tf"))
            .unwrap();
        let blocks = blocks(&parsed);
        let attribute = blocks[0].attribute("v").unwrap();
        f(attribute.expr.node(), &parsed.source)
    }

    fn value(expr: &str) -> String {
        with_expr(expr, |node, source| canonicalize(&evaluate_value(node, source).unwrap()))
    }

    fn value_err(expr: &str) -> DocError {
        with_expr(expr, |node, source| evaluate_value(node, source).unwrap_err())
    }

    fn type_string(expr: &str) -> Result<String> {
        with_expr(expr, |node, source| evaluate_type(node, source))
    }

    #[test]
    fn test_scalar_literals() {
        assert_eq!(value("\"hello\""), "hello");
        assert_eq!(value("\"\""), "");
        assert_eq!(value("10"), "10");
        assert_eq!(value("3.14"), "3.14");
        assert_eq!(value("1e3"), "1000");
        assert_eq!(value("1E3"), "1000");
        assert_eq!(value("1e+3"), "1000");
        assert_eq!(value("[2e2, -5e-1]"), "[200, -0.5]");
        assert_eq!(value("true"), "true");
        assert_eq!(value("false"), "false");
    }

    #[test]
    fn test_unary_operators() {
        assert_eq!(value("-5"), "-5");
        assert_eq!(value("-0.25"), "-0.25");
        assert_eq!(value("!true"), "false");
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(value(r#""say \"hi\"""#), "say \"hi\"");
        assert_eq!(value(r#""tab\there""#), "tab\there");
        assert_eq!(value(r#""été""#), "été");
        assert_eq!(value(r#""$${literal}""#), "${literal}");
    }

    #[test]
    fn test_tuples_and_objects() {
        assert_eq!(value("[\"a\", \"b\", \"c\"]"), "[a, b, c]");
        assert_eq!(value("[]"), "[]");
        assert_eq!(value("{}"), "{}");
        assert_eq!(value("{ b = 2, a = 1 }"), "{a=1, b=2}");
        assert_eq!(value("{ \"quoted key\" = true }"), "{quoted key=true}");
        assert_eq!(
            value("[{a=\"ay\", b=10, c=false}, {d=\"dee\", e=20, f=true}]"),
            "[{a=ay, b=10, c=false}, {d=dee, e=20, f=true}]"
        );
    }

    #[test]
    fn test_multiline_object() {
        let expr = "{\n    name  = \"web\"\n    ports = [80, 443]\n  }";
        assert_eq!(value(expr), "{name=web, ports=[80, 443]}");
    }

    #[test]
    fn test_heredoc() {
        let expr = "<<EOT\nfirst line\nsecond line\nEOT";
        assert_eq!(value(expr), "first line\nsecond line\n");
    }

    #[test]
    fn test_indented_heredoc() {
        let expr = "<<-EOT\n    indented\n      more\n  EOT";
        assert_eq!(value(expr), "indented\n  more\n");
    }

    #[test]
    fn test_non_literals_are_unrepresentable() {
        assert!(matches!(value_err("var.region"), DocError::UnrepresentableValue(_)));
        assert!(matches!(value_err("upper(\"a\")"), DocError::UnrepresentableValue(_)));
        assert!(matches!(value_err("\"${var.name}-suffix\""), DocError::UnrepresentableValue(_)));
        assert!(matches!(value_err("1 + 2"), DocError::UnrepresentableValue(_)));
        assert!(matches!(value_err("[var.a]"), DocError::UnrepresentableValue(_)));
        assert!(matches!(value_err("null"), DocError::UnrepresentableValue(_)));
    }

    #[test]
    fn test_duplicate_object_keys_rejected() {
        assert!(matches!(value_err("{ a = 1, a = 2 }"), DocError::UnrepresentableValue(_)));
    }

    #[test]
    fn test_is_null() {
        assert!(with_expr("null", |node, _| is_null(node)));
        assert!(!with_expr("\"null\"", |node, _| is_null(node)));
    }

    #[test]
    fn test_primitive_types() {
        assert_eq!(type_string("string").unwrap(), "string");
        assert_eq!(type_string("number").unwrap(), "number");
        assert_eq!(type_string("bool").unwrap(), "bool");
        assert_eq!(type_string("any").unwrap(), "any");
    }

    #[test]
    fn test_collection_types() {
        assert_eq!(type_string("list(string)").unwrap(), "list(string)");
        assert_eq!(type_string("set(number)").unwrap(), "set(number)");
        assert_eq!(type_string("map(list(bool))").unwrap(), "map(list(bool))");
        assert_eq!(
            type_string("tuple([string, number, bool])").unwrap(),
            "tuple([string,number,bool])"
        );
    }

    #[test]
    fn test_object_types_sorted() {
        assert_eq!(
            type_string("object({ c = bool, a = string, b = number })").unwrap(),
            "object({a=string,b=number,c=bool})"
        );
        assert_eq!(
            type_string("list(object({ name = string, port = optional(number, 80) }))").unwrap(),
            "list(object({name=string,port=optional(number)}))"
        );
    }

    #[test]
    fn test_legacy_quoted_types() {
        assert_eq!(type_string("\"string\"").unwrap(), "string");
        assert_eq!(type_string("\"list\"").unwrap(), "list(string)");
        assert_eq!(type_string("\"map\"").unwrap(), "map(string)");
    }

    #[test]
    fn test_invalid_types() {
        assert!(matches!(type_string("strnig"), Err(DocError::TypeExpression { .. })));
        assert!(matches!(type_string("list"), Err(DocError::TypeExpression { .. })));
        assert!(matches!(type_string("list(string, number)"), Err(DocError::TypeExpression { .. })));
        assert!(matches!(type_string("optional(string)"), Err(DocError::TypeExpression { .. })));
        assert!(matches!(type_string("foo(string)"), Err(DocError::TypeExpression { .. })));
        assert!(matches!(type_string("10"), Err(DocError::TypeExpression { .. })));
    }
}
