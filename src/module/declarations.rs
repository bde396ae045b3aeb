use crate::error::{DocError, Result};
use crate::hcl::ConfigBlock;
use crate::module::{OutputRecord, VariableRecord};
use crate::value::canonicalize;

/// Variables and outputs declared by a set of blocks, in discovery order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Declarations {
    pub variables: Vec<VariableRecord>,
    pub outputs: Vec<OutputRecord>,
}

/// Extracts `variable` and `output` declarations. Other block kinds and
/// unknown attributes are ignored.
pub fn extract_declarations(blocks: &[ConfigBlock<'_>]) -> Result<Declarations> {
    let mut declarations = Declarations::default();

    for block in blocks {
        match block.kind.as_str() {
            "variable" => declarations.variables.push(variable_record(block)?),
            "output" => declarations.outputs.push(OutputRecord {
                name: declaration_name(block)?,
                description: description(block),
            }),
            _ => {}
        }
    }

    Ok(declarations)
}

fn declaration_name(block: &ConfigBlock<'_>) -> Result<String> {
    match block.name() {
        Some(name) if !name.is_empty() => Ok(name.to_string()),
        _ => Err(DocError::MalformedDeclaration {
            kind: block.kind.clone(),
            line: block.line,
        }),
    }
}

/// Only string descriptions are kept; anything else yields an empty description.
fn description(block: &ConfigBlock<'_>) -> String {
    block
        .attribute("description")
        .and_then(|attr| attr.expr.value().ok())
        .and_then(|value| value.as_str().map(str::to_string))
        .unwrap_or_default()
}

fn variable_record(block: &ConfigBlock<'_>) -> Result<VariableRecord> {
    let name = declaration_name(block)?;

    let declared_type = match block.attribute("type") {
        Some(attr) => attr.expr.type_string()?,
        None => String::new(),
    };

    // A null default means the variable has no default value.
    let default = match block.attribute("default") {
        Some(attr) if !attr.expr.is_null() => Some(attr.expr.value().map_err(|e| match e {
            DocError::UnrepresentableValue(message) => DocError::UnrepresentableValue(format!(
                "default of variable {}: {}",
                name, message
            )),
            other => other,
        })?),
        _ => None,
    };

    Ok(VariableRecord {
        description: description(block),
        declared_type,
        has_default: default.is_some(),
        default_value: default.as_ref().map(canonicalize).unwrap_or_default(),
        name,
    })
}
