//! `summary`, `parse` and `objects` commands

use serde_json::{Value, json};

use super::{CliError, InputOptions, load_programs};
use crate::ast::NodeKind;
use crate::output::{JsonPrinter, to_value};

/// Program info records, one per input.
pub fn execute_summary(options: &InputOptions) -> Result<String, CliError> {
    let infos = load_programs(options)?
        .iter()
        .map(|program| to_value(&program.extended_info()))
        .collect::<Result<Vec<Value>, _>>()?;
    Ok(JsonPrinter::new(options.pretty).print(&Value::Array(infos)))
}

/// Full reconstructed node tree with spans and coverage.
pub fn execute_parse(options: &InputOptions) -> Result<String, CliError> {
    let mut trees = Vec::new();
    for program in load_programs(options)? {
        trees.push(json!({
            "name": program.name(),
            "parsed": program.parsed_rate(),
            "stats": to_value(&program.stats())?,
            "contents": to_value(program.contents())?,
        }));
    }
    Ok(JsonPrinter::new(options.pretty).print(&Value::Array(trees)))
}

/// Flat object list, optionally restricted to one kind.
pub fn execute_objects(options: &InputOptions, kind: Option<&str>) -> Result<String, CliError> {
    let kind = kind
        .map(|name| {
            name.parse::<NodeKind>()
                .map_err(CliError::UnknownKind)
        })
        .transpose()?;

    let mut objects = Vec::new();
    for program in load_programs(options)? {
        for item in program.objects() {
            if kind.is_some_and(|wanted| item.kind() != wanted) {
                continue;
            }
            objects.push(to_value(item)?);
        }
    }
    Ok(JsonPrinter::new(options.pretty).print(&Value::Array(objects)))
}
