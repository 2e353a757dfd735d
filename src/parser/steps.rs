use std::sync::LazyLock;

use regex::Regex;

use crate::ast::{DataArg, DataObjectRef, DataStep, Procedure};
use crate::lexer::{Cursor, name};
use crate::parser::{data_arg, data_line, data_object, optional, separated};

static SET_OR_MERGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:set|merge)\b").expect("set pattern"));
static RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\brun\b").expect("run pattern"));
static STEP_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:run|quit)\s*;").expect("step end pattern"));
static DATA_OPTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bdata\s*=\s*").expect("data option pattern"));
static OUT_OPTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bout\s*=\s*").expect("out option pattern"));

/// `data outputs [/ options]; header [set|merge inputs;] body run;`
pub fn data_step(cursor: Cursor<'_>) -> Option<(DataStep, Cursor<'_>)> {
    let cursor = cursor.word("data")?.whitespace()?;
    let (outputs, cursor) = data_line(cursor);
    let (options, cursor) = optional(cursor, step_options(cursor));
    let cursor = cursor.skip_whitespace().char(';')?;

    let (header, cursor) = match header(cursor) {
        Some((header, next)) => (header, next),
        None => ("", cursor),
    };
    let (inputs, cursor) = match set_statement(cursor) {
        Some((inputs, next)) => (inputs, next),
        None => (Vec::new(), cursor),
    };

    let run = cursor.find(&RUN)?;
    let body = &cursor.source()[cursor.offset()..run.start()];
    let cursor = cursor.jump(run.end()).skip_whitespace().char(';')?;

    Some((
        DataStep {
            outputs,
            inputs,
            header: header.to_string(),
            body: body.to_string(),
            options,
        },
        cursor,
    ))
}

fn step_options(cursor: Cursor<'_>) -> Option<(Vec<DataArg>, Cursor<'_>)> {
    let cursor = cursor.skip_whitespace().char('/')?.skip_whitespace();
    Some(separated(cursor, data_arg, Cursor::whitespace))
}

/// Text up to the first `set`/`merge`, provided the step has not ended first.
fn header(cursor: Cursor<'_>) -> Option<(&str, Cursor<'_>)> {
    let set = cursor.find(&SET_OR_MERGE)?;
    if cursor.find_before(&RUN, set.start()).is_some() {
        return None;
    }
    let text = &cursor.source()[cursor.offset()..set.start()];
    Some((text, cursor.jump(set.start())))
}

fn set_statement(cursor: Cursor<'_>) -> Option<(Vec<DataObjectRef>, Cursor<'_>)> {
    let cursor = cursor.skip_whitespace();
    let cursor = cursor
        .word("set")
        .or_else(|| cursor.word("merge"))?
        .skip_whitespace();
    let (inputs, cursor) = data_line(cursor);
    let cursor = cursor.skip_whitespace().char(';')?;
    Some((inputs, cursor))
}

/// `proc <name> data=<input> [out=<output> ...] ... run;|quit;`
///
/// Only `data=` and `out=` before the step terminator are read. `proc sql`
/// is left to the sql block rule.
pub fn procedure(cursor: Cursor<'_>) -> Option<(Procedure, Cursor<'_>)> {
    let cursor = cursor.word("proc")?.whitespace()?;
    let (kind, cursor) = name(cursor)?;
    if kind.eq_ignore_ascii_case("sql") {
        return None;
    }
    let cursor = cursor.whitespace()?;

    let end = cursor.find(&STEP_END)?;
    let data = cursor.find_before(&DATA_OPTION, end.start())?;
    let (input, mut cursor) = data_object(cursor.jump(data.end()))?;

    let mut outputs = Vec::new();
    while let Some(out) = cursor.find_before(&OUT_OPTION, end.start()) {
        let Some((output, next)) = data_object(cursor.jump(out.end())) else {
            break;
        };
        outputs.push(output);
        cursor = next;
    }

    let end = cursor.find(&STEP_END)?;
    Some((
        Procedure {
            kind: kind.to_lowercase(),
            inputs: vec![input],
            outputs,
        },
        cursor.jump(end.end()),
    ))
}

#[test]
fn test_header_ignores_set_after_run() {
    let (step, rest) = data_step(Cursor::new("data a; x = 1; run; data b; set c; run;")).unwrap();
    assert!(step.inputs.is_empty());
    assert_eq!(step.header, "");
    assert_eq!(step.body, " x = 1; ");
    assert_eq!(rest.rest(), " data b; set c; run;");
}

#[test]
fn test_procedure_rejects_sql() {
    assert!(procedure(Cursor::new("proc sql; quit;")).is_none());
}
