use std::sync::LazyLock;

use regex::Regex;

use crate::ast::{DataArg, MacroArgument, MacroCall, MacroStart};
use crate::lexer::{Cursor, comment, macro_variable, name_path, quoted_string};
use crate::parser::datasets::macro_option;
use crate::parser::{comma, optional, separated};

static MACRO_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?i)%mend[^\n;]*;").expect("macro end pattern"));

/// Macro language statements that look like calls but are not user macros.
const RESERVED: &[&str] = &[
    "let", "macro", "mend", "include", "put", "global", "local", "if", "then", "else", "do",
    "end", "to", "by", "goto", "return", "abort", "symdel", "sysexec",
];

/// `name[=default] [/* doc */]`
pub fn macro_argument(cursor: Cursor<'_>) -> Option<(MacroArgument, Cursor<'_>)> {
    let (name, cursor) = name_path(cursor)?;
    let cursor = cursor.skip_whitespace();
    let (default, cursor) = match cursor.char('=') {
        Some(next) => {
            let (text, next) = default_value(next.skip_whitespace());
            (Some(text.to_string()), next)
        }
        None => (None, cursor),
    };
    let cursor = cursor.skip_whitespace();
    let (doc, cursor) = optional(cursor, comment(cursor));
    Some((MacroArgument { name, default, doc }, cursor))
}

fn default_value(start: Cursor<'_>) -> (&str, Cursor<'_>) {
    let mut cursor = start;
    while let Some(next) = default_literal(cursor)
        .or_else(|| macro_variable(cursor).map(|(_, next)| next))
        .or_else(|| quoted_string(cursor).map(|(_, next)| next))
    {
        cursor = next;
    }
    (cursor.since(start), cursor)
}

/// Run of name characters plus `@.:` and path separators. A slash that opens
/// a comment ends the run.
fn default_literal(cursor: Cursor<'_>) -> Option<Cursor<'_>> {
    let mut chars = cursor.rest().char_indices().peekable();
    let mut len = 0;
    while let Some((at, ch)) = chars.next() {
        let allowed = match ch {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '_' | '-' | '@' | '.' | ':' => true,
            '/' | '\\' => chars.peek().map(|&(_, next)| next) != Some('*'),
            _ => false,
        };
        if !allowed {
            break;
        }
        len = at + ch.len_utf8();
    }
    (len > 0).then(|| cursor.jump(cursor.offset() + len))
}

/// `( argument, argument ... )`
pub fn argument_list(cursor: Cursor<'_>) -> Option<(Vec<MacroArgument>, Cursor<'_>)> {
    let cursor = cursor.char('(')?.skip_whitespace();
    let (arguments, cursor) = separated(cursor, macro_argument, comma);
    let cursor = cursor.skip_whitespace().char(')')?;
    Some((arguments, cursor))
}

fn macro_options(cursor: Cursor<'_>) -> Option<(Vec<DataArg>, Cursor<'_>)> {
    let cursor = cursor.skip_whitespace().char('/')?.skip_whitespace();
    Some(separated(cursor, macro_option, Cursor::whitespace))
}

/// `%macro name[(arguments)] [/ options];`
pub fn macro_start(cursor: Cursor<'_>) -> Option<(MacroStart, Cursor<'_>)> {
    let cursor = cursor.keyword("%macro")?.whitespace()?;
    let (name, cursor) = name_path(cursor)?;
    let (arguments, cursor) = optional(cursor, argument_list(cursor.skip_whitespace()));
    let (options, cursor) = optional(cursor, macro_options(cursor));
    let cursor = cursor.skip_whitespace().char(';')?;
    Some((
        MacroStart {
            name,
            arguments,
            options,
        },
        cursor,
    ))
}

/// `%mend[ name];`
pub fn macro_end(cursor: Cursor<'_>) -> Option<((), Cursor<'_>)> {
    cursor.matching(&MACRO_END).map(|(_, next)| ((), next))
}

/// `%name[(arguments)];`
pub fn macro_call(cursor: Cursor<'_>) -> Option<(MacroCall, Cursor<'_>)> {
    let cursor = cursor.char('%')?;
    let (name, cursor) = name_path(cursor)?;
    if !name.is_dynamic() {
        let text = name.to_string();
        if RESERVED.iter().any(|word| text.eq_ignore_ascii_case(word)) {
            return None;
        }
    }
    let (arguments, cursor) = optional(cursor, argument_list(cursor.skip_whitespace()));
    let cursor = cursor.skip_whitespace().char(';')?;
    Some((MacroCall { name, arguments }, cursor))
}

#[test]
fn test_default_stops_before_comment() {
    let (argument, rest) = macro_argument(Cursor::new("a=1/*Docs*/)")).unwrap();
    assert_eq!(argument.default.as_deref(), Some("1"));
    assert_eq!(argument.doc.map(|doc| doc.text), Some("Docs".to_string()));
    assert_eq!(rest.rest(), ")");
}

#[test]
fn test_reserved_names_are_not_calls() {
    assert!(macro_call(Cursor::new("%put hello;")).is_none());
    assert!(macro_call(Cursor::new("%do;")).is_none());
    assert!(macro_call(Cursor::new("%report;")).is_some());
}
