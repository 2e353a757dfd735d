use std::sync::LazyLock;

use regex::Regex;

use crate::ast::{DataArg, DataObjectRef, NamePath};
use crate::lexer::{Cursor, name_path, quoted_path};
use crate::parser::{optional, separated};

static PAREN_SETTING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\([^);]*\)").expect("paren setting pattern"));
static NEXT_OPTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+\w+\s*=").expect("next option pattern"));

fn option_name(cursor: Cursor<'_>) -> Option<(NamePath, Cursor<'_>)> {
    let (option, cursor) = name_path(cursor)?;
    let cursor = cursor.skip_whitespace().char('=')?.skip_whitespace();
    Some((option, cursor))
}

/// `where=(a = 1)`
fn parenthesised_arg(cursor: Cursor<'_>) -> Option<(DataArg, Cursor<'_>)> {
    let (option, cursor) = option_name(cursor)?;
    let (setting, cursor) = cursor.matching(&PAREN_SETTING)?;
    Some((
        DataArg {
            option,
            setting: Some(setting.to_string()),
        },
        cursor,
    ))
}

/// `file="out.csv"`
fn quoted_arg(cursor: Cursor<'_>) -> Option<(DataArg, Cursor<'_>)> {
    let (option, cursor) = option_name(cursor)?;
    let (path, cursor) = quoted_path(cursor)?;
    Some((
        DataArg {
            option,
            setting: Some(path.to_string()),
        },
        cursor,
    ))
}

/// `keep=a b c`, running up to the next `name=`, a closing paren or `;`.
fn bare_arg(cursor: Cursor<'_>) -> Option<(DataArg, Cursor<'_>)> {
    let (option, cursor) = option_name(cursor)?;
    let rest = cursor.rest();
    let bound = rest.find(|ch: char| ch == ')' || ch == ';');
    let segment = &rest[..bound.unwrap_or(rest.len())];
    let len = match NEXT_OPTION.find(segment) {
        Some(next) => next.start(),
        None => bound?,
    };
    let setting = &rest[..len];
    Some((
        DataArg {
            option,
            setting: Some(setting.to_string()),
        },
        cursor.jump(cursor.offset() + len),
    ))
}

fn flag_arg(cursor: Cursor<'_>) -> Option<(DataArg, Cursor<'_>)> {
    let (option, cursor) = name_path(cursor)?;
    Some((
        DataArg {
            option,
            setting: None,
        },
        cursor,
    ))
}

/// One dataset option: parenthesised, quoted, bare or a flag, tried in that order.
pub fn data_arg(cursor: Cursor<'_>) -> Option<(DataArg, Cursor<'_>)> {
    parenthesised_arg(cursor)
        .or_else(|| quoted_arg(cursor))
        .or_else(|| bare_arg(cursor))
        .or_else(|| flag_arg(cursor))
}

/// Option after the `/` of a `%macro` statement. Bare settings are not allowed.
pub(crate) fn macro_option(cursor: Cursor<'_>) -> Option<(DataArg, Cursor<'_>)> {
    parenthesised_arg(cursor)
        .or_else(|| quoted_arg(cursor))
        .or_else(|| flag_arg(cursor))
}

/// `( arg arg ... )`
pub fn data_options(cursor: Cursor<'_>) -> Option<(Vec<DataArg>, Cursor<'_>)> {
    let cursor = cursor.char('(')?.skip_whitespace();
    let (args, cursor) = separated(cursor, data_arg, Cursor::whitespace);
    let cursor = cursor.skip_whitespace().char(')')?;
    Some((args, cursor))
}

/// `[library.]dataset[(options)]`
pub fn data_object(cursor: Cursor<'_>) -> Option<(DataObjectRef, Cursor<'_>)> {
    let qualified = name_path(cursor).and_then(|(library, next)| Some((library, next.char('.')?)));
    let (library, cursor) = optional(cursor, qualified);
    let (dataset, cursor) = cursor
        .char('.')
        .and_then(name_path)
        .or_else(|| name_path(cursor))?;
    let (options, cursor) = optional(cursor, data_options(cursor.skip_whitespace()));
    Some((
        DataObjectRef {
            library,
            dataset,
            options,
        },
        cursor,
    ))
}

/// Whitespace separated dataset references; may be empty.
pub fn data_line(cursor: Cursor<'_>) -> (Vec<DataObjectRef>, Cursor<'_>) {
    separated(cursor, data_object, Cursor::whitespace)
}

#[test]
fn test_bare_arg_stops_at_next_option() {
    let (arg, rest) = data_arg(Cursor::new("keep=a b rename=x)")).unwrap();
    assert_eq!(arg.setting.as_deref(), Some("a b"));
    assert_eq!(rest.rest(), " rename=x)");
}

#[test]
fn test_bare_arg_does_not_cross_closing_paren() {
    let (arg, rest) = data_arg(Cursor::new("keep=x y) out=b;")).unwrap();
    assert_eq!(arg.setting.as_deref(), Some("x y"));
    assert_eq!(rest.rest(), ") out=b;");
}

#[test]
fn test_macro_variable_alone_is_a_dataset() {
    use crate::ast::{MacroVariableRef, NameSegment};

    let (object, _) = data_object(Cursor::new("&test.test")).unwrap();
    assert_eq!(object.library, None);
    assert_eq!(
        object.dataset.segments(),
        &[
            NameSegment::Variable(MacroVariableRef::new("&test.")),
            NameSegment::Literal("test".to_string()),
        ]
    );
}
