use std::sync::LazyLock;

use regex::Regex;

use crate::ast::{Include, LibraryBinding, LibraryTarget, MacroVariableDef};
use crate::lexer::{Cursor, name_path, quoted_path};

static LET_VALUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^;]+").expect("let value pattern"));

/// `\n` or `\r\n`
pub fn newline(cursor: Cursor<'_>) -> Option<((), Cursor<'_>)> {
    cursor
        .char('\n')
        .or_else(|| cursor.char('\r')?.char('\n'))
        .map(|next| ((), next))
}

/// `%let name = value;`
pub fn macro_variable_def(cursor: Cursor<'_>) -> Option<(MacroVariableDef, Cursor<'_>)> {
    let cursor = cursor.keyword("%let")?.whitespace()?;
    let (variable, cursor) = name_path(cursor)?;
    let cursor = cursor.skip_whitespace().char('=')?;
    let (value, cursor) = match cursor.matching(&LET_VALUE) {
        Some((value, next)) => (Some(value.to_string()), next),
        None => (None, cursor),
    };
    let cursor = cursor.char(';')?;
    Some((MacroVariableDef { variable, value }, cursor))
}

/// `libname alias "path";` or `libname alias (other);`
pub fn libname(cursor: Cursor<'_>) -> Option<(LibraryBinding, Cursor<'_>)> {
    let cursor = cursor.word("libname")?.whitespace()?;
    let (alias, cursor) = name_path(cursor)?;
    let cursor = cursor.whitespace()?;
    let (target, cursor) = path_target(cursor).or_else(|| pointer_target(cursor))?;
    Some((
        LibraryBinding {
            alias,
            target,
            resolved: None,
        },
        cursor,
    ))
}

fn path_target(cursor: Cursor<'_>) -> Option<(LibraryTarget, Cursor<'_>)> {
    let (path, cursor) = quoted_path(cursor)?;
    let cursor = cursor.skip_whitespace().char(';')?;
    Some((LibraryTarget::Path(path.to_string()), cursor))
}

fn pointer_target(cursor: Cursor<'_>) -> Option<(LibraryTarget, Cursor<'_>)> {
    let cursor = cursor.char('(')?.skip_whitespace();
    let (alias, cursor) = name_path(cursor)?;
    let cursor = cursor
        .skip_whitespace()
        .char(')')?
        .skip_whitespace()
        .char(';')?;
    Some((LibraryTarget::Pointer(alias), cursor))
}

/// `%include "path";`
pub fn include(cursor: Cursor<'_>) -> Option<(Include, Cursor<'_>)> {
    let cursor = cursor.keyword("%include")?.whitespace()?;
    let (path, cursor) = quoted_path(cursor)?;
    let cursor = cursor.skip_whitespace().char(';')?;
    Some((
        Include {
            path: path.to_string(),
            resolved: None,
        },
        cursor,
    ))
}
