//! Grammar rules for SAS constructs.
//!
//! Every rule is a plain function from a [`Cursor`] to the parsed value and the
//! cursor after it, or `None` when the construct does not start here. Rules
//! never mutate shared state; the compiled patterns they use are immutable
//! statics, so a [`Grammar`] can be built once and reused for any number of
//! files.
//!
//! A [`Grammar`] is an ordered list of top-level rules. The first rule that
//! matches wins, which makes rule order significant: `%let` must come before
//! macro calls, comments before data steps, and so on.

mod datasets;
mod macros;
mod sql;
mod statements;
mod steps;

use std::ops::Range;

use crate::ast::Node;
use crate::lexer::{self, Cursor};

pub use datasets::{data_arg, data_line, data_object, data_options};
pub use macros::{argument_list, macro_argument, macro_call, macro_end, macro_start};
pub use sql::{create_table, sql_block, unparsed_sql};
pub use statements::{include, libname, macro_variable_def, newline};
pub use steps::{data_step, procedure};

/// Result of a successful top-level rule.
///
/// Most rules yield one node covering the whole match; a `proc sql` block
/// yields one node per inner statement, each with its own byte range.
#[derive(Debug)]
pub struct Match<'a> {
    pub items: Vec<(Node, Range<usize>)>,
    pub rest: Cursor<'a>,
}

pub type Rule = for<'a> fn(Cursor<'a>) -> Option<Match<'a>>;

/// Ordered alternation of top-level rules.
#[derive(Clone)]
pub struct Grammar {
    rules: Vec<(&'static str, Rule)>,
}

impl Grammar {
    pub fn new(rules: Vec<(&'static str, Rule)>) -> Self {
        Grammar { rules }
    }

    /// Every construct, macros included.
    pub fn full() -> Self {
        Grammar::new(vec![
            ("newline", newline_rule as Rule),
            ("macro variable definition", macro_variable_def_rule as Rule),
            ("comment", comment_rule as Rule),
            ("data step", data_step_rule as Rule),
            ("procedure", procedure_rule as Rule),
            ("sql block", sql_block as Rule),
            ("libname", libname_rule as Rule),
            ("include", include_rule as Rule),
            ("macro start", macro_start_rule as Rule),
            ("macro end", macro_end_rule as Rule),
            ("macro call", macro_call_rule as Rule),
        ])
    }

    /// Statements only; `%macro`, `%mend` and macro calls are skipped as
    /// unrecognised input.
    pub fn without_macros() -> Self {
        Grammar::new(vec![
            ("newline", newline_rule as Rule),
            ("macro variable definition", macro_variable_def_rule as Rule),
            ("comment", comment_rule as Rule),
            ("data step", data_step_rule as Rule),
            ("procedure", procedure_rule as Rule),
            ("sql block", sql_block as Rule),
            ("libname", libname_rule as Rule),
            ("include", include_rule as Rule),
        ])
    }

    pub fn rule_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.rules.iter().map(|(name, _)| *name)
    }

    /// Try each rule in order at `cursor`. Matches that consume nothing are
    /// ignored so callers always make progress.
    pub fn apply<'a>(&self, cursor: Cursor<'a>) -> Option<Match<'a>> {
        self.rules.iter().find_map(|(_, rule)| {
            rule(cursor).filter(|found| found.rest.offset() > cursor.offset())
        })
    }
}

impl Default for Grammar {
    fn default() -> Self {
        Grammar::full()
    }
}

impl std::fmt::Debug for Grammar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.rule_names()).finish()
    }
}

fn single<'a, T>(
    start: Cursor<'a>,
    parsed: Option<(T, Cursor<'a>)>,
    wrap: fn(T) -> Node,
) -> Option<Match<'a>> {
    let (value, rest) = parsed?;
    Some(Match {
        items: vec![(wrap(value), start.offset()..rest.offset())],
        rest,
    })
}

fn newline_rule(cursor: Cursor<'_>) -> Option<Match<'_>> {
    single(cursor, newline(cursor), |()| Node::Newline)
}

fn macro_variable_def_rule(cursor: Cursor<'_>) -> Option<Match<'_>> {
    single(cursor, macro_variable_def(cursor), Node::MacroVariableDef)
}

fn comment_rule(cursor: Cursor<'_>) -> Option<Match<'_>> {
    single(cursor, lexer::comment(cursor), Node::Comment)
}

fn data_step_rule(cursor: Cursor<'_>) -> Option<Match<'_>> {
    single(cursor, data_step(cursor), Node::DataStep)
}

fn procedure_rule(cursor: Cursor<'_>) -> Option<Match<'_>> {
    single(cursor, procedure(cursor), Node::Procedure)
}

fn libname_rule(cursor: Cursor<'_>) -> Option<Match<'_>> {
    single(cursor, libname(cursor), Node::LibraryBinding)
}

fn include_rule(cursor: Cursor<'_>) -> Option<Match<'_>> {
    single(cursor, include(cursor), Node::Include)
}

fn macro_start_rule(cursor: Cursor<'_>) -> Option<Match<'_>> {
    single(cursor, macro_start(cursor), Node::MacroStart)
}

fn macro_end_rule(cursor: Cursor<'_>) -> Option<Match<'_>> {
    single(cursor, macro_end(cursor), |()| Node::MacroEnd)
}

fn macro_call_rule(cursor: Cursor<'_>) -> Option<Match<'_>> {
    single(cursor, macro_call(cursor), Node::MacroCall)
}

/// Zero or more items separated by `separator`.
///
/// A separator that is not followed by an item is left unconsumed.
pub(crate) fn separated<'a, T>(
    cursor: Cursor<'a>,
    item: impl Fn(Cursor<'a>) -> Option<(T, Cursor<'a>)>,
    separator: impl Fn(Cursor<'a>) -> Option<Cursor<'a>>,
) -> (Vec<T>, Cursor<'a>) {
    let mut items = Vec::new();
    let Some((first, mut cursor)) = item(cursor) else {
        return (items, cursor);
    };
    items.push(first);
    while let Some((next, after)) = separator(cursor).and_then(&item) {
        if after.offset() == cursor.offset() {
            break;
        }
        items.push(next);
        cursor = after;
    }
    (items, cursor)
}

/// `,` with optional whitespace on either side.
pub(crate) fn comma(cursor: Cursor<'_>) -> Option<Cursor<'_>> {
    Some(cursor.skip_whitespace().char(',')?.skip_whitespace())
}

/// Keep the parsed value when present, otherwise stay at `cursor`.
pub(crate) fn optional<'a, T>(
    cursor: Cursor<'a>,
    parsed: Option<(T, Cursor<'a>)>,
) -> (Option<T>, Cursor<'a>) {
    match parsed {
        Some((value, next)) => (Some(value), next),
        None => (None, cursor),
    }
}
