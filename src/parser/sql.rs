use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

use crate::ast::{Node, Procedure, UnparsedSqlStatement};
use crate::lexer::Cursor;
use crate::parser::{Match, comma, data_object, separated};

static FROM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bfrom\s+").expect("from pattern"));
static QUIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bquit\s*;").expect("quit pattern"));

/// `proc sql; statements... quit;`
///
/// Each inner statement becomes its own node. `create table` statements are
/// read for lineage, everything else is kept as text.
pub fn sql_block(cursor: Cursor<'_>) -> Option<Match<'_>> {
    let cursor = cursor.word("proc")?.whitespace()?.word("sql")?;
    let semicolon = cursor.rest().find(';')?;
    let cursor = cursor.jump(cursor.offset() + semicolon + 1).skip_whitespace();

    let (items, cursor) = separated(cursor, sql_statement, |c| Some(c.skip_whitespace()));

    let quit = cursor.find(&QUIT)?;
    Some(Match {
        items,
        rest: cursor.jump(quit.end()),
    })
}

fn sql_statement(cursor: Cursor<'_>) -> Option<((Node, Range<usize>), Cursor<'_>)> {
    let (node, next) = create_table(cursor)
        .map(|(procedure, next)| (Node::Procedure(procedure), next))
        .or_else(|| {
            unparsed_sql(cursor).map(|(statement, next)| (Node::UnparsedSqlStatement(statement), next))
        })?;
    Some(((node, cursor.offset()..next.offset()), next))
}

/// `create table outputs as select ... from inputs ...;`
///
/// Every `from` clause of the statement contributes inputs, so joins and
/// subqueries are picked up as well.
pub fn create_table(cursor: Cursor<'_>) -> Option<(Procedure, Cursor<'_>)> {
    let cursor = cursor
        .word("create")?
        .whitespace()?
        .word("table")?
        .skip_whitespace();
    let (outputs, cursor) = separated(cursor, data_object, comma);
    let mut cursor = cursor.skip_whitespace().word("as")?;

    let mut inputs = Vec::new();
    loop {
        let limit = statement_end(cursor);
        let Some(from) = cursor.find_before(&FROM, limit) else {
            break;
        };
        let (sources, next) = separated(cursor.jump(from.end()), data_object, comma);
        inputs.extend(sources);
        cursor = next;
    }

    let semicolon = cursor.rest().find(';')?;
    Some((
        Procedure {
            kind: "sql".to_string(),
            inputs,
            outputs,
        },
        cursor.jump(cursor.offset() + semicolon + 1),
    ))
}

fn statement_end(cursor: Cursor<'_>) -> usize {
    cursor
        .rest()
        .find(';')
        .map_or(cursor.source().len(), |at| cursor.offset() + at)
}

/// Any other statement up to and including its `;`. Never matches `quit;`.
pub fn unparsed_sql(cursor: Cursor<'_>) -> Option<(UnparsedSqlStatement, Cursor<'_>)> {
    let semicolon = cursor.rest().find(';')?;
    let text = &cursor.rest()[..=semicolon];
    let statement = text[..semicolon].trim_end();
    let is_quit = statement
        .len()
        .checked_sub(4)
        .and_then(|at| statement.get(at..))
        .is_some_and(|tail| tail.eq_ignore_ascii_case("quit"));
    if is_quit {
        return None;
    }
    Some((
        UnparsedSqlStatement {
            text: text.to_string(),
        },
        cursor.jump(cursor.offset() + semicolon + 1),
    ))
}

#[test]
fn test_create_table_reads_every_from_clause() {
    let source = "create table out as select * from a, b.c where id in (select id from d);";
    let (procedure, rest) = create_table(Cursor::new(source)).unwrap();
    let inputs: Vec<String> = procedure.inputs.iter().map(|i| i.name()).collect();
    assert_eq!(inputs, vec!["work.a", "b.c", "work.d"]);
    assert!(rest.is_eof());
}
