//! Lexical primitives over an immutable source buffer.
//!
//! SAS has no token grammar worth the name, so instead of a token stream the
//! parser works on a [`Cursor`]: a copyable position in the source that
//! primitives advance and rules thread through their results. Backtracking is
//! simply keeping the old cursor.

use std::sync::LazyLock;

use regex::{Match, Regex};
use serde::Serialize;

use crate::ast::{Comment, MacroVariableRef, NamePath, NameSegment};

static NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_\-]+").expect("name pattern"));
static MACRO_VARIABLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^&(?:[A-Za-z0-9_\-]+\.?|&[A-Za-z0-9_\-]+\.?&[A-Za-z0-9_\-]+\.?)")
        .expect("macro variable pattern")
});
static QUOTED_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^['"][^'"]+['"]"#).expect("quoted path pattern"));
static QUOTED_STRING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^['"][^'"]*['"]"#).expect("quoted string pattern"));
static INLINE_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\*[^;]+;").expect("inline comment pattern"));
static BLOCK_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^/\*(?s:.+?)\*/").expect("block comment pattern"));
static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s+").expect("whitespace pattern"));

/// Line/column location. Lines start at 1, columns at 0 and count chars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub const START: Position = Position { line: 1, column: 0 };

    pub fn new(line: usize, column: usize) -> Self {
        Position { line, column }
    }

    pub fn advance_char(self, ch: char) -> Self {
        if ch == '\n' {
            Position {
                line: self.line + 1,
                column: 0,
            }
        } else {
            Position {
                column: self.column + 1,
                ..self
            }
        }
    }

    /// Position reached after reading `text` from here.
    pub fn advance(self, text: &str) -> Self {
        text.chars().fold(self, Position::advance_char)
    }
}

impl Default for Position {
    fn default() -> Self {
        Position::START
    }
}

/// Source region of a node, `start` inclusive and `end` exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        Span { start, end }
    }

    /// Span running from the start of `first` to the end of `last`.
    pub fn covering(first: Span, last: Span) -> Self {
        Span {
            start: first.start,
            end: last.end,
        }
    }
}

/// A read position in the source buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor<'a> {
    source: &'a str,
    offset: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(source: &'a str) -> Self {
        Cursor { source, offset: 0 }
    }

    pub fn source(&self) -> &'a str {
        self.source
    }

    /// Byte offset into the source.
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn rest(&self) -> &'a str {
        &self.source[self.offset..]
    }

    pub fn is_eof(&self) -> bool {
        self.offset >= self.source.len()
    }

    pub fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// Text between an earlier cursor and this one.
    pub fn since(&self, earlier: Cursor<'a>) -> &'a str {
        &self.source[earlier.offset..self.offset]
    }

    /// Move to an absolute byte offset at or after the current one.
    pub fn jump(self, offset: usize) -> Self {
        debug_assert!(offset >= self.offset && self.source.is_char_boundary(offset));
        Cursor { offset, ..self }
    }

    pub fn bump_char(self) -> Option<(char, Self)> {
        let ch = self.peek()?;
        Some((ch, self.jump(self.offset + ch.len_utf8())))
    }

    pub fn char(self, expected: char) -> Option<Self> {
        match self.bump_char() {
            Some((ch, next)) if ch == expected => Some(next),
            _ => None,
        }
    }

    /// ASCII case-insensitive literal.
    pub fn keyword(self, keyword: &str) -> Option<Self> {
        let head = self.rest().get(..keyword.len())?;
        head.eq_ignore_ascii_case(keyword)
            .then(|| self.jump(self.offset + keyword.len()))
    }

    /// Keyword that is not glued to a word on either side.
    pub fn word(self, keyword: &str) -> Option<Self> {
        if self.follows_word_char() {
            return None;
        }
        let next = self.keyword(keyword)?;
        (!next.precedes_word_char()).then_some(next)
    }

    pub fn follows_word_char(&self) -> bool {
        self.source[..self.offset]
            .chars()
            .next_back()
            .is_some_and(is_word_char)
    }

    pub fn precedes_word_char(&self) -> bool {
        self.peek().is_some_and(is_word_char)
    }

    /// Match a `^`-anchored pattern at the cursor.
    pub fn matching(self, pattern: &Regex) -> Option<(&'a str, Self)> {
        let found = pattern.find(self.rest())?;
        if found.start() != 0 {
            return None;
        }
        Some((found.as_str(), self.jump(self.offset + found.end())))
    }

    /// One or more whitespace characters.
    pub fn whitespace(self) -> Option<Self> {
        self.matching(&WHITESPACE).map(|(_, next)| next)
    }

    pub fn skip_whitespace(self) -> Self {
        self.whitespace().unwrap_or(self)
    }

    /// First match at or after the cursor, with absolute offsets.
    ///
    /// Word boundaries see the text before the cursor.
    pub fn find(&self, pattern: &Regex) -> Option<Match<'a>> {
        pattern.find_at(self.source, self.offset)
    }

    /// Like [`Cursor::find`], but only matches starting before `limit`.
    pub fn find_before(&self, pattern: &Regex, limit: usize) -> Option<Match<'a>> {
        self.find(pattern).filter(|found| found.start() < limit)
    }
}

fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

/// `[A-Za-z0-9_-]+`
pub fn name(cursor: Cursor<'_>) -> Option<(&str, Cursor<'_>)> {
    cursor.matching(&NAME)
}

/// `&name`, `&name.` or the double form `&&a&b.`
pub fn macro_variable(cursor: Cursor<'_>) -> Option<(MacroVariableRef, Cursor<'_>)> {
    let (raw, next) = cursor.matching(&MACRO_VARIABLE)?;
    Some((MacroVariableRef::new(raw), next))
}

/// Non-empty run of names and macro variable references.
pub fn name_path(cursor: Cursor<'_>) -> Option<(NamePath, Cursor<'_>)> {
    let mut segments = Vec::new();
    let mut cursor = cursor;
    loop {
        if let Some((text, next)) = name(cursor) {
            segments.push(NameSegment::Literal(text.to_string()));
            cursor = next;
        } else if let Some((var, next)) = macro_variable(cursor) {
            segments.push(NameSegment::Variable(var));
            cursor = next;
        } else {
            break;
        }
    }
    if segments.is_empty() {
        None
    } else {
        Some((NamePath::new(segments), cursor))
    }
}

/// Quoted file path; returns the text between the quotes.
pub fn quoted_path(cursor: Cursor<'_>) -> Option<(&str, Cursor<'_>)> {
    let (quoted, next) = cursor.matching(&QUOTED_PATH)?;
    Some((&quoted[1..quoted.len() - 1], next))
}

/// Quoted string including its quotes.
pub fn quoted_string(cursor: Cursor<'_>) -> Option<(&str, Cursor<'_>)> {
    cursor.matching(&QUOTED_STRING)
}

/// `* text;` or `/* text */`
pub fn comment(cursor: Cursor<'_>) -> Option<(Comment, Cursor<'_>)> {
    if let Some((raw, next)) = cursor.matching(&INLINE_COMMENT) {
        let text = raw[1..raw.len() - 1].to_string();
        return Some((Comment { text }, next));
    }
    let (raw, next) = cursor.matching(&BLOCK_COMMENT)?;
    let text = raw[2..raw.len() - 2].to_string();
    Some((Comment { text }, next))
}

#[test]
fn test_position_advance() {
    let pos = Position::START.advance("ab\ncd");
    assert_eq!(pos, Position::new(2, 2));
    assert_eq!(pos.advance("\n"), Position::new(3, 0));
}

#[test]
fn test_word_boundaries() {
    let source = "metadata data";
    let inside = Cursor::new(source).jump(4);
    assert!(inside.word("data").is_none());
    let standalone = Cursor::new(source).jump(9);
    assert_eq!(standalone.word("data").map(|c| c.offset()), Some(13));
    assert!(Cursor::new("dataset").word("data").is_none());
}

#[test]
fn test_find_sees_preceding_context() {
    let pattern = Regex::new(r"\bset\b").unwrap();
    let cursor = Cursor::new("reset set").jump(2);
    assert_eq!(cursor.find(&pattern).map(|m| m.start()), Some(6));
}
