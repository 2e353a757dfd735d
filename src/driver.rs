//! Resilient parse loop.
//!
//! The driver walks the source applying the [`Grammar`] at each position. When
//! no rule matches, it skips a single character and tries again, so malformed
//! or unsupported code never stops the parse; it only lowers coverage.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use tracing::{debug, trace};

use crate::ast::SpannedNode;
use crate::lexer::{Cursor, Position, Span};
use crate::parser::Grammar;

/// Character counts gathered during a parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ParseStats {
    /// Characters in the source
    pub total: usize,
    /// Characters consumed by matched rules
    pub matched: usize,
    /// Characters skipped because no rule matched
    pub skipped: usize,
    /// Number of successful rule applications
    pub matches: usize,
}

impl ParseStats {
    /// Share of the source consumed by rules, in `[0, 1]`.
    ///
    /// Empty input counts as fully parsed.
    pub fn coverage(&self) -> Decimal {
        if self.total == 0 {
            return Decimal::ONE;
        }
        Decimal::ONE - Decimal::from(self.skipped) / Decimal::from(self.total)
    }

    /// Coverage as a percentage with two decimals, e.g. `"87.50%"`.
    pub fn parsed_rate(&self) -> String {
        let mut percent = (self.coverage() * Decimal::ONE_HUNDRED)
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        percent.rescale(2);
        format!("{}%", percent)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParseOutput {
    pub nodes: Vec<SpannedNode>,
    pub stats: ParseStats,
}

/// Applies a grammar to a whole source text.
///
/// # Examples
///
/// ```
/// use sasdocs::driver::Driver;
/// use sasdocs::parser::Grammar;
///
/// let grammar = Grammar::full();
/// let output = Driver::new(&grammar).run("%let a = 1;\n");
/// assert_eq!(output.nodes.len(), 2);
/// assert_eq!(output.stats.parsed_rate(), "100.00%");
/// ```
#[derive(Debug, Clone)]
pub struct Driver<'g> {
    grammar: &'g Grammar,
    source_name: Option<String>,
}

impl<'g> Driver<'g> {
    pub fn new(grammar: &'g Grammar) -> Self {
        Driver {
            grammar,
            source_name: None,
        }
    }

    /// Name used in log records, usually the file path.
    pub fn with_source_name(mut self, name: impl Into<String>) -> Self {
        self.source_name = Some(name.into());
        self
    }

    /// Parse `text` to the end, never failing.
    ///
    /// Nodes are returned in source order with non-decreasing spans. Positions
    /// count lines from 1 and columns from 0, in characters.
    pub fn run(&self, text: &str) -> ParseOutput {
        let source = self.source_name.as_deref().unwrap_or("<input>");
        let mut nodes = Vec::new();
        let mut stats = ParseStats {
            total: text.chars().count(),
            ..ParseStats::default()
        };

        let mut cursor = Cursor::new(text);
        // Position at `scanned`, the last byte offset folded into line/column.
        let mut position = Position::START;
        let mut scanned = 0;
        let mut skip_start: Option<Position> = None;

        while !cursor.is_eof() {
            match self.grammar.apply(cursor) {
                Some(found) => {
                    if let Some(from) = skip_start.take() {
                        trace!(source, line = from.line, column = from.column, "skipped unrecognised input");
                    }
                    for (node, range) in found.items {
                        let start = position.advance(&text[scanned..range.start]);
                        let end = start.advance(&text[range.clone()]);
                        position = end;
                        scanned = range.end;
                        nodes.push(SpannedNode::new(node, Span::new(start, end)));
                    }
                    let rest = found.rest.offset();
                    position = position.advance(&text[scanned..rest]);
                    scanned = rest;
                    stats.matched += found.rest.since(cursor).chars().count();
                    stats.matches += 1;
                    cursor = found.rest;
                }
                None => {
                    let Some((ch, next)) = cursor.bump_char() else {
                        break;
                    };
                    skip_start.get_or_insert(position);
                    position = position.advance_char(ch);
                    scanned = next.offset();
                    stats.skipped += 1;
                    cursor = next;
                }
            }
        }
        if let Some(from) = skip_start {
            trace!(source, line = from.line, column = from.column, "skipped unrecognised input");
        }

        debug!(
            source,
            nodes = nodes.len(),
            skipped = stats.skipped,
            total = stats.total,
            rate = %stats.parsed_rate(),
            "parsed source"
        );
        ParseOutput { nodes, stats }
    }
}

#[test]
fn test_parsed_rate_rounds_to_two_places() {
    let stats = ParseStats {
        total: 3,
        matched: 2,
        skipped: 1,
        matches: 1,
    };
    assert_eq!(stats.parsed_rate(), "66.67%");
    assert_eq!(ParseStats::default().parsed_rate(), "100.00%");
}
