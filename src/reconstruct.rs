//! Folds the flat driver output into a tree of macros.
//!
//! The driver emits `%macro` and `%mend` as separate marker nodes. This pass
//! pairs them up, nests everything in between, and drops newline markers.
//!
//! ```text
//! [MacroStart(a), DataStep, MacroStart(b), Comment, MacroEnd, MacroEnd]
//!   -> [Macro(a) { DataStep, Macro(b) { Comment } }]
//! ```

use crate::ast::{Macro, MacroStart, Node, SpannedNode};
use crate::lexer::Span;

/// Build the macro tree from a flat node sequence.
///
/// A `%mend` with no open macro is kept as a stray [`Node::MacroEnd`]. A
/// `%macro` still open at the end of input becomes a macro with
/// `terminated: false` holding everything after it. Running this on its own
/// output returns the same nodes.
pub fn reconstruct(nodes: &[SpannedNode]) -> Vec<SpannedNode> {
    let mut tree = Vec::new();
    let mut index = 0;
    while index < nodes.len() {
        let item = &nodes[index];
        match &item.node {
            Node::Newline => index += 1,
            Node::MacroStart(start) => {
                let (folded, next) = collect_macro(nodes, start, item.span, index + 1);
                tree.push(folded);
                index = next;
            }
            _ => {
                tree.push(item.clone());
                index += 1;
            }
        }
    }
    tree
}

/// Gather the body of the macro opened just before `index`.
///
/// Returns the folded macro and the index after its `%mend`.
fn collect_macro(
    nodes: &[SpannedNode],
    start: &MacroStart,
    opened: Span,
    mut index: usize,
) -> (SpannedNode, usize) {
    let mut contents = Vec::new();
    let mut closed = None;
    while index < nodes.len() {
        let item = &nodes[index];
        match &item.node {
            Node::Newline => index += 1,
            Node::MacroEnd => {
                closed = Some(item.span);
                index += 1;
                break;
            }
            Node::MacroStart(inner) => {
                let (folded, next) = collect_macro(nodes, inner, item.span, index + 1);
                contents.push(folded);
                index = next;
            }
            _ => {
                contents.push(item.clone());
                index += 1;
            }
        }
    }

    let last = closed
        .or_else(|| contents.last().map(|item: &SpannedNode| item.span))
        .unwrap_or(opened);
    let folded = Macro::from_start(start.clone(), contents, closed.is_some());
    (
        SpannedNode::new(Node::Macro(folded), Span::covering(opened, last)),
        index,
    )
}
