use std::{collections::BTreeMap, fmt, slice, str::FromStr};

use serde::Serialize;

use crate::ast::{
    Comment, DataStep, Include, LibraryBinding, Macro, MacroCall, MacroStart, MacroVariableDef,
    Procedure, UnparsedSqlStatement,
};
use crate::lexer::Span;

/// Every construct the grammar recognises.
///
/// `Newline`, `MacroStart` and a matched `MacroEnd` only exist between the
/// driver and macro reconstruction.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "object", rename_all = "camelCase")]
pub enum Node {
    Newline,
    Comment(Comment),
    MacroVariableDef(MacroVariableDef),
    Include(Include),
    LibraryBinding(LibraryBinding),
    DataStep(DataStep),
    Procedure(Procedure),
    UnparsedSqlStatement(UnparsedSqlStatement),
    MacroStart(MacroStart),
    MacroEnd,
    Macro(Macro),
    MacroCall(MacroCall),
}

/// Variant tag of a [`Node`], used for counting and filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeKind {
    Newline,
    Comment,
    MacroVariableDef,
    Include,
    LibraryBinding,
    DataStep,
    Procedure,
    UnparsedSqlStatement,
    MacroStart,
    MacroEnd,
    Macro,
    MacroCall,
}

impl NodeKind {
    pub const ALL: [NodeKind; 12] = [
        NodeKind::Newline,
        NodeKind::Comment,
        NodeKind::MacroVariableDef,
        NodeKind::Include,
        NodeKind::LibraryBinding,
        NodeKind::DataStep,
        NodeKind::Procedure,
        NodeKind::UnparsedSqlStatement,
        NodeKind::MacroStart,
        NodeKind::MacroEnd,
        NodeKind::Macro,
        NodeKind::MacroCall,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Newline => "newline",
            NodeKind::Comment => "comment",
            NodeKind::MacroVariableDef => "macroVariableDef",
            NodeKind::Include => "include",
            NodeKind::LibraryBinding => "libraryBinding",
            NodeKind::DataStep => "dataStep",
            NodeKind::Procedure => "procedure",
            NodeKind::UnparsedSqlStatement => "unparsedSqlStatement",
            NodeKind::MacroStart => "macroStart",
            NodeKind::MacroEnd => "macroEnd",
            NodeKind::Macro => "macro",
            NodeKind::MacroCall => "macroCall",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NodeKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| s.to_string())
    }
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Newline => NodeKind::Newline,
            Node::Comment(_) => NodeKind::Comment,
            Node::MacroVariableDef(_) => NodeKind::MacroVariableDef,
            Node::Include(_) => NodeKind::Include,
            Node::LibraryBinding(_) => NodeKind::LibraryBinding,
            Node::DataStep(_) => NodeKind::DataStep,
            Node::Procedure(_) => NodeKind::Procedure,
            Node::UnparsedSqlStatement(_) => NodeKind::UnparsedSqlStatement,
            Node::MacroStart(_) => NodeKind::MacroStart,
            Node::MacroEnd => NodeKind::MacroEnd,
            Node::Macro(_) => NodeKind::Macro,
            Node::MacroCall(_) => NodeKind::MacroCall,
        }
    }
}

/// A node together with the source region it was parsed from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpannedNode {
    pub node: Node,
    pub span: Span,
}

impl SpannedNode {
    pub fn new(node: Node, span: Span) -> Self {
        SpannedNode { node, span }
    }

    pub fn kind(&self) -> NodeKind {
        self.node.kind()
    }
}

/// Depth-first walk that steps into macros without yielding them.
///
/// Produced by [`objects`]; yields nodes in document order.
pub struct Objects<'a> {
    stack: Vec<slice::Iter<'a, SpannedNode>>,
}

impl<'a> Iterator for Objects<'a> {
    type Item = &'a SpannedNode;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let level = self.stack.last_mut()?;
            match level.next() {
                Some(item) => match &item.node {
                    Node::Macro(inner) => self.stack.push(inner.contents.iter()),
                    _ => return Some(item),
                },
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}

pub fn objects(nodes: &[SpannedNode]) -> Objects<'_> {
    Objects {
        stack: vec![nodes.iter()],
    }
}

/// Count nodes per kind, including macros and everything inside them.
pub fn count_kinds(nodes: &[SpannedNode]) -> BTreeMap<NodeKind, usize> {
    let mut counts = BTreeMap::new();
    tally(nodes, &mut counts);
    counts
}

fn tally(nodes: &[SpannedNode], counts: &mut BTreeMap<NodeKind, usize>) {
    for item in nodes {
        *counts.entry(item.kind()).or_insert(0) += 1;
        if let Node::Macro(inner) = &item.node {
            tally(&inner.contents, counts);
        }
    }
}
