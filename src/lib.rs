pub mod ast;
pub mod driver;
pub mod lexer;
pub mod lineage;
pub mod output;
pub mod parser;
pub mod program;
pub mod reconstruct;

#[cfg(feature = "cli")]
pub mod cli;

pub use ast::{Node, NodeKind, SpannedNode};
pub use driver::{Driver, ParseOutput, ParseStats};
pub use lexer::{Position, Span};
pub use lineage::{DatasetNode, DependencyEdge, LineageDefect, LineageGraph};
pub use output::{node_link_data, to_json, to_json_pretty};
pub use parser::Grammar;
pub use program::{Program, ProgramError, ProgramInfo};
pub use reconstruct::reconstruct;

/// Parse and reconstruct `text` with the full grammar.
pub fn parse(text: &str) -> Program {
    Program::parse(text)
}
