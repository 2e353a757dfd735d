//! # SAS Abstract Syntax Tree
//!
//! This module defines the node model produced by the resilient parser. The
//! model is deliberately shallow: it captures what a statement reads and
//! writes, how libraries and includes are bound, and where macros start and
//! end, while the bodies of steps are kept as raw text.
//!
//! ## Architecture Overview
//!
//! - **[names]** - Partially dynamic names (`lib&year.`) and macro variable references
//! - **[datasets]** - Dataset references and their inline options
//! - **[statements]** - Comments, `%let`, `%include`, `libname`, data steps, procedures
//! - **[macros]** - Macro arguments, start markers, reconstructed macros and calls
//! - **[node]** - The closed [`Node`] union, spans and tree walks
//!
//! ## Node Lifecycle
//!
//! ```text
//! source -> driver -> [Newline, MacroStart, DataStep, MacroEnd, ...]
//!        -> reconstruct -> [Macro { contents: [DataStep] }, ...]
//! ```
//!
//! Nodes are created by grammar rules, get their [`Span`](crate::lexer::Span)
//! from the driver and are read-only afterwards. The transient markers are
//! folded into [`Macro`] nodes by [`crate::reconstruct`].
//!
//! ## Canonical Dataset Names
//!
//! A [`DataObjectRef`] without a library lives in `work`. Its UID is the
//! upper-cased `library.dataset`, so `Sales`, `work.sales` and `WORK.SALES`
//! all key the same lineage node.
pub mod datasets;
pub mod macros;
pub mod names;
pub mod node;
pub mod statements;

pub use datasets::{DEFAULT_LIBRARY, DataArg, DataObjectRef};
pub use macros::{Macro, MacroArgument, MacroCall, MacroStart};
pub use names::{MacroVariableRef, NamePath, NameSegment};
pub use node::{Node, NodeKind, Objects, SpannedNode, count_kinds, objects};
pub use statements::{
    Comment, DataStep, Include, LibraryBinding, LibraryTarget, MacroVariableDef, Procedure,
    UnparsedSqlStatement,
};
