//! CLI support for sasdocs
//!
//! Provides programmatic access to the command implementations so other
//! tools can embed them without going through the binary.

mod analyze;
mod lineage;

pub use analyze::{execute_objects, execute_parse, execute_summary};
pub use lineage::{LineageReport, execute_lineage};

use std::io::{self, Read};
use std::path::PathBuf;

use crate::ast::NodeKind;
use crate::parser::Grammar;
use crate::program::{Program, ProgramError};

/// Errors that can occur during CLI operations
#[derive(Debug)]
pub enum CliError {
    /// A program could not be loaded
    Program(ProgramError),
    /// IO error
    Io(io::Error),
    /// JSON serialization error
    Json(serde_json::Error),
    /// No input provided
    NoInput,
    /// Unknown node kind passed to `--kind`
    UnknownKind(String),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Program(e) => write!(f, "{}", e),
            CliError::Io(e) => write!(f, "IO error: {}", e),
            CliError::Json(e) => write!(f, "JSON error: {}", e),
            CliError::NoInput => {
                write!(f, "No input provided. Pass SAS files or pipe a program to stdin.")
            }
            CliError::UnknownKind(kind) => {
                let known: Vec<&str> = NodeKind::ALL.iter().map(|k| k.as_str()).collect();
                write!(f, "Unknown kind: '{}'\nExpected one of: {}", kind, known.join(", "))
            }
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Program(e) => Some(e),
            CliError::Io(e) => Some(e),
            CliError::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ProgramError> for CliError {
    fn from(e: ProgramError) -> Self {
        CliError::Program(e)
    }
}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        CliError::Io(e)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Json(e)
    }
}

/// Options shared by every command
#[derive(Debug, Clone, Default)]
pub struct InputOptions {
    /// SAS files to read; stdin is used when empty
    pub files: Vec<PathBuf>,
    /// Program text already read from stdin
    pub stdin: Option<String>,
    /// Parse without macro rules
    pub no_macros: bool,
    /// Pretty-print the output
    pub pretty: bool,
}

impl InputOptions {
    pub fn grammar(&self) -> Grammar {
        if self.no_macros {
            Grammar::without_macros()
        } else {
            Grammar::full()
        }
    }
}

/// Read stdin when it is piped, `None` when it is a terminal.
pub fn read_stdin() -> Result<Option<String>, CliError> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }
    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;
    Ok(Some(buffer))
}

/// Parse every input file, or the stdin text when no files were given.
pub fn load_programs(options: &InputOptions) -> Result<Vec<Program>, CliError> {
    let grammar = options.grammar();
    if options.files.is_empty() {
        let text = options.stdin.as_deref().ok_or(CliError::NoInput)?;
        return Ok(vec![Program::parse_with(&grammar, text, Some("<stdin>"))]);
    }
    options
        .files
        .iter()
        .map(|path| Program::load_with(&grammar, path).map_err(CliError::from))
        .collect()
}
