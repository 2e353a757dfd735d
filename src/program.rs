//! A parsed SAS program and its file-system adapter.
//!
//! [`Program`] runs the whole pipeline for one source text: the resilient
//! driver, macro reconstruction and, on request, the lineage graph. Loading
//! from disk adds the file metadata and resolves `%include` and `libname`
//! paths relative to the program's directory.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use serde::Serialize;
use tracing::debug;

use crate::ast::{Node, NodeKind, Objects, SpannedNode, count_kinds, objects};
use crate::driver::{Driver, ParseStats};
use crate::lineage::LineageGraph;
use crate::parser::Grammar;
use crate::reconstruct::reconstruct;

/// Errors raised while reading a program from disk.
#[derive(Debug)]
pub enum ProgramError {
    /// The file could not be read
    Io { path: PathBuf, source: io::Error },
    /// The file is not UTF-8 text
    InvalidUtf8 { path: PathBuf },
}

impl fmt::Display for ProgramError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProgramError::Io { path, source } => {
                write!(f, "Cannot read {}: {}", path.display(), source)
            }
            ProgramError::InvalidUtf8 { path } => {
                write!(f, "{} is not valid UTF-8", path.display())
            }
        }
    }
}

impl std::error::Error for ProgramError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ProgramError::Io { source, .. } => Some(source),
            ProgramError::InvalidUtf8 { .. } => None,
        }
    }
}

/// Descriptive record of a program, as exported by `sasdocs summary`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramInfo {
    pub name: Option<String>,
    pub path: Option<PathBuf>,
    /// Number of `\n` characters in the source
    pub lines: usize,
    /// Modification time in seconds since the Unix epoch
    pub last_edit: Option<u64>,
    pub summary: BTreeMap<NodeKind, usize>,
    /// Coverage, e.g. `"98.25%"`
    pub parsed: String,
}

#[derive(Debug, Clone)]
pub struct Program {
    name: Option<String>,
    path: Option<PathBuf>,
    lines: usize,
    last_edit: Option<u64>,
    contents: Vec<SpannedNode>,
    stats: ParseStats,
}

impl Program {
    /// Parse `text` with the full grammar.
    pub fn parse(text: &str) -> Self {
        Program::parse_with(&Grammar::full(), text, None)
    }

    pub fn parse_with(grammar: &Grammar, text: &str, name: Option<&str>) -> Self {
        let mut driver = Driver::new(grammar);
        if let Some(name) = name {
            driver = driver.with_source_name(name);
        }
        let output = driver.run(text);
        Program {
            name: name.map(str::to_string),
            path: None,
            lines: text.matches('\n').count(),
            last_edit: None,
            contents: reconstruct(&output.nodes),
            stats: output.stats,
        }
    }

    /// Read and parse a file with the full grammar.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ProgramError> {
        Program::load_with(&Grammar::full(), path)
    }

    /// Read and parse a file, then resolve its include and library paths.
    pub fn load_with(grammar: &Grammar, path: impl AsRef<Path>) -> Result<Self, ProgramError> {
        let path = path.as_ref();
        let io_error = |source| ProgramError::Io {
            path: path.to_path_buf(),
            source,
        };
        let bytes = fs::read(path).map_err(io_error)?;
        let text = String::from_utf8(bytes).map_err(|_| ProgramError::InvalidUtf8 {
            path: path.to_path_buf(),
        })?;
        let last_edit = fs::metadata(path)
            .and_then(|meta| meta.modified())
            .ok()
            .and_then(|time| time.duration_since(UNIX_EPOCH).ok())
            .map(|age| age.as_secs());

        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned());
        let mut program = Program::parse_with(grammar, &text, Some(&path.display().to_string()));
        program.name = name;
        program.path = Some(path.to_path_buf());
        program.last_edit = last_edit;

        let base = path.parent().unwrap_or_else(|| Path::new("."));
        resolve_paths(&mut program.contents, base);
        Ok(program)
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Top-level nodes after macro reconstruction.
    pub fn contents(&self) -> &[SpannedNode] {
        &self.contents
    }

    pub fn stats(&self) -> ParseStats {
        self.stats
    }

    pub fn parsed_rate(&self) -> String {
        self.stats.parsed_rate()
    }

    /// Every non-macro node in document order, macros opened up.
    pub fn objects(&self) -> Objects<'_> {
        objects(&self.contents)
    }

    pub fn objects_of(&self, kind: NodeKind) -> impl Iterator<Item = &SpannedNode> + '_ {
        self.objects().filter(move |item| item.kind() == kind)
    }

    /// Macro definitions at any depth.
    pub fn macros(&self) -> Vec<&SpannedNode> {
        let mut found = Vec::new();
        collect_macros(&self.contents, &mut found);
        found
    }

    /// Node counts per kind, macros and their contents included.
    pub fn summary(&self) -> BTreeMap<NodeKind, usize> {
        count_kinds(&self.contents)
    }

    pub fn lineage(&self) -> LineageGraph {
        LineageGraph::from_nodes(&self.contents)
    }

    pub fn extended_info(&self) -> ProgramInfo {
        ProgramInfo {
            name: self.name.clone(),
            path: self.path.clone(),
            lines: self.lines,
            last_edit: self.last_edit,
            summary: self.summary(),
            parsed: self.parsed_rate(),
        }
    }
}

fn collect_macros<'a>(nodes: &'a [SpannedNode], found: &mut Vec<&'a SpannedNode>) {
    for item in nodes {
        if let Node::Macro(inner) = &item.node {
            found.push(item);
            collect_macros(&inner.contents, found);
        }
    }
}

/// Record canonical paths for includes and path libraries that exist.
fn resolve_paths(nodes: &mut [SpannedNode], base: &Path) {
    for item in nodes {
        match &mut item.node {
            Node::Include(include) => {
                include.resolved = resolve(base, &include.path);
            }
            Node::LibraryBinding(binding) => {
                let resolved = binding.path().and_then(|path| resolve(base, path));
                binding.resolved = resolved;
            }
            Node::Macro(inner) => resolve_paths(&mut inner.contents, base),
            _ => {}
        }
    }
}

fn resolve(base: &Path, location: &str) -> Option<PathBuf> {
    match fs::canonicalize(base.join(location)) {
        Ok(resolved) => Some(resolved),
        Err(error) => {
            debug!(location, %error, "path not resolved");
            None
        }
    }
}
