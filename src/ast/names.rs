use std::fmt;

use serde::Serialize;

/// Macro variable reference embedded in a name.
///
/// The raw text keeps the ampersands and the optional terminating dot so the
/// source spelling can be rendered back.
///
/// # Examples
/// ```text
/// &year
/// &year.
/// &&prefix&i.
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct MacroVariableRef {
    pub raw: String,
}

impl MacroVariableRef {
    pub fn new(raw: impl Into<String>) -> Self {
        MacroVariableRef { raw: raw.into() }
    }

    /// Variable name without the leading ampersands or trailing dot.
    pub fn name(&self) -> &str {
        self.raw.trim_start_matches('&').trim_end_matches('.')
    }
}

/// One piece of a [`NamePath`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum NameSegment {
    /// Plain characters, e.g. `lib` in `lib&i.`
    Literal(String),
    /// Macro variable reference, e.g. `&i.` in `lib&i.`
    Variable(MacroVariableRef),
}

impl NameSegment {
    pub fn as_str(&self) -> &str {
        match self {
            NameSegment::Literal(text) => text,
            NameSegment::Variable(var) => &var.raw,
        }
    }
}

/// A name that may be partially dynamic.
///
/// SAS lets a macro variable stand in for any part of a name, so names are
/// stored as an ordered run of literal and variable segments. `Display`
/// concatenates the raw segments.
///
/// # Examples
/// ```text
/// sales          -> [Literal("sales")]
/// sales&year.    -> [Literal("sales"), Variable("&year.")]
/// ab&x.cd        -> [Literal("ab"), Variable("&x."), Literal("cd")]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct NamePath(pub Vec<NameSegment>);

impl NamePath {
    pub fn new(segments: Vec<NameSegment>) -> Self {
        NamePath(segments)
    }

    pub fn segments(&self) -> &[NameSegment] {
        &self.0
    }

    /// True when the path has no segments or only empty literals.
    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|segment| segment.as_str().is_empty())
    }

    /// True when any segment is a macro variable reference.
    pub fn is_dynamic(&self) -> bool {
        self.0
            .iter()
            .any(|segment| matches!(segment, NameSegment::Variable(_)))
    }
}

impl fmt::Display for NamePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.0 {
            f.write_str(segment.as_str())?;
        }
        Ok(())
    }
}

impl From<&str> for NamePath {
    fn from(literal: &str) -> Self {
        NamePath(vec![NameSegment::Literal(literal.to_string())])
    }
}
