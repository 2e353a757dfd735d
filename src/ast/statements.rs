use std::path::PathBuf;

use serde::Serialize;

use crate::ast::{DataArg, DataObjectRef, NamePath};

/// Comment with its delimiters stripped.
///
/// # Example
/// ```text
/// * inline comment;
/// /* block comment */
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Comment {
    pub text: String,
}

/// `%let` statement.
///
/// The value is everything between `=` and the first `;`, kept verbatim.
///
/// # Example
/// ```text
/// %let year = 2024;
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MacroVariableDef {
    pub variable: NamePath,
    pub value: Option<String>,
}

/// `%include` statement.
///
/// `resolved` is filled in by the program loader when the path exists.
///
/// # Example
/// ```text
/// %include "common/setup.sas";
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Include {
    pub path: String,
    pub resolved: Option<PathBuf>,
}

/// What a library alias points at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum LibraryTarget {
    /// `libname mart "/data/mart";`
    Path(String),
    /// `libname mart (staging);`
    Pointer(NamePath),
}

/// `libname` statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LibraryBinding {
    pub alias: NamePath,
    pub target: LibraryTarget,
    pub resolved: Option<PathBuf>,
}

impl LibraryBinding {
    pub fn path(&self) -> Option<&str> {
        match &self.target {
            LibraryTarget::Path(path) => Some(path),
            LibraryTarget::Pointer(_) => None,
        }
    }

    pub fn pointer(&self) -> Option<&NamePath> {
        match &self.target {
            LibraryTarget::Path(_) => None,
            LibraryTarget::Pointer(alias) => Some(alias),
        }
    }
}

/// Data step.
///
/// `header` is the text between the `data` statement and `set`/`merge`;
/// `body` is the text between the inputs and `run`.
///
/// # Example
/// ```text
/// data out.sales(keep=id total);
///     format total 8.2;
///     set raw.sales;
///     total = qty * price;
/// run;
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataStep {
    pub outputs: Vec<DataObjectRef>,
    pub inputs: Vec<DataObjectRef>,
    pub header: String,
    pub body: String,
    pub options: Option<Vec<DataArg>>,
}

/// Procedure call, or a `create table` statement inside `proc sql`.
///
/// # Example
/// ```text
/// proc sort data=raw.sales out=work.sorted; by id; run;
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Procedure {
    /// Lower-cased procedure name; `sql` for statements from a sql block
    #[serde(rename = "type")]
    pub kind: String,
    pub inputs: Vec<DataObjectRef>,
    pub outputs: Vec<DataObjectRef>,
}

impl Procedure {
    /// Edge label used in the lineage graph, e.g. `proc sort`.
    pub fn label(&self) -> String {
        format!("proc {}", self.kind)
    }
}

/// Statement inside `proc sql` that is not a `create table`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnparsedSqlStatement {
    pub text: String,
}
