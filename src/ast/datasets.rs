use serde::Serialize;

use crate::ast::NamePath;

/// Library used when a dataset reference names none.
pub const DEFAULT_LIBRARY: &str = "work";

/// Inline dataset option.
///
/// # Examples
/// ```text
/// where=(a = 1)     -> option: where, setting: "(a = 1)"
/// keep=a b c        -> option: keep,  setting: "a b c"
/// nway              -> option: nway,  setting: None
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataArg {
    pub option: NamePath,
    pub setting: Option<String>,
}

/// Reference to a dataset, optionally qualified by a library.
///
/// The canonical name lower-cases both parts and falls back to the `work`
/// library. The UID is the upper-cased name and keys the lineage graph.
///
/// # Examples
/// ```text
/// sales            -> work.sales  / WORK.SALES
/// Mart.Sales(keep=id)  -> mart.sales  / MART.SALES
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataObjectRef {
    pub library: Option<NamePath>,
    pub dataset: NamePath,
    pub options: Option<Vec<DataArg>>,
}

impl DataObjectRef {
    pub fn new(library: Option<NamePath>, dataset: NamePath) -> Self {
        DataObjectRef {
            library,
            dataset,
            options: None,
        }
    }

    /// Lower-cased library, `work` when none was written.
    pub fn library_name(&self) -> String {
        match &self.library {
            Some(library) => library.to_string().to_lowercase(),
            None => DEFAULT_LIBRARY.to_string(),
        }
    }

    /// Lower-cased dataset text.
    pub fn dataset_name(&self) -> String {
        self.dataset.to_string().to_lowercase()
    }

    /// Canonical `library.dataset` name.
    pub fn name(&self) -> String {
        format!("{}.{}", self.library_name(), self.dataset_name())
    }

    pub fn uid(&self) -> String {
        self.name().to_uppercase()
    }

    /// Reason the reference cannot key a graph node, if any.
    pub fn canonical_defect(&self) -> Option<&'static str> {
        if self.dataset.is_empty() {
            Some("dataset name is empty")
        } else if self.library.as_ref().is_some_and(NamePath::is_empty) {
            Some("library name is empty")
        } else {
            None
        }
    }
}
