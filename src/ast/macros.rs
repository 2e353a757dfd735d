use serde::Serialize;

use crate::ast::{Comment, DataArg, NamePath, Node, SpannedNode};

/// Parameter in a macro definition or call.
///
/// # Examples
/// ```text
/// ds
/// ds=work.input
/// ds=work.input /* dataset to summarise */
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MacroArgument {
    pub name: NamePath,
    /// Raw default text; `Some("")` when `=` is followed by nothing
    pub default: Option<String>,
    pub doc: Option<Comment>,
}

/// `%macro` statement as emitted by the driver.
///
/// Paired with a later `%mend` during reconstruction and replaced by a
/// [`Macro`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MacroStart {
    pub name: NamePath,
    pub arguments: Option<Vec<MacroArgument>>,
    pub options: Option<Vec<DataArg>>,
}

/// Reconstructed macro definition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Macro {
    pub name: String,
    pub arguments: Option<Vec<MacroArgument>>,
    pub options: Option<Vec<DataArg>>,
    pub contents: Vec<SpannedNode>,
    /// False when the input ended before a matching `%mend`
    pub terminated: bool,
}

impl Macro {
    pub fn from_start(start: MacroStart, contents: Vec<SpannedNode>, terminated: bool) -> Self {
        Macro {
            name: start.name.to_string(),
            arguments: start.arguments,
            options: start.options,
            contents,
            terminated,
        }
    }

    /// Text of the comments that open the macro body, one per line.
    pub fn about(&self) -> String {
        self.contents
            .iter()
            .map_while(|item| match &item.node {
                Node::Comment(comment) => Some(comment.text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// First non-blank line of [`Macro::about`].
    pub fn short_desc(&self) -> String {
        self.about()
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .unwrap_or_default()
            .to_string()
    }
}

/// Call of a user macro.
///
/// # Example
/// ```text
/// %summarise(ds=work.sales);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MacroCall {
    pub name: NamePath,
    pub arguments: Option<Vec<MacroArgument>>,
}
