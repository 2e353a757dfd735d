//! JSON export for parse results and lineage graphs.
//!
//! Everything goes through [`serde_json::Value`], so key order is
//! deterministic (keys are sorted) and the same printer serves summaries, AST
//! dumps and graph exports.
//!
//! # Examples
//!
//! ```
//! use sasdocs::Program;
//! use sasdocs::output::{node_link_data, to_json};
//!
//! let program = Program::parse("data b; set a; run;");
//! let json = to_json(&node_link_data(&program.lineage()));
//! assert!(json.contains(r#""source":"WORK.A""#));
//! ```

use serde::Serialize;
use serde_json::{Value, json};

use crate::lineage::LineageGraph;

pub struct JsonPrinter {
    pretty: bool,
}

impl JsonPrinter {
    pub fn new(pretty: bool) -> Self {
        JsonPrinter { pretty }
    }

    pub fn print(&self, value: &Value) -> String {
        if self.pretty {
            format!("{:#}", value)
        } else {
            value.to_string()
        }
    }
}

/// Node-link form of a lineage graph.
///
/// ```text
/// {"directed": true, "multigraph": true, "graph": {},
///  "nodes": [{"id", "library", "dataset", "line"}],
///  "links": [{"source", "target", "label"?}]}
/// ```
pub fn node_link_data(graph: &LineageGraph) -> Value {
    json!({
        "directed": true,
        "multigraph": true,
        "graph": {},
        "nodes": graph.nodes().collect::<Vec<_>>(),
        "links": graph.edges(),
    })
}

/// Serialize any value into the printer's intermediate form.
pub fn to_value<T: Serialize + ?Sized>(value: &T) -> Result<Value, serde_json::Error> {
    serde_json::to_value(value)
}

/// Compact JSON with sorted keys.
pub fn to_json(value: &Value) -> String {
    JsonPrinter::new(false).print(value)
}

/// Two-space indented JSON with sorted keys.
pub fn to_json_pretty(value: &Value) -> String {
    JsonPrinter::new(true).print(value)
}
