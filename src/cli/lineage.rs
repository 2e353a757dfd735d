//! `lineage` command

use super::{CliError, InputOptions, load_programs};
use crate::lineage::{LineageDefect, LineageGraph};
use crate::output::{JsonPrinter, node_link_data};

/// Result of the lineage command
#[derive(Debug)]
pub struct LineageReport {
    /// Node-link JSON of the combined graph
    pub json: String,
    /// Statements left out of the graph
    pub defects: Vec<LineageDefect>,
}

/// Build one graph across every input program.
pub fn execute_lineage(options: &InputOptions) -> Result<LineageReport, CliError> {
    let mut graph = LineageGraph::new();
    for program in load_programs(options)? {
        graph.add_nodes(program.contents());
    }
    Ok(LineageReport {
        json: JsonPrinter::new(options.pretty).print(&node_link_data(&graph)),
        defects: graph.defects().to_vec(),
    })
}
