//! Dataset lineage graph.
//!
//! Every data step and procedure reads some datasets and writes others. Each
//! (input, output) pair becomes a directed edge, labelled with the procedure
//! that produced it; data steps leave the label empty. Nodes are keyed by the
//! dataset UID, so `sales`, `work.sales` and `WORK.Sales` are one node.
//! Statements that only read or only write add nothing.

use std::collections::HashMap;
use std::fmt;

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::Serialize;
use tracing::{debug, warn};

use crate::ast::{DataObjectRef, Node, NodeKind, SpannedNode, objects};

/// Dataset vertex.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatasetNode {
    /// Upper-cased `LIBRARY.DATASET`
    pub id: String,
    pub library: String,
    pub dataset: String,
    /// Line of the first statement that mentioned the dataset
    pub line: usize,
}

/// Directed `source -> target` edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyEdge {
    pub source: String,
    pub target: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Statement whose datasets could not be turned into graph nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineageDefect {
    pub line: usize,
    pub kind: NodeKind,
    pub reason: String,
}

impl fmt::Display for LineageDefect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {} skipped, {}", self.line, self.kind, self.reason)
    }
}

/// Edge weights are the procedure label, `None` for data steps.
#[derive(Debug, Clone, Default)]
pub struct LineageGraph {
    graph: DiGraph<DatasetNode, Option<String>>,
    node_indices: HashMap<String, NodeIndex>,
    defects: Vec<LineageDefect>,
}

impl LineageGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Graph of a single parsed program.
    pub fn from_nodes(nodes: &[SpannedNode]) -> Self {
        let mut graph = LineageGraph::new();
        graph.add_nodes(nodes);
        graph
    }

    /// Add the datasets and edges of every data step and procedure in
    /// `nodes`, looking inside macros. Can be called once per program to
    /// build a multi-program graph.
    pub fn add_nodes(&mut self, nodes: &[SpannedNode]) {
        let before = (self.graph.node_count(), self.graph.edge_count());
        for item in objects(nodes) {
            let line = item.span.start.line;
            match &item.node {
                Node::DataStep(step) => {
                    self.add_statement(line, item.kind(), &step.inputs, &step.outputs, None);
                }
                Node::Procedure(procedure) => {
                    let label = procedure.label();
                    self.add_statement(
                        line,
                        item.kind(),
                        &procedure.inputs,
                        &procedure.outputs,
                        Some(label),
                    );
                }
                _ => {}
            }
        }
        debug!(
            added_nodes = self.graph.node_count() - before.0,
            added_edges = self.graph.edge_count() - before.1,
            "extended lineage graph"
        );
    }

    fn add_statement(
        &mut self,
        line: usize,
        kind: NodeKind,
        inputs: &[DataObjectRef],
        outputs: &[DataObjectRef],
        label: Option<String>,
    ) {
        let defect = inputs
            .iter()
            .chain(outputs)
            .find_map(DataObjectRef::canonical_defect);
        if let Some(reason) = defect {
            warn!(line, %kind, reason, "statement left out of lineage");
            self.defects.push(LineageDefect {
                line,
                kind,
                reason: reason.to_string(),
            });
            return;
        }

        for input in inputs {
            for output in outputs {
                let source = self.register(input, line);
                let target = self.register(output, line);
                if source != target {
                    self.connect(source, target, &label);
                }
            }
        }
    }

    /// Index of the node for `object`, added if absent.
    fn register(&mut self, object: &DataObjectRef, line: usize) -> NodeIndex {
        let id = object.uid();
        if let Some(&index) = self.node_indices.get(&id) {
            return index;
        }
        let index = self.graph.add_node(DatasetNode {
            id: id.clone(),
            library: object.library_name(),
            dataset: object.dataset_name(),
            line,
        });
        self.node_indices.insert(id, index);
        index
    }

    fn connect(&mut self, source: NodeIndex, target: NodeIndex, label: &Option<String>) {
        let known = self
            .graph
            .edges_connecting(source, target)
            .any(|edge| edge.weight() == label);
        if !known {
            self.graph.add_edge(source, target, label.clone());
        }
    }

    /// Nodes in order of first mention.
    pub fn nodes(&self) -> impl Iterator<Item = &DatasetNode> {
        self.graph.node_weights()
    }

    /// Edges in insertion order.
    pub fn edges(&self) -> Vec<DependencyEdge> {
        self.graph
            .edge_references()
            .map(|edge| DependencyEdge {
                source: self.graph[edge.source()].id.clone(),
                target: self.graph[edge.target()].id.clone(),
                label: edge.weight().clone(),
            })
            .collect()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn defects(&self) -> &[LineageDefect] {
        &self.defects
    }

    pub fn node(&self, id: &str) -> Option<&DatasetNode> {
        self.node_indices
            .get(&id.to_uppercase())
            .map(|&index| &self.graph[index])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.node_indices.contains_key(&id.to_uppercase())
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Datasets read directly to produce `id`.
    pub fn upstream(&self, id: &str) -> Vec<&DatasetNode> {
        self.neighbors(id, Direction::Incoming)
    }

    /// Datasets produced directly from `id`.
    pub fn downstream(&self, id: &str) -> Vec<&DatasetNode> {
        self.neighbors(id, Direction::Outgoing)
    }

    /// Distinct neighbours in order of first mention.
    fn neighbors(&self, id: &str, direction: Direction) -> Vec<&DatasetNode> {
        let Some(&index) = self.node_indices.get(&id.to_uppercase()) else {
            return Vec::new();
        };
        let mut found: Vec<NodeIndex> = self.graph.neighbors_directed(index, direction).collect();
        found.sort();
        found.dedup();
        found.into_iter().map(|other| &self.graph[other]).collect()
    }
}
