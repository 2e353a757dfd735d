// tests/lineage_tests.rs

use sasdocs::ast::{DataObjectRef, DataStep, NamePath, NodeKind};
use sasdocs::lexer::{Position, Span};
use sasdocs::{LineageGraph, Node, Program, SpannedNode, node_link_data, to_json_pretty};

fn graph(text: &str) -> LineageGraph {
    Program::parse(text).lineage()
}

fn ids(graph: &LineageGraph) -> Vec<String> {
    graph.nodes().map(|n| n.id.clone()).collect()
}

/// `SOURCE -> TARGET` with the label in parentheses when present.
fn edges(graph: &LineageGraph) -> Vec<String> {
    graph
        .edges()
        .iter()
        .map(|e| match &e.label {
            Some(label) => format!("{} -> {} ({})", e.source, e.target, label),
            None => format!("{} -> {}", e.source, e.target),
        })
        .collect()
}

// ============================================================================
// Canonical names
// ============================================================================

#[test]
fn test_uid_defaults_to_work() {
    let object = DataObjectRef::new(None, NamePath::from("x"));
    assert_eq!(object.uid(), "WORK.X");
    assert_eq!(object.name(), "work.x");
}

#[test]
fn test_uid_is_case_insensitive() {
    let lower = DataObjectRef::new(Some(NamePath::from("work")), NamePath::from("sales"));
    let upper = DataObjectRef::new(Some(NamePath::from("WORK")), NamePath::from("Sales"));
    let bare = DataObjectRef::new(None, NamePath::from("SALES"));
    assert_eq!(lower.uid(), upper.uid());
    assert_eq!(lower.uid(), bare.uid());
}

// ============================================================================
// Graph construction
// ============================================================================

#[test]
fn test_data_step_then_procedure() {
    let g = graph("data b; set a; run; proc sort data=b out=c; run;");
    assert_eq!(ids(&g), vec!["WORK.A", "WORK.B", "WORK.C"]);
    assert_eq!(edges(&g), vec!["WORK.A -> WORK.B", "WORK.B -> WORK.C (proc sort)"]);
}

#[test]
fn test_every_input_feeds_every_output() {
    let g = graph("data x y; merge a b; by id; run;");
    assert_eq!(g.edge_count(), 4);
    assert_eq!(g.upstream("work.x").len(), 2);
    assert_eq!(g.downstream("WORK.A").len(), 2);
}

#[test]
fn test_mixed_case_names_share_a_node() {
    let g = graph("data Sales; set RAW.x; run; data sales2; set WORK.SALES; run;");
    assert_eq!(ids(&g), vec!["RAW.X", "WORK.SALES", "WORK.SALES2"]);
    assert_eq!(g.node("work.sales").map(|n| n.dataset.as_str()), Some("sales"));
}

#[test]
fn test_self_loop_is_suppressed() {
    let g = graph("data a; set a; run;");
    assert_eq!(ids(&g), vec!["WORK.A"]);
    assert_eq!(g.edge_count(), 0);
}

#[test]
fn test_duplicate_edges_are_stored_once() {
    let g = graph("data b; set a; run;\ndata b; set a; run;");
    assert_eq!(g.edge_count(), 1);
}

#[test]
fn test_edges_with_different_labels_are_distinct() {
    let g = graph("data b; set a; run; proc sort data=a out=b; run;");
    assert_eq!(edges(&g), vec!["WORK.A -> WORK.B", "WORK.A -> WORK.B (proc sort)"]);
    let upstream: Vec<&str> = g.upstream("WORK.B").iter().map(|n| n.id.as_str()).collect();
    assert_eq!(upstream, vec!["WORK.A"]);
}

#[test]
fn test_step_without_inputs_adds_no_node() {
    let g = graph("data a; x = 1; run;");
    assert!(!g.contains("work.a"));
    assert!(g.is_empty());
}

#[test]
fn test_procedure_without_outputs_adds_no_node() {
    let g = graph("proc print data=a; run;");
    assert_eq!(ids(&g), Vec::<String>::new());
    assert_eq!(g.edge_count(), 0);
}

#[test]
fn test_read_only_procedure_leaves_existing_graph_alone() {
    let g = graph("data b; set a; run; proc print data=b; run; proc print data=z; run;");
    assert_eq!(ids(&g), vec!["WORK.A", "WORK.B"]);
    assert!(!g.contains("WORK.Z"));
}

#[test]
fn test_sql_create_table() {
    let g = graph("proc sql;\ncreate table mart.out as select * from raw.a, raw.b;\nquit;");
    assert_eq!(
        edges(&g),
        vec!["RAW.A -> MART.OUT (proc sql)", "RAW.B -> MART.OUT (proc sql)"]
    );
}

#[test]
fn test_macros_are_transparent() {
    let g = graph("%macro m;\ndata b; set a; run;\n%mend;\n%m;");
    assert_eq!(edges(&g), vec!["WORK.A -> WORK.B"]);
}

#[test]
fn test_node_line_is_first_mention() {
    let g = graph("\n\ndata b; set a; run;\nproc sort data=b out=c; run;");
    assert_eq!(g.node("WORK.B").map(|n| n.line), Some(3));
    assert_eq!(g.node("WORK.C").map(|n| n.line), Some(4));
}

#[test]
fn test_dynamic_names_keep_their_text() {
    let g = graph("data out&i.; set lib&y..in; run;");
    assert!(g.contains("WORK.OUT&I."));
    assert!(g.contains("LIB&Y..IN"));
}

// ============================================================================
// Defects and accumulation
// ============================================================================

#[test]
fn test_empty_name_is_a_defect() {
    let span = Span::new(Position::new(7, 0), Position::new(7, 20));
    let step = DataStep {
        outputs: vec![DataObjectRef::new(None, NamePath::default())],
        inputs: vec![DataObjectRef::new(None, NamePath::from("a"))],
        header: String::new(),
        body: String::new(),
        options: None,
    };
    let g = LineageGraph::from_nodes(&[SpannedNode::new(Node::DataStep(step), span)]);
    assert!(g.is_empty());
    assert_eq!(g.defects().len(), 1);
    assert_eq!(g.defects()[0].line, 7);
    assert_eq!(g.defects()[0].kind, NodeKind::DataStep);
    assert_eq!(
        g.defects()[0].to_string(),
        "line 7: dataStep skipped, dataset name is empty"
    );
}

#[test]
fn test_graph_accumulates_programs() {
    let first = Program::parse("proc sort data=a out=b; run;");
    let second = Program::parse("proc transpose data=b out=c; run;");
    let mut g = LineageGraph::new();
    g.add_nodes(first.contents());
    g.add_nodes(second.contents());
    assert_eq!(ids(&g).len(), 3);
    let upstream: Vec<&str> = g.upstream("WORK.C").iter().map(|n| n.id.as_str()).collect();
    assert_eq!(upstream, vec!["WORK.B"]);
    let downstream: Vec<&str> = g.downstream("WORK.A").iter().map(|n| n.id.as_str()).collect();
    assert_eq!(downstream, vec!["WORK.B"]);
    assert!(g.upstream("WORK.A").is_empty());
}

// ============================================================================
// Export
// ============================================================================

#[test]
fn test_node_link_export() {
    let g = graph("data b; set a; run; proc sort data=b out=c; run;");
    let json = node_link_data(&g);
    assert_eq!(json["directed"], true);
    assert_eq!(json["multigraph"], true);
    assert_eq!(json["nodes"][0]["id"], "WORK.A");
    assert_eq!(json["nodes"][0]["library"], "work");
    assert_eq!(json["nodes"][0]["line"], 1);
    assert_eq!(json["links"][0]["source"], "WORK.A");
    assert!(json["links"][0].get("label").is_none());
    assert_eq!(json["links"][1]["label"], "proc sort");
    assert_eq!(json["nodes"].as_array().map(Vec::len), Some(3));
    assert!(to_json_pretty(&json).contains("\n  \"directed\": true,\n"));
}
