// tests/reconstruct_tests.rs

use sasdocs::ast::{Macro, NodeKind, count_kinds, objects};
use sasdocs::{Driver, Grammar, Node, Position, SpannedNode, reconstruct};

fn flat(text: &str) -> Vec<SpannedNode> {
    let grammar = Grammar::full();
    Driver::new(&grammar).run(text).nodes
}

fn as_macro(item: &SpannedNode) -> &Macro {
    match &item.node {
        Node::Macro(found) => found,
        other => panic!("Expected macro, got {:?}", other),
    }
}

fn kinds(nodes: &[SpannedNode]) -> Vec<NodeKind> {
    nodes.iter().map(|n| n.kind()).collect()
}

// ============================================================================
// Pairing
// ============================================================================

#[test]
fn test_simple_macro() {
    let tree = reconstruct(&flat("%macro t; data a; set b; run; %mend;"));
    assert_eq!(tree.len(), 1);
    let found = as_macro(&tree[0]);
    assert_eq!(found.name, "t");
    assert!(found.terminated);
    assert_eq!(kinds(&found.contents), vec![NodeKind::DataStep]);
}

#[test]
fn test_nested_macros() {
    let source = "%macro a;\ndata x; set y; run;\n%macro b;\n* hi;\n%mend;\n%mend a;\n";
    let tree = reconstruct(&flat(source));
    assert_eq!(tree.len(), 1);

    let outer = as_macro(&tree[0]);
    assert_eq!(outer.name, "a");
    assert_eq!(kinds(&outer.contents), vec![NodeKind::DataStep, NodeKind::Macro]);
    assert_eq!(tree[0].span.start, Position::new(1, 0));
    assert_eq!(tree[0].span.end, Position::new(6, 8));

    let inner = as_macro(&outer.contents[1]);
    assert_eq!(inner.name, "b");
    assert_eq!(kinds(&inner.contents), vec![NodeKind::Comment]);
    assert_eq!(outer.contents[1].span.start, Position::new(3, 0));
    assert_eq!(outer.contents[1].span.end, Position::new(5, 6));
}

#[test]
fn test_sibling_macros() {
    let tree = reconstruct(&flat("%macro a;\n%mend;\n%macro b;\n%mend;\n"));
    assert_eq!(kinds(&tree), vec![NodeKind::Macro, NodeKind::Macro]);
    assert_eq!(as_macro(&tree[1]).name, "b");
    assert!(as_macro(&tree[0]).contents.is_empty());
}

#[test]
fn test_stray_end_is_kept() {
    let tree = reconstruct(&flat("%mend;\ndata a; set b; run;"));
    assert_eq!(kinds(&tree), vec![NodeKind::MacroEnd, NodeKind::DataStep]);
}

#[test]
fn test_unterminated_macro_runs_to_end_of_input() {
    let tree = reconstruct(&flat("%macro a;\n* c;\n"));
    assert_eq!(tree.len(), 1);
    let found = as_macro(&tree[0]);
    assert!(!found.terminated);
    assert_eq!(kinds(&found.contents), vec![NodeKind::Comment]);
    assert_eq!(tree[0].span.end, Position::new(2, 4));
}

#[test]
fn test_unterminated_empty_macro_keeps_start_span() {
    let nodes = flat("%macro a;");
    let tree = reconstruct(&nodes);
    assert_eq!(tree.len(), 1);
    assert!(!as_macro(&tree[0]).terminated);
    assert_eq!(tree[0].span, nodes[0].span);
}

#[test]
fn test_newlines_are_dropped() {
    let nodes = flat("\n\n%let a = 1;\n\n");
    assert_eq!(nodes.len(), 5);
    let tree = reconstruct(&nodes);
    assert_eq!(kinds(&tree), vec![NodeKind::MacroVariableDef]);
}

#[test]
fn test_reconstruction_is_idempotent() {
    let source = "%mend;\n%macro a;\n%macro b;\ndata x; set y; run;\n%mend;\n%macro c;\n";
    let once = reconstruct(&flat(source));
    let twice = reconstruct(&once);
    assert_eq!(once, twice);
}

// ============================================================================
// Macro metadata and walks
// ============================================================================

#[test]
fn test_about_joins_leading_comments() {
    let source = "%macro m;\n/* Summarise sales\n   by region */\n* second;\ndata a; run;\n* trailing;\n%mend;";
    let tree = reconstruct(&flat(source));
    let found = as_macro(&tree[0]);
    assert_eq!(found.about(), " Summarise sales\n   by region \n second");
    assert_eq!(found.short_desc(), "Summarise sales");
}

#[test]
fn test_short_desc_without_comments() {
    let tree = reconstruct(&flat("%macro m; %mend;"));
    assert_eq!(as_macro(&tree[0]).about(), "");
    assert_eq!(as_macro(&tree[0]).short_desc(), "");
}

#[test]
fn test_objects_skip_macro_wrappers() {
    let tree = reconstruct(&flat(
        "%macro a;\n%macro b;\ndata x; set y; run;\n%mend;\n%mend;\nproc sort data=x out=z; run;",
    ));
    let walked: Vec<NodeKind> = objects(&tree).map(|n| n.kind()).collect();
    assert_eq!(walked, vec![NodeKind::DataStep, NodeKind::Procedure]);
}

#[test]
fn test_count_kinds_includes_macros() {
    let tree = reconstruct(&flat("%macro a;\n%macro b;\n%mend;\n%mend;\n%a;"));
    let counts = count_kinds(&tree);
    assert_eq!(counts.get(&NodeKind::Macro), Some(&2));
    assert_eq!(counts.get(&NodeKind::MacroCall), Some(&1));
}
