// tests/integration_tests.rs

use std::fs;
use std::path::PathBuf;

use rust_decimal::Decimal;
use sasdocs::ast::NodeKind;
use sasdocs::{Driver, Grammar, Node, Position, Program, ProgramError, SpannedNode};

fn run(text: &str) -> (Vec<SpannedNode>, sasdocs::ParseStats) {
    let grammar = Grammar::full();
    let output = Driver::new(&grammar).run(text);
    (output.nodes, output.stats)
}

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("sasdocs-{}-{}", name, std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    dir
}

// ============================================================================
// Driver
// ============================================================================

#[test]
fn test_empty_source_is_fully_parsed() {
    let (nodes, stats) = run("");
    assert!(nodes.is_empty());
    assert_eq!(stats.total, 0);
    assert_eq!(stats.coverage(), Decimal::ONE);
    assert_eq!(stats.parsed_rate(), "100.00%");
}

#[test]
fn test_single_statement_span() {
    let (nodes, stats) = run("data a; set b; run;");
    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes[0].span.start, Position::new(1, 0));
    assert_eq!(nodes[0].span.end, Position::new(1, 19));
    assert_eq!(stats.matched, 19);
    assert_eq!(stats.matches, 1);
}

#[test]
fn test_skipped_prefix_lowers_coverage() {
    let (nodes, stats) = run("xyz\ndata a; set b; run;");
    assert_eq!(nodes.len(), 2);
    assert!(matches!(nodes[0].node, Node::Newline));
    assert_eq!(nodes[0].span.start, Position::new(1, 3));
    assert_eq!(nodes[1].span.start, Position::new(2, 0));
    assert_eq!(nodes[1].span.end, Position::new(2, 19));
    assert_eq!(stats.skipped, 3);
    assert_eq!(stats.total, 23);
    assert_eq!(stats.parsed_rate(), "86.96%");
}

#[test]
fn test_multi_line_span() {
    let (nodes, _) = run("data a;\n  set b;\nrun;");
    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes[0].span.start, Position::new(1, 0));
    assert_eq!(nodes[0].span.end, Position::new(3, 4));
}

#[test]
fn test_sql_statements_get_their_own_spans() {
    let create = "create table a as select * from b;";
    let source = format!("proc sql;\n{}\nselect 1;\nquit;", create);
    let (nodes, stats) = run(&source);
    assert_eq!(nodes.len(), 2);
    assert_eq!(nodes[0].kind(), NodeKind::Procedure);
    assert_eq!(nodes[0].span.start, Position::new(2, 0));
    assert_eq!(nodes[0].span.end, Position::new(2, create.len()));
    assert_eq!(nodes[1].kind(), NodeKind::UnparsedSqlStatement);
    assert_eq!(nodes[1].span.start, Position::new(3, 0));
    assert_eq!(nodes[1].span.end, Position::new(3, 9));
    assert_eq!(stats.skipped, 0);
}

#[test]
fn test_columns_count_characters_after_skips() {
    let (nodes, stats) = run("é data a; set b; run;");
    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes[0].span.start, Position::new(1, 2));
    assert_eq!(stats.skipped, 2);
    assert_eq!(stats.matched + stats.skipped, stats.total);
}

#[test]
fn test_windows_line_endings() {
    let (nodes, stats) = run("%let a=1;\r\n%let b=2;\r\n");
    let kinds: Vec<NodeKind> = nodes.iter().map(|n| n.kind()).collect();
    assert_eq!(
        kinds,
        vec![
            NodeKind::MacroVariableDef,
            NodeKind::Newline,
            NodeKind::MacroVariableDef,
            NodeKind::Newline,
        ]
    );
    assert_eq!(nodes[2].span.start, Position::new(2, 0));
    assert_eq!(stats.skipped, 0);
}

#[test]
fn test_source_name_does_not_change_output() {
    let grammar = Grammar::full();
    let named = Driver::new(&grammar)
        .with_source_name("prog.sas")
        .run("data a; run;");
    let anonymous = Driver::new(&grammar).run("data a; run;");
    assert_eq!(named, anonymous);
}

// ============================================================================
// Program facade
// ============================================================================

const PROGRAM: &str = "\
/* Nightly refresh */
%let year = 2024;
libname mart '/data/mart';
%macro load(ds=work.raw);
* Load one table;
data mart.sales; set &ds; run;
%mend load;
%load(ds=raw.sales);
proc sort data=mart.sales out=mart.sorted; by id; run;
";

#[test]
fn test_program_summary_counts_into_macros() {
    let program = Program::parse(PROGRAM);
    let summary = program.summary();
    assert_eq!(summary.get(&NodeKind::Macro), Some(&1));
    assert_eq!(summary.get(&NodeKind::DataStep), Some(&1));
    assert_eq!(summary.get(&NodeKind::Comment), Some(&2));
    assert_eq!(summary.get(&NodeKind::Procedure), Some(&1));
    assert_eq!(summary.get(&NodeKind::MacroCall), Some(&1));
    assert_eq!(summary.get(&NodeKind::Newline), None);
    assert_eq!(program.parsed_rate(), "100.00%");
}

#[test]
fn test_program_objects_flatten_macros() {
    let program = Program::parse(PROGRAM);
    let kinds: Vec<NodeKind> = program.objects().map(|n| n.kind()).collect();
    assert_eq!(
        kinds,
        vec![
            NodeKind::Comment,
            NodeKind::MacroVariableDef,
            NodeKind::LibraryBinding,
            NodeKind::Comment,
            NodeKind::DataStep,
            NodeKind::MacroCall,
            NodeKind::Procedure,
        ]
    );
    assert_eq!(program.objects_of(NodeKind::DataStep).count(), 1);
    assert_eq!(program.macros().len(), 1);
}

#[test]
fn test_macro_documentation() {
    let program = Program::parse(PROGRAM);
    let Node::Macro(found) = &program.macros()[0].node else {
        panic!("Expected a macro");
    };
    assert_eq!(found.name, "load");
    assert_eq!(found.short_desc(), "Load one table");
    assert_eq!(
        found.arguments.as_ref().unwrap()[0].default.as_deref(),
        Some("work.raw")
    );
}

#[test]
fn test_extended_info_from_text() {
    let program = Program::parse_with(&Grammar::full(), PROGRAM, Some("nightly"));
    let info = program.extended_info();
    assert_eq!(info.name.as_deref(), Some("nightly"));
    assert_eq!(info.lines, 9);
    assert!(info.last_edit.is_none());
    assert!(info.path.is_none());
    assert_eq!(info.parsed, "100.00%");

    let json = serde_json::to_value(&info).unwrap();
    assert_eq!(json["summary"]["dataStep"], 1);
    assert!(json.get("lastEdit").is_some());
}

#[test]
fn test_without_macros_grammar_lowers_coverage() {
    let program = Program::parse_with(&Grammar::without_macros(), PROGRAM, None);
    assert!(program.macros().is_empty());
    assert_eq!(program.objects_of(NodeKind::MacroCall).count(), 0);
    assert_eq!(program.objects_of(NodeKind::DataStep).count(), 1);
    assert!(program.stats().coverage() < Decimal::ONE);
}

#[test]
fn test_crate_level_parse() {
    let program = sasdocs::parse("data a; set b; run;");
    assert_eq!(program.contents().len(), 1);
}

// ============================================================================
// Loading from disk
// ============================================================================

#[test]
fn test_load_resolves_existing_paths() {
    let dir = scratch_dir("load");
    fs::write(dir.join("setup.sas"), "%let a = 1;\n").unwrap();
    fs::write(
        dir.join("main.sas"),
        "%include 'setup.sas';\nlibname raw 'missing_dir';\ndata a; set raw.b; run;\n",
    )
    .unwrap();

    let program = Program::load(dir.join("main.sas")).unwrap();
    assert_eq!(program.name(), Some("main"));
    assert_eq!(program.path(), Some(dir.join("main.sas").as_path()));

    let contents = program.contents();
    match &contents[0].node {
        Node::Include(found) => {
            let expected = fs::canonicalize(dir.join("setup.sas")).unwrap();
            assert_eq!(found.resolved.as_ref(), Some(&expected));
        }
        other => panic!("Expected include, got {:?}", other),
    }
    match &contents[1].node {
        Node::LibraryBinding(binding) => assert!(binding.resolved.is_none()),
        other => panic!("Expected libname, got {:?}", other),
    }

    let info = program.extended_info();
    assert_eq!(info.lines, 3);
    assert!(info.last_edit.is_some());
}

#[test]
fn test_load_missing_file() {
    let dir = scratch_dir("missing");
    let error = Program::load(dir.join("nope.sas")).unwrap_err();
    assert!(matches!(error, ProgramError::Io { .. }));
    assert!(error.to_string().contains("nope.sas"));
}

#[test]
fn test_load_invalid_utf8() {
    let dir = scratch_dir("binary");
    let path = dir.join("binary.sas");
    fs::write(&path, [0xff, 0xfe, 0x00]).unwrap();
    let error = Program::load(&path).unwrap_err();
    assert!(matches!(error, ProgramError::InvalidUtf8 { .. }));
}
