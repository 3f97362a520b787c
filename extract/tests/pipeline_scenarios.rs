//! End-to-end pipeline runs over snapshot files.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, TimeZone};
use rptdoc_extract::resolver::QueryOutcomeKind;
use rptdoc_extract::{
    DataSourceLayout, DocumenterConfig, PipelineError, QueryTier, ReportPipeline, RunState,
    SectionKind,
};
use rptdoc_snapshot::SnapshotLoader;

const ORDERS_TABLE: &str = r#"
data_sources:
  - name: Orders
    connection: { kind: SQL Server, server: db01, database: Sales }
"#;

const ORDERS_COMMAND: &str = r#"
internal_sources:
  - typed: false
    properties:
      CommandText: "SELECT * FROM Orders"
data_sources:
  - name: Command
    connection: { kind: SQL Server, server: db01, database: Sales }
    command_text: "SELECT * FROM Orders"
"#;

const COMMAND_ON_SOURCE: &str = r#"
data_sources:
  - name: Command
    connection: { kind: SQL Server, server: db01, database: Sales }
    command_text: "SELECT * FROM Orders"
"#;

const GROUPED: &str = r#"
data_sources:
  - name: Orders
groups:
  - { ordinal: 2, field: Year }
  - { ordinal: 1, field: Region }
sort_specs:
  - { field: Region, direction: descending }
"#;

fn write_snapshot(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

fn fixed_time() -> DateTime<Local> {
    Local.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap()
}

fn pipeline() -> ReportPipeline<SnapshotLoader> {
    ReportPipeline::new(SnapshotLoader::new(), DocumenterConfig::default())
}

#[test]
fn test_table_report_without_parameters_or_groups() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_snapshot(dir.path(), "orders.yaml", ORDERS_TABLE);

    let mut pipeline = pipeline();
    let document = pipeline.run_at(&path, fixed_time()).unwrap();
    let text = &document.text;

    assert!(text.starts_with(
        "# REPORT DEFINITION: orders.yaml\n# GENERATED ON: 2024-01-15 10:30:00\n"
    ));
    assert!(text.contains("[Connection Type]: SQL Server\n[Server Name]: db01\n"));
    assert!(text.contains("[Linked Tables]:\n- Orders\n"));
    assert!(text.contains("--- PARAMETERS ---\nNo parameters found.\n"));
    assert!(text.contains("--- GROUPING ---\nNo groups found.\n"));
    assert_eq!(document.report.query_outcome, QueryOutcomeKind::LinkedTableList);
    assert_eq!(document.report.resolved_by, Some(QueryTier::TableEnumeration));
    assert!(document.report.is_clean());
    assert_eq!(pipeline.state(), RunState::Done);
}

#[test]
fn test_command_report_prints_text_once() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_snapshot(dir.path(), "command.yaml", ORDERS_COMMAND);

    let document = pipeline().run_at(&path, fixed_time()).unwrap();

    assert!(document.text.contains("[Command Object]:\nSELECT * FROM Orders\n"));
    assert!(!document.text.contains("[Linked Tables]"));
    assert_eq!(document.text.matches("SELECT * FROM Orders").count(), 1);
    assert_eq!(document.report.resolved_by, Some(QueryTier::DynamicField));
}

#[test]
fn test_command_on_public_source_without_internal_container() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_snapshot(dir.path(), "command.yaml", COMMAND_ON_SOURCE);

    let document = pipeline().run_at(&path, fixed_time()).unwrap();

    assert!(document.text.contains(
        "[Database Name]: Sales\n\n[Command Object]:\nSELECT * FROM Orders\n"
    ));
    assert!(!document.text.contains("[Linked Tables]"));
    assert!(!document.text.contains("- Command"));
    assert_eq!(document.report.query_outcome, QueryOutcomeKind::CommandText);
    assert_eq!(document.report.resolved_by, Some(QueryTier::SourceCommand));
}

#[test]
fn test_grouping_reports_direction_or_unknown() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_snapshot(dir.path(), "grouped.yaml", GROUPED);

    let document = pipeline().run_at(&path, fixed_time()).unwrap();

    assert!(document.text.contains(
        "--- GROUPING ---\n\
         Group #1: By Field [Region], Sort: Descending\n\
         Group #2: By Field [Year], Sort: (unknown)\n"
    ));
}

#[test]
fn test_section_order_is_fixed() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_snapshot(dir.path(), "orders.yaml", ORDERS_TABLE);

    let text = pipeline().run_at(&path, fixed_time()).unwrap().text;
    let positions: Vec<usize> = [
        SectionKind::Query,
        SectionKind::Parameters,
        SectionKind::SelectionFormulas,
        SectionKind::Formulas,
        SectionKind::Grouping,
    ]
    .iter()
    .map(|kind| text.find(&format!("--- {} ---", kind.title())).unwrap())
    .collect();

    assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
    assert!(!text.contains("--- DATA SOURCE ---"));
}

#[test]
fn test_separate_layout_lists_sources_first() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_snapshot(dir.path(), "orders.yaml", ORDERS_TABLE);
    let config = DocumenterConfig::default().with_layout(DataSourceLayout::Separate);

    let text = ReportPipeline::new(SnapshotLoader::new(), config)
        .run_at(&path, fixed_time())
        .unwrap()
        .text;

    let data_source = text.find("--- DATA SOURCE ---").unwrap();
    let query = text.find("--- DATABASE & QUERY ---").unwrap();
    assert!(data_source < query);
    assert!(text.contains("[Sources Used (Tables, Views, or Stored Procedures)]:\n- Orders\n"));
    assert!(!text.contains("[Linked Tables]"));
}

#[test]
fn test_unreadable_member_degrades_one_section() {
    let dir = tempfile::tempdir().unwrap();
    let content = format!("{ORDERS_TABLE}unavailable: [formulas]\n");
    let path = write_snapshot(dir.path(), "partial.yaml", &content);

    let document = pipeline().run_at(&path, fixed_time()).unwrap();

    assert!(document.text.contains(
        "--- CUSTOM FORMULAS ---\n\
         Could not retrieve custom formulas. Error: member 'formulas' is not accessible\n"
    ));
    assert!(document.text.contains("--- GROUPING ---\nNo groups found.\n"));
    assert_eq!(document.report.section_failures.len(), 1);
    assert_eq!(document.report.section_failures[0].section, SectionKind::Formulas);
}

#[test]
fn test_unreadable_sources_leave_query_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let content = format!("{ORDERS_TABLE}unavailable: [data_sources]\n");
    let path = write_snapshot(dir.path(), "nosources.yaml", &content);

    let document = pipeline().run_at(&path, fixed_time()).unwrap();

    assert!(document.text.contains(
        "Could not retrieve query definition. Reason: member 'data_sources' is not accessible"
    ));
    assert_eq!(document.report.query_outcome, QueryOutcomeKind::Unavailable);
    assert_eq!(document.report.resolved_by, None);
    assert!(document.text.contains("--- PARAMETERS ---"));
}

#[test]
fn test_garbage_file_fails_to_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_snapshot(dir.path(), "garbage.json", "\u{0}\u{1}not a report");

    let mut pipeline = pipeline();
    let err = pipeline.run_at(&path, fixed_time()).unwrap_err();

    assert!(matches!(err, PipelineError::Load(_)));
    assert!(err.to_string().contains("garbage.json"));
    assert_eq!(pipeline.state(), RunState::Aborted);
}

#[test]
fn test_unloaded_snapshot_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_snapshot(dir.path(), "unloaded.yaml", "loaded: false\n");

    let err = pipeline().run_at(&path, fixed_time()).unwrap_err();
    assert!(matches!(err, PipelineError::NotLoaded(_)));
}

#[test]
fn test_missing_input_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.yaml");

    let mut pipeline = pipeline();
    let err = pipeline.run_at(&path, fixed_time()).unwrap_err();

    assert!(matches!(err, PipelineError::InputNotFound(p) if p == path));
    assert_eq!(pipeline.state(), RunState::Aborted);
}

#[test]
fn test_repeated_runs_are_identical() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_snapshot(dir.path(), "grouped.yaml", GROUPED);

    let mut pipeline = pipeline();
    let first = pipeline.run_at(&path, fixed_time()).unwrap();
    let second = pipeline.run_at(&path, fixed_time()).unwrap();

    assert_eq!(first.text, second.text);
    assert_eq!(
        serde_json::to_string(&first.report).unwrap(),
        serde_json::to_string(&second.report).unwrap()
    );
}
