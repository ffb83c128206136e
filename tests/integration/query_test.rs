//! Query flow integration tests.
//!
//! Runs the offset query end to end against the in-memory service.

use hive_indexer::app::{self, RunOptions};
use hive_indexer::config::ConnectionConfig;
use hive_indexer::connection::ConnectionManager;
use hive_indexer::db::{MockConnector, MockHiveClient, Row, Value};
use hive_indexer::error::HiveError;
use hive_indexer::output::OutputFormat;
use hive_indexer::query::{offset_query, QueryExecutor};
use pretty_assertions::assert_eq;

fn logs_rows() -> Vec<Row> {
    vec![
        vec![
            Value::from("1.2.3.4"),
            Value::from("file1"),
            Value::from(vec![0i64, 128]),
        ],
        vec![
            Value::from("5.6.7.8"),
            Value::from("file2"),
            Value::from(vec![256i64]),
        ],
    ]
}

fn manager_for(connector: &MockConnector) -> ConnectionManager {
    ConnectionManager::with_connector(ConnectionConfig::default(), connector.clone())
}

#[test]
fn test_logs_ip_end_to_end() {
    let query = offset_query("logs", "ip").unwrap();
    let connector = MockConnector::new(MockHiveClient::new().with_result(query.clone(), logs_rows()));
    let mut manager = manager_for(&connector);

    let mut out = Vec::new();
    let count = app::run(&mut manager, &RunOptions::new("logs", "ip"), &mut out).unwrap();

    assert_eq!(count, 2);
    assert_eq!(
        String::from_utf8(out).unwrap(),
        format!("hive> {query};\n1.2.3.4\tfile1\t[0,128]\n5.6.7.8\tfile2\t[256]\n0\n")
    );
    assert_eq!(connector.executed_queries(), vec![query]);
}

#[test]
fn test_end_to_end_json_format() {
    let connector = MockConnector::new(MockHiveClient::with_rows(logs_rows()));
    let mut manager = manager_for(&connector);
    let options = RunOptions {
        format: OutputFormat::Json,
        ..RunOptions::new("logs", "ip")
    };

    let mut out = Vec::new();
    app::run(&mut manager, &options, &mut out).unwrap();

    let text = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        &lines[1..],
        &[
            r#"["1.2.3.4","file1",[0,128]]"#,
            r#"["5.6.7.8","file2",[256]]"#,
            "0"
        ]
    );
}

#[test]
fn test_query_matching_nothing_prints_only_marker() {
    let connector = MockConnector::new(MockHiveClient::new());
    let mut manager = manager_for(&connector);

    let mut out = Vec::new();
    let count = app::run(&mut manager, &RunOptions::new("events", "user_id"), &mut out).unwrap();

    assert_eq!(count, 0);
    let text = String::from_utf8(out).unwrap();
    assert_eq!(text.lines().last(), Some("0"));
    assert_eq!(text.lines().count(), 2);
}

#[test]
fn test_fetch_limit_bounds() {
    let rows: Vec<Row> = (0..4).map(|i| vec![Value::from(i as i64)]).collect();
    let connector = MockConnector::new(MockHiveClient::with_rows(rows.clone()));
    let mut manager = manager_for(&connector);
    manager.connect().unwrap();

    let mut executor = QueryExecutor::new(&mut manager, std::io::sink());
    assert_eq!(executor.execute("q", 0).unwrap(), rows);
    assert_eq!(executor.execute("q", 4).unwrap(), rows);
    assert_eq!(executor.execute("q", 3).unwrap(), rows[..3].to_vec());
    assert_eq!(executor.execute("q", 9).unwrap().len(), 4);
}

#[test]
fn test_fresh_session_never_touches_service() {
    let connector = MockConnector::new(MockHiveClient::with_rows(logs_rows()));
    let mut manager = manager_for(&connector);

    let mut echo: Vec<u8> = Vec::new();
    let err = QueryExecutor::new(&mut manager, &mut echo)
        .execute("SELECT 1", 0)
        .unwrap_err();

    assert!(matches!(err, HiveError::NotConnected));
    assert!(echo.is_empty());
    assert_eq!(connector.open_count(), 0);
}

#[test]
fn test_remote_failure_propagates_unchanged() {
    let connector = MockConnector::failing_queries("SemanticException [Error 10001]: Table not found logs");
    let mut manager = manager_for(&connector);

    let err = app::run(&mut manager, &RunOptions::new("logs", "ip"), &mut std::io::sink()).unwrap_err();

    assert!(matches!(err, HiveError::RemoteExecution { .. }));
    assert_eq!(err.category(), "Remote Execution Error");
    assert!(err.to_string().contains("Table not found logs"));
}

/// Reads the stream the way the B+-tree indexer does: lines up to `0`, each
/// split at its first TAB into key and value.
fn index_records(stream: &str) -> Vec<(String, String)> {
    stream
        .lines()
        .skip_while(|line| line.starts_with("hive> "))
        .take_while(|line| *line != "0")
        .map(|line| {
            let (key, value) = line.split_once('\t').expect("row line without a TAB");
            (key.to_string(), value.to_string())
        })
        .collect()
}

#[test]
fn test_output_feeds_the_indexer() {
    let connector = MockConnector::new(MockHiveClient::with_rows(logs_rows()));
    let mut manager = manager_for(&connector);

    let mut out = Vec::new();
    app::run(&mut manager, &RunOptions::new("logs", "ip"), &mut out).unwrap();
    let stream = String::from_utf8(out).unwrap();

    assert_eq!(stream.lines().last(), Some("0"));
    assert_eq!(
        index_records(&stream),
        vec![
            ("1.2.3.4".to_string(), "file1\t[0,128]".to_string()),
            ("5.6.7.8".to_string(), "file2\t[256]".to_string()),
        ]
    );
}
