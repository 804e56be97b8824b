//! End-to-end runs of the tscell binary.

use super::common::{run_tscell, run_tscell_with_env};
use pretty_assertions::assert_eq;
use std::fs;
use tempfile::TempDir;

const SCHEMA: &str = "SET STORAGE GROUP TO root.a;\n\
    CREATE TIMESERIES root.a.b WITH DATATYPE=BOOLEAN;\n";

#[test]
fn test_execute_text_output() {
    let dir = TempDir::new().unwrap();
    let script = format!(
        "{SCHEMA}INSERT INTO root.a (timestamp,b) VALUES (1,true);\nSELECT b FROM root.a;"
    );

    let (code, stdout, _) = run_tscell(dir.path(), &["-e", &script], None);

    assert_eq!(code, 0);
    assert_eq!(
        stdout,
        "Sql executed.\n\nSql executed.\n\nSql executed.\n\nTime\troot.a.b\n1\ttrue\n"
    );
}

#[test]
fn test_script_from_file_and_stdin_agree() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cell.sql");
    fs::write(&path, SCHEMA).unwrap();

    let from_file = run_tscell(dir.path(), &[path.to_str().unwrap()], None);
    let from_stdin = run_tscell(dir.path(), &["-"], Some(SCHEMA));

    assert_eq!(from_file.0, 0);
    assert_eq!(from_file, from_stdin);
}

#[test]
fn test_failed_statement_exits_one() {
    let dir = TempDir::new().unwrap();

    let (code, stdout, _) = run_tscell(
        dir.path(),
        &["-e", "select * from a;\nSET STORAGE GROUP TO root.a"],
        None,
    );

    assert_eq!(code, 1);
    assert!(stdout.starts_with("401: "), "stdout: {stdout}");
    assert!(stdout.ends_with("Sql executed.\n"), "stdout: {stdout}");
}

#[test]
fn test_stop_on_error_lists_unexecuted_statements() {
    let dir = TempDir::new().unwrap();

    let (code, stdout, _) = run_tscell(
        dir.path(),
        &[
            "--on-error",
            "stop",
            "-e",
            "bogus statement;\nSET STORAGE GROUP TO root.a;\nSHOW STORAGE GROUP",
        ],
        None,
    );

    assert_eq!(code, 1);
    assert!(stdout.contains(
        "Not executed: SET STORAGE GROUP TO root.a\nNot executed: SHOW STORAGE GROUP"
    ));
}

#[test]
fn test_split_only_prints_statements() {
    let dir = TempDir::new().unwrap();

    let (code, stdout, _) = run_tscell(
        dir.path(),
        &["--split-only", "-e", "SELECT *\nFROM root.a\n\tWHERE time > 1;;\n\nSHOW TIMESERIES;"],
        None,
    );

    assert_eq!(code, 0);
    assert_eq!(stdout, "SELECT * FROM root.a  WHERE time > 1\nSHOW TIMESERIES\n");
}

#[test]
fn test_json_output() {
    let dir = TempDir::new().unwrap();

    let (code, stdout, _) = run_tscell(
        dir.path(),
        &["--output", "json", "-e", "SET STORAGE GROUP TO root.a"],
        None,
    );

    assert_eq!(code, 0);
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["code"], "SUCCESS");
    assert_eq!(json["messages"][0]["statement"], "SET STORAGE GROUP TO root.a");
    assert_eq!(json["messages"][0]["type"], "TEXT");
    assert_eq!(json["messages"][0]["data"], "Sql executed.");
    assert!(json["messages"][0]["elapsed_ms"].is_u64());
    assert_eq!(json["skipped"], serde_json::json!([]));
}

#[test]
fn test_seed_prepares_engine() {
    let dir = TempDir::new().unwrap();
    let seed = dir.path().join("seed.sql");
    fs::write(
        &seed,
        format!("{SCHEMA}INSERT INTO root.a (timestamp,b) VALUES (2,false);"),
    )
    .unwrap();

    let (code, stdout, _) = run_tscell(
        dir.path(),
        &["--seed", seed.to_str().unwrap(), "-e", "SELECT * FROM root.a"],
        None,
    );

    assert_eq!(code, 0);
    assert_eq!(stdout, "Time\troot.a.b\n2\tfalse\n");
}

#[test]
fn test_failing_seed_exits_two() {
    let dir = TempDir::new().unwrap();
    let seed = dir.path().join("seed.sql");
    fs::write(&seed, "CREATE TIMESERIES root.a.b WITH DATATYPE=BOOLEAN").unwrap();

    let (code, stdout, stderr) = run_tscell(
        dir.path(),
        &["--seed", seed.to_str().unwrap(), "-e", "SHOW TIMESERIES"],
        None,
    );

    assert_eq!(code, 2);
    assert!(stdout.is_empty());
    assert!(stderr.contains("Seed statement"), "stderr: {stderr}");
}

#[test]
fn test_config_file_and_cli_precedence() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("config.toml"),
        "[output]\ntime_display = \"iso8601\"\n\n[engine]\nauto_create_schema = true\n",
    )
    .unwrap();
    let script = "INSERT INTO root.a.d (timestamp,s) VALUES (1000,1.5);\nSELECT s FROM root.a.d";

    let (code, stdout, _) = run_tscell(dir.path(), &["-e", script], None);
    assert_eq!(code, 0);
    assert!(
        stdout.ends_with("1970-01-01T00:00:01.000+00:00\t1.5\n"),
        "stdout: {stdout}"
    );

    let (code, stdout, _) =
        run_tscell(dir.path(), &["--time-display", "long", "-e", script], None);
    assert_eq!(code, 0);
    assert!(stdout.ends_with("1000\t1.5\n"), "stdout: {stdout}");
}

#[test]
fn test_missing_script_exits_two() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope.sql");

    let (code, stdout, stderr) = run_tscell(dir.path(), &[missing.to_str().unwrap()], None);

    assert_eq!(code, 2);
    assert!(stdout.is_empty());
    assert!(stderr.contains("Failed to read script"), "stderr: {stderr}");
}

#[test]
fn test_log_file_receives_plain_logs() {
    let dir = TempDir::new().unwrap();
    let log_path = dir.path().join("logs").join("tscell.log");

    let (code, stdout, stderr) = run_tscell_with_env(
        dir.path(),
        &[
            "--log-file",
            log_path.to_str().unwrap(),
            "-e",
            "SET STORAGE GROUP TO root.a;\nSHOW STORAGE GROUP",
        ],
        None,
        &[("RUST_LOG", "debug")],
    );

    assert_eq!(code, 0);
    assert_eq!(stdout, "Sql executed.\n\nstorage group\nroot.a\n");
    assert!(!stderr.contains("Dispatching statement"), "stderr: {stderr}");

    let log = fs::read_to_string(&log_path).unwrap();
    assert!(log.contains("Dispatching statement"), "log: {log}");
    assert!(log.contains("query=true"), "log: {log}");
    assert!(!log.contains("\x1b["), "log has ANSI escapes: {log}");
}
