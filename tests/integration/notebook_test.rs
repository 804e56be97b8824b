//! End-to-end interpretation against the in-memory engine.
//!
//! Mirrors how a notebook drives the interpreter: several cells in a row
//! sharing one engine, each rendered to text.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use tscell::coordinator::{FailurePolicy, Interpreter, ResultCode};
use tscell::engine::{status, MemoryEngine};
use tscell::output::{CellOutput, RenderOptions, SQL_EXECUTED};

fn auto_schema_interpreter() -> Interpreter {
    Interpreter::new(
        Arc::new(MemoryEngine::new().with_auto_create_schema(true)),
        FailurePolicy::Continue,
    )
}

async fn seeded_interpreter() -> Interpreter {
    let interpreter = auto_schema_interpreter();
    let inserts = (1..=5)
        .map(|i| {
            format!(
                "INSERT INTO root.test.wf01.wt01 (timestamp, temperature, status, hardware) \
                 VALUES ({i}, {i}.{i}, {}, {i}{i})",
                i == 2
            )
        })
        .collect::<Vec<_>>()
        .join(";\n");
    let result = interpreter.interpret(&inserts).await;
    assert!(result.is_success(), "seed failed: {:?}", result);
    interpreter
}

async fn interpret_text(interpreter: &Interpreter, script: &str) -> (ResultCode, String) {
    let result = interpreter.interpret(script).await;
    let output = CellOutput::from_result(&result, &RenderOptions::default());
    (output.code, output.to_text())
}

#[tokio::test]
async fn test_non_query_statements_acknowledge() {
    let interpreter = auto_schema_interpreter();
    for i in 0..20 {
        let script = format!(
            "INSERT INTO root.test.wf02(timestamp,temperature) VALUES({i},{})",
            i as f64 * 0.5
        );
        let (code, text) = interpret_text(&interpreter, &script).await;
        assert_eq!(code, ResultCode::Success);
        assert_eq!(text, SQL_EXECUTED);
    }
}

#[tokio::test]
async fn test_select_single_column() {
    let interpreter = seeded_interpreter().await;

    let (code, text) =
        interpret_text(&interpreter, "select status from root.test.wf01.wt01").await;

    assert_eq!(code, ResultCode::Success);
    assert_eq!(
        text,
        "Time\troot.test.wf01.wt01.status\n\
         1\tfalse\n\
         2\ttrue\n\
         3\tfalse\n\
         4\tfalse\n\
         5\tfalse"
    );
}

#[tokio::test]
async fn test_select_with_time_filter() {
    let interpreter = seeded_interpreter().await;

    let (code, text) = interpret_text(
        &interpreter,
        "select * from root.test.wf01.wt01 where time > 2 and time < 6",
    )
    .await;

    assert_eq!(code, ResultCode::Success);
    assert_eq!(
        text,
        "Time\troot.test.wf01.wt01.temperature\troot.test.wf01.wt01.status\troot.test.wf01.wt01.hardware\n\
         3\t3.3\tfalse\t33.0\n\
         4\t4.4\tfalse\t44.0\n\
         5\t5.5\tfalse\t55.0"
    );
}

#[tokio::test]
async fn test_malformed_queries_report_syntax_errors() {
    let interpreter = seeded_interpreter().await;

    for sql in ["select * from", "select * from a", "select * from root a"] {
        let result = interpreter.interpret(sql).await;
        assert_eq!(result.status, ResultCode::Error, "sql {:?}", sql);

        let output = CellOutput::from_result(&result, &RenderOptions::default());
        assert!(
            output.messages[0]
                .data
                .starts_with(&format!("{}: ", status::SYNTAX_ERROR)),
            "unexpected diagnostic {:?}",
            output.messages[0].data
        );
    }
}

#[tokio::test]
async fn test_later_statements_see_earlier_effects() {
    let interpreter = Interpreter::new(Arc::new(MemoryEngine::new()), FailurePolicy::StopOnError);

    let script = "SET STORAGE GROUP TO root.a;\n\
        CREATE TIMESERIES root.a.b WITH DATATYPE=BOOLEAN;\n\n\
        INSERT INTO root.a (timestamp,b) VALUES (1,true);\n\n\
        SELECT *\nFROM root.a\nWHERE time >= 1\n\tAND time <= 6;";
    let (code, text) = interpret_text(&interpreter, script).await;

    assert_eq!(code, ResultCode::Success);
    assert_eq!(
        text,
        "Sql executed.\n\nSql executed.\n\nSql executed.\n\nTime\troot.a.b\n1\ttrue"
    );
}

#[tokio::test]
async fn test_out_of_order_cell_fails_without_schema() {
    let interpreter = Interpreter::new(Arc::new(MemoryEngine::new()), FailurePolicy::Continue);

    let script = "INSERT INTO root.a (timestamp,b) VALUES (1,true);\n\
        SET STORAGE GROUP TO root.a;\n\
        CREATE TIMESERIES root.a.b WITH DATATYPE=BOOLEAN;";
    let (code, text) = interpret_text(&interpreter, script).await;

    assert_eq!(code, ResultCode::Error);
    assert_eq!(
        text,
        "304: timeseries root.a.b does not exist\n\nSql executed.\n\nSql executed."
    );
}

#[tokio::test]
async fn test_stop_on_error_across_cells() {
    let interpreter = Interpreter::new(Arc::new(MemoryEngine::new()), FailurePolicy::StopOnError);

    let (code, text) = interpret_text(
        &interpreter,
        "SET STORAGE GROUP TO root.a;\nSET STORAGE GROUP TO root.a;\nSHOW STORAGE GROUP;",
    )
    .await;

    assert_eq!(code, ResultCode::Error);
    assert_eq!(
        text,
        "Sql executed.\n\n\
         303: storage group root.a already exists\n\n\
         Not executed: SHOW STORAGE GROUP"
    );

    let (code, text) = interpret_text(&interpreter, "SHOW STORAGE GROUP").await;
    assert_eq!(code, ResultCode::Success);
    assert_eq!(text, "storage group\nroot.a");
}
