//! Whole-table evaluation: parallel scans, batch error policy, config.

use proptest::prelude::*;
use sqlfn_error::SqlFnError;
use sqlfn_eval::{
    Column, EvalConfig, Evaluator, Expr, PARALLEL_THRESHOLD_ENV, Query, ResultSet, Schema, Table,
};
use sqlfn_func::FunctionRegistry;
use sqlfn_types::{Value, ValueType};

fn word_table(words: &[Option<String>], xs: &[f64]) -> Table {
    let mut table = Table::new(
        "words",
        Schema::new(vec![
            Column::new("id", ValueType::Integer),
            Column::new("w", ValueType::Text),
            Column::new("x", ValueType::Double),
        ]),
    );
    for (id, (w, x)) in (0_i64..).zip(words.iter().zip(xs)) {
        table
            .insert(vec![
                Value::Integer(id),
                Value::from(w.clone()),
                Value::Double(*x),
            ])
            .unwrap();
    }
    table
}

fn mixed_query() -> Query {
    Query::new()
        .select("id", Expr::column("id"))
        .select("upper_w", Expr::call("upper", vec![Expr::column("w")]))
        .select("pos", Expr::position(Expr::literal("b"), Expr::column("w")))
        .select("l", Expr::call("log2", vec![Expr::column("x")]))
        .with_filter(Expr::column("w").like(Expr::literal("%a%")).not())
}

fn run(table: &Table, query: &Query, config: &EvalConfig) -> Result<ResultSet, SqlFnError> {
    let registry = FunctionRegistry::with_builtins();
    Evaluator::new(&registry, config).execute(table, query)
}

fn sequential() -> EvalConfig {
    EvalConfig::default().with_threshold_override("disabled")
}

fn always_parallel() -> EvalConfig {
    EvalConfig {
        parallel_threshold: 0,
        ..EvalConfig::default()
    }
}

fn word_strategy() -> impl Strategy<Value = Option<String>> {
    prop::option::of("[abB]{0,6}")
}

proptest! {
    #[test]
    fn prop_parallel_scan_equals_sequential(
        words in proptest::collection::vec(word_strategy(), 0..64),
        xs in proptest::collection::vec(-4.0_f64..64.0, 64),
    ) {
        let table = word_table(&words, &xs);
        let a = run(&table, &mixed_query(), &sequential()).unwrap();
        let b = run(&table, &mixed_query(), &always_parallel()).unwrap();
        prop_assert_eq!(a, b);
    }

    #[test]
    fn prop_filtered_rows_never_contain_a(
        words in proptest::collection::vec(word_strategy(), 0..32),
    ) {
        let xs = vec![1.0; words.len()];
        let table = word_table(&words, &xs);
        let rs = run(&table, &mixed_query(), &always_parallel()).unwrap();
        for row in &rs.rows {
            let upper = row[1].as_text().unwrap();
            prop_assert!(!upper.contains('A'));
        }
        // NULL words give a NULL filter and are dropped with the 'a' words.
        let kept = words
            .iter()
            .filter(|w| w.as_deref().is_some_and(|w| !w.contains('a')))
            .count();
        prop_assert_eq!(rs.len() + rs.errors.len(), kept);
    }
}

#[test]
fn test_lenient_batch_keeps_unrelated_rows() {
    let words: Vec<Option<String>> = ["bb", "b", "bbb"]
        .iter()
        .map(|w| Some((*w).to_owned()))
        .collect();
    let table = word_table(&words, &[8.0, 0.0, 2.0]);
    let rs = run(&table, &mixed_query(), &EvalConfig::default()).unwrap();
    let ids: Vec<&Value> = rs.column_values("id").unwrap();
    assert_eq!(ids, [&Value::Integer(0), &Value::Integer(2)]);
    assert_eq!(rs.errors.len(), 1);
    assert_eq!(rs.errors[0].row, 1);
    assert_eq!(rs.value(0, "l"), Some(&Value::Double(3.0)));
    assert_eq!(rs.value(0, "pos"), Some(&Value::Integer(1)));
}

#[test]
fn test_strict_batch_fails_whole_query() {
    let words: Vec<Option<String>> = vec![Some("b".to_owned()), Some("b".to_owned())];
    let table = word_table(&words, &[1.0, -3.0]);
    let config = EvalConfig::from_json_str(r#"{"strict_batch": true}"#).unwrap();
    let err = run(&table, &mixed_query(), &config).unwrap_err();
    assert!(matches!(err, SqlFnError::DomainError { ref function, .. } if function == "log2"));
    assert!(err.is_row_local());
}

#[test]
fn test_strict_and_lenient_agree_without_errors() {
    let words: Vec<Option<String>> = vec![Some("ab".to_owned()), None, Some("bb".to_owned())];
    let table = word_table(&words, &[1.0, 2.0, 4.0]);
    let lenient = run(&table, &mixed_query(), &EvalConfig::default()).unwrap();
    let strict = run(&table, &mixed_query(), &EvalConfig::strict()).unwrap();
    assert_eq!(lenient, strict);
    assert_eq!(strict.len(), 1);
}

#[test]
fn test_parallel_preserves_scan_order_on_large_table() {
    let n = 10_000;
    let words: Vec<Option<String>> = (0..n).map(|i| Some(format!("b{i}"))).collect();
    let xs: Vec<f64> = (1..=n).map(f64::from).collect();
    let table = word_table(&words, &xs);
    let config = EvalConfig::default();
    assert!(config.should_parallelize(table.len()));
    let rs = run(&table, &mixed_query(), &config).unwrap();
    assert_eq!(rs.len(), 10_000);
    for (i, row) in (0_i64..).zip(&rs.rows) {
        assert_eq!(row[0], Value::Integer(i));
    }
}

#[test]
fn test_bind_time_errors_are_not_recorded_per_row() {
    let table = word_table(&[Some("b".to_owned())], &[1.0]);
    let query = Query::new().select("x", Expr::call("log2", vec![]));
    let err = run(&table, &query, &EvalConfig::default()).unwrap_err();
    assert!(err.is_bind_time(), "{err:?}");
    assert!(!err.is_row_local());
}

#[test]
fn test_prepare_reports_missing_column() {
    let evaluator = Evaluator::builtin();
    let schema = Schema::new(vec![Column::new("w", ValueType::Text)]);
    let err = evaluator
        .prepare(&Expr::call("lower", vec![Expr::column("missing")]), &schema)
        .unwrap_err();
    assert_eq!(
        err,
        SqlFnError::NoSuchColumn {
            name: "missing".to_owned()
        }
    );
    let ok = evaluator.prepare(&Expr::call("LOWER", vec![Expr::column("W")]), &schema);
    assert!(ok.is_ok());
}

const CHILD_MARKER: &str = "SQLFN_BATCH_EVAL_CHILD";

/// Runs only inside the child process spawned by
/// `test_builtin_evaluator_reads_threshold_from_env`.
#[test]
fn env_threshold_child() {
    if std::env::var(CHILD_MARKER).is_err() {
        return;
    }
    assert_eq!(EvalConfig::global().parallel_threshold, 77);
    assert_eq!(Evaluator::builtin().config().parallel_threshold, 77);
    assert!(Evaluator::builtin().config().should_parallelize(77));
}

#[test]
fn test_builtin_evaluator_reads_threshold_from_env() {
    let exe = std::env::current_exe().unwrap();
    let status = std::process::Command::new(exe)
        .args(["--exact", "env_threshold_child", "--nocapture"])
        .env(CHILD_MARKER, "1")
        .env(PARALLEL_THRESHOLD_ENV, "77")
        .status()
        .unwrap();
    assert!(status.success());
}

