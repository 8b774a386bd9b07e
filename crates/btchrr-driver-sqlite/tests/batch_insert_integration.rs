//! End-to-end batched inserts against SQLite

use std::sync::Arc;

use btchrr_batch::{BatchInserter, BatchOptions, GroupSizing};
use btchrr_core::{BtchrrError, ExecutionContext, Value};
use btchrr_driver_sqlite::SqliteExecutor;

fn users_db() -> Arc<SqliteExecutor> {
    let executor = SqliteExecutor::open_in_memory().expect("open in-memory database");
    executor
        .execute_batch(
            "CREATE TABLE users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE,
                age INTEGER
            )",
        )
        .expect("create table");
    Arc::new(executor)
}

fn user_rows(n: usize) -> Vec<Vec<Value>> {
    (0..n)
        .map(|i| vec![Value::from(format!("user-{i}")), Value::from(20 + i as i64)])
        .collect()
}

fn inserter(executor: Arc<SqliteExecutor>, batch_size: usize) -> BatchInserter {
    BatchInserter::new(BatchOptions::new().with_batch_size(batch_size), executor)
        .expect("valid options")
}

#[tokio::test]
async fn test_inserts_all_rows_across_batches() {
    let db = users_db();
    let result = inserter(db.clone(), 3)
        .execute(
            &ExecutionContext::new(),
            "INSERT INTO users (name, age) VALUES (?, ?)",
            &user_rows(10),
        )
        .await
        .unwrap();

    assert_eq!(result.batches, 4);
    assert_eq!(result.affected_rows, 10);
    assert_eq!(result.last_insert_id, Some(10));
    assert_eq!(db.count_rows("users").unwrap(), 10);
}

#[tokio::test]
async fn test_numbered_placeholders_bind_in_order() {
    let db = users_db();
    inserter(db.clone(), 4)
        .execute(
            &ExecutionContext::new(),
            "INSERT INTO users (name, age) VALUES ($1, $2)",
            &user_rows(6),
        )
        .await
        .unwrap();

    let age = db
        .query_i64("SELECT age FROM users WHERE name = 'user-5' AND id = 6")
        .unwrap();
    assert_eq!(age, 25);
}

#[tokio::test]
async fn test_malformed_statement_inserts_nothing() {
    let db = users_db();
    let err = inserter(db.clone(), 2)
        .execute(
            &ExecutionContext::new(),
            "INSERT INTO users (name, missing_column) VALUES (?, ?)",
            &user_rows(4),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, BtchrrError::StatementInvalid(_)));
    assert_eq!(db.count_rows("users").unwrap(), 0);
}

#[tokio::test]
async fn test_failure_keeps_earlier_batches() {
    let db = users_db();
    let mut rows = user_rows(5);
    // Duplicate lands in the second batch of two
    rows[3] = rows[0].clone();

    let err = inserter(db.clone(), 2)
        .execute(
            &ExecutionContext::new(),
            "INSERT INTO users (name, age) VALUES (?, ?)",
            &rows,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, BtchrrError::Execution(_)));
    assert_eq!(db.count_rows("users").unwrap(), 2);
}

#[tokio::test]
async fn test_legacy_sizing_fails_on_short_final_batch() {
    let db = users_db();
    let options = BatchOptions::new()
        .with_batch_size(2)
        .with_row_sizing(GroupSizing::ConfiguredBatchSize);
    let err = BatchInserter::new(options, db.clone())
        .unwrap()
        .execute(
            &ExecutionContext::new(),
            "INSERT INTO users (name, age) VALUES (?, ?)",
            &user_rows(3),
        )
        .await
        .unwrap_err();

    // The third row's statement has four placeholders but two values
    assert!(matches!(err, BtchrrError::Execution(_)));
    assert_eq!(db.count_rows("users").unwrap(), 2);
}

#[tokio::test]
async fn test_on_disk_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("batched.db");

    {
        let db = Arc::new(SqliteExecutor::open(&path).unwrap());
        db.execute_batch("CREATE TABLE events (id INTEGER PRIMARY KEY, kind TEXT)")
            .unwrap();
        let kinds: Vec<Value> = ["open", "click", "close"].into_iter().map(Value::from).collect();

        let result = inserter(db, 2)
            .execute(
                &ExecutionContext::new(),
                "insert into events (kind) values (?);",
                &kinds,
            )
            .await
            .unwrap();
        assert_eq!(result.affected_rows, 3);
    }

    let reopened = SqliteExecutor::open(&path).unwrap();
    assert_eq!(reopened.count_rows("events").unwrap(), 3);
}

#[tokio::test]
async fn test_row_expressions_apply_to_every_row() {
    let db = users_db();
    let rows: Vec<Vec<Value>> = ["Ada", "GRACE", "Linus"]
        .into_iter()
        .map(|name| vec![Value::from(name)])
        .collect();

    inserter(db.clone(), 2)
        .execute(
            &ExecutionContext::new(),
            "INSERT INTO users (name, age) VALUES (lower(?), 30)",
            &rows,
        )
        .await
        .unwrap();

    let lowered = db
        .query_i64("SELECT COUNT(*) FROM users WHERE name = lower(name) AND age = 30")
        .unwrap();
    assert_eq!(lowered, 3);
}

#[tokio::test]
async fn test_reordered_numbered_placeholders_match_single_row() {
    let db = users_db();
    let rows = vec![
        vec![Value::from(41), Value::from("first")],
        vec![Value::from(42), Value::from("second")],
        vec![Value::from(43), Value::from("third")],
    ];

    inserter(db.clone(), 2)
        .execute(
            &ExecutionContext::new(),
            "INSERT INTO users (name, age) VALUES ($2, $1)",
            &rows,
        )
        .await
        .unwrap();

    let matching = db
        .query_i64(
            "SELECT COUNT(*) FROM users WHERE (name, age) IN \
             (VALUES ('first', 41), ('second', 42), ('third', 43))",
        )
        .unwrap();
    assert_eq!(matching, 3);
}
