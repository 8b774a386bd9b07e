//! SQLite implementation of `StatementExecutor`

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use btchrr_core::{
    BtchrrError, ExecutionContext, ExecutionOutcome, Result, StatementExecutor, Value,
};
use parking_lot::Mutex;
use rusqlite::{Connection as RusqliteConnection, InterruptHandle, OpenFlags, Statement};
use tokio_util::sync::CancellationToken;

/// SQLite connection used as a batch executor
pub struct SqliteExecutor {
    conn: Arc<Mutex<RusqliteConnection>>,
    interrupt_handle: Arc<InterruptHandle>,
}

impl SqliteExecutor {
    /// Open a SQLite database file, creating it if missing.
    ///
    /// `:memory:` opens a private in-memory database.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        tracing::info!(path = %path.display(), "opening SQLite database");

        let conn = if path == Path::new(":memory:") {
            RusqliteConnection::open_in_memory().map_err(|e| {
                BtchrrError::Execution(format!("Failed to open in-memory database: {}", e))
            })?
        } else {
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
                && !parent.exists()
            {
                return Err(BtchrrError::InvalidConfiguration(format!(
                    "Parent directory does not exist: {}",
                    parent.display()
                )));
            }

            let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_URI
                | OpenFlags::SQLITE_OPEN_NO_MUTEX;
            RusqliteConnection::open_with_flags(path, flags).map_err(|e| {
                BtchrrError::Execution(format!(
                    "Failed to open SQLite database at '{}': {}",
                    path.display(),
                    e
                ))
            })?
        };

        Ok(Self::from_connection(conn))
    }

    /// Open a private in-memory database
    pub fn open_in_memory() -> Result<Self> {
        Self::open(":memory:")
    }

    /// Wrap an already-open rusqlite connection
    pub fn from_connection(conn: RusqliteConnection) -> Self {
        let interrupt_handle = Arc::new(conn.get_interrupt_handle());
        Self {
            conn: Arc::new(Mutex::new(conn)),
            interrupt_handle,
        }
    }

    /// Run a script of statements without parameters, e.g. schema setup
    pub fn execute_batch(&self, sql: &str) -> Result<()> {
        tracing::debug!("executing SQL script");
        self.conn
            .lock()
            .execute_batch(sql)
            .map_err(|e| BtchrrError::Execution(format!("Failed to execute batch: {}", e)))
    }

    /// Run a query returning a single integer
    pub fn query_i64(&self, sql: &str) -> Result<i64> {
        self.conn
            .lock()
            .query_row(sql, [], |row| row.get(0))
            .map_err(|e| BtchrrError::Execution(e.to_string()))
    }

    /// Count rows of `table`
    pub fn count_rows(&self, table: &str) -> Result<i64> {
        self.query_i64(&format!(
            "SELECT COUNT(*) FROM \"{}\"",
            table.replace('"', "\"\"")
        ))
    }

}

/// Interrupts the connection when an `execute` call is dropped before its
/// statement finished, e.g. on cancellation or deadline
struct InterruptOnDrop {
    handle: Arc<InterruptHandle>,
    abandoned: CancellationToken,
    armed: bool,
}

impl InterruptOnDrop {
    fn new(handle: Arc<InterruptHandle>) -> Self {
        Self {
            handle,
            abandoned: CancellationToken::new(),
            armed: true,
        }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for InterruptOnDrop {
    fn drop(&mut self) {
        if self.armed {
            tracing::debug!("interrupting SQLite statement");
            // A statement still queued checks `abandoned` before it starts
            self.abandoned.cancel();
            self.handle.interrupt();
        }
    }
}

#[async_trait]
impl StatementExecutor for SqliteExecutor {
    fn driver_name(&self) -> &str {
        "sqlite"
    }

    async fn check_statement(&self, sql: &str) -> Result<()> {
        let conn = self.conn.lock();
        conn.prepare(sql)
            .map(drop)
            .map_err(|e| BtchrrError::StatementInvalid(e.to_string()))
    }

    #[tracing::instrument(skip(self, ctx, sql, params), fields(sql_preview = %sql.chars().take(100).collect::<String>()))]
    async fn execute(
        &self,
        ctx: &ExecutionContext,
        sql: &str,
        params: &[Value],
    ) -> Result<ExecutionOutcome> {
        ctx.check()?;

        let mut guard = InterruptOnDrop::new(self.interrupt_handle.clone());
        let abandoned = guard.abandoned.clone();
        let conn = self.conn.clone();
        let sql = sql.to_string();
        let rusqlite_params = values_to_rusqlite(params);

        let task = tokio::task::spawn_blocking(move || {
            let conn = conn.lock();
            if abandoned.is_cancelled() {
                return Err(BtchrrError::Cancelled);
            }
            let mut stmt = conn.prepare(&sql).map_err(|e| {
                BtchrrError::Execution(format!("Failed to prepare statement: {}", e))
            })?;
            bind_positional(&mut stmt, &rusqlite_params)
                .and_then(|()| stmt.raw_execute())
                .map(|rows_affected| (rows_affected, conn.last_insert_rowid()))
                .map_err(|e| BtchrrError::Execution(format!("Failed to execute statement: {}", e)))
        });

        let joined = ctx
            .run(async {
                task.await
                    .map_err(|e| BtchrrError::Execution(format!("Statement task failed: {}", e)))
            })
            .await;
        // Any outcome other than a finished task leaves the guard armed
        let (rows_affected, rowid) = match joined {
            Ok(finished) => {
                guard.disarm();
                finished?
            }
            Err(e) => return Err(e),
        };

        tracing::debug!(
            affected_rows = rows_affected,
            last_insert_rowid = rowid,
            "statement executed"
        );
        Ok(ExecutionOutcome::new(
            rows_affected as u64,
            (rows_affected > 0 && rowid > 0).then_some(rowid),
        ))
    }
}

/// Bind `params` by position. `$n` and `?n` parameters take the n-th value;
/// SQLite would otherwise number `$n` by first appearance, so `($2, $1)`
/// would swap its columns.
fn bind_positional(
    stmt: &mut Statement<'_>,
    params: &[rusqlite::types::Value],
) -> rusqlite::Result<()> {
    let expected = stmt.parameter_count();
    if expected != params.len() {
        return Err(rusqlite::Error::InvalidParameterCount(params.len(), expected));
    }
    for index in 1..=expected {
        let position = stmt
            .parameter_name(index)
            .and_then(|name| name.strip_prefix(['$', '?']))
            .and_then(|n| n.parse::<usize>().ok())
            .filter(|&n| n > 0)
            .unwrap_or(index);
        let value = params
            .get(position - 1)
            .ok_or(rusqlite::Error::InvalidParameterCount(position, expected))?;
        stmt.raw_bind_parameter(index, value)?;
    }
    Ok(())
}

/// Convert our Value types to rusqlite-compatible types
fn values_to_rusqlite(values: &[Value]) -> Vec<rusqlite::types::Value> {
    values.iter().map(value_to_rusqlite).collect()
}

fn value_to_rusqlite(value: &Value) -> rusqlite::types::Value {
    match value {
        Value::Null => rusqlite::types::Value::Null,
        Value::Bool(b) => rusqlite::types::Value::Integer(if *b { 1 } else { 0 }),
        Value::Int64(i) => rusqlite::types::Value::Integer(*i),
        Value::Float64(f) => rusqlite::types::Value::Real(*f),
        Value::String(s) => rusqlite::types::Value::Text(s.clone()),
        Value::Bytes(b) => rusqlite::types::Value::Blob(b.clone()),
        Value::Json(j) => rusqlite::types::Value::Text(j.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_conversion() {
        assert_eq!(
            value_to_rusqlite(&Value::Bool(true)),
            rusqlite::types::Value::Integer(1)
        );
        assert_eq!(
            value_to_rusqlite(&Value::Json(serde_json::json!([1, 2]))),
            rusqlite::types::Value::Text("[1,2]".into())
        );
        assert_eq!(value_to_rusqlite(&Value::Null), rusqlite::types::Value::Null);
    }

    #[tokio::test]
    async fn test_check_rejects_unknown_table() {
        let executor = SqliteExecutor::open_in_memory().unwrap();
        let err = executor
            .check_statement("INSERT INTO missing (id) VALUES (?)")
            .await
            .unwrap_err();
        assert!(matches!(err, BtchrrError::StatementInvalid(_)));
    }

    #[tokio::test]
    async fn test_check_does_not_execute() {
        let executor = SqliteExecutor::open_in_memory().unwrap();
        executor.execute_batch("CREATE TABLE t (id INTEGER)").unwrap();

        executor
            .check_statement("INSERT INTO t (id) VALUES (1)")
            .await
            .unwrap();

        assert_eq!(executor.count_rows("t").unwrap(), 0);
    }

    #[tokio::test]
    async fn test_execute_reports_rows_and_rowid() {
        let executor = SqliteExecutor::open_in_memory().unwrap();
        executor
            .execute_batch("CREATE TABLE t (id INTEGER PRIMARY KEY, name TEXT)")
            .unwrap();

        let outcome = executor
            .execute(
                &ExecutionContext::new(),
                "INSERT INTO t (name) VALUES (?), (?);",
                &[Value::from("a"), Value::from("b")],
            )
            .await
            .unwrap();

        assert_eq!(outcome.affected_rows, 2);
        assert_eq!(outcome.last_insert_id, Some(2));
    }

    #[tokio::test]
    async fn test_execute_respects_cancelled_context() {
        let executor = SqliteExecutor::open_in_memory().unwrap();
        executor.execute_batch("CREATE TABLE t (id INTEGER)").unwrap();
        let ctx = ExecutionContext::new();
        ctx.cancel();

        let err = executor
            .execute(&ctx, "INSERT INTO t (id) VALUES (?)", &[Value::from(1)])
            .await
            .unwrap_err();

        assert!(matches!(err, BtchrrError::Cancelled));
        assert_eq!(executor.count_rows("t").unwrap(), 0);
    }

    // Inserts a billion generated rows; only ever stopped by an interrupt
    const ENDLESS_INSERT: &str = "WITH RECURSIVE n(x) AS \
        (SELECT 1 UNION ALL SELECT x + 1 FROM n LIMIT 1000000000) \
        INSERT INTO t (id) SELECT x FROM n";

    #[tokio::test(flavor = "multi_thread")]
    async fn test_cancel_interrupts_running_statement() {
        let executor = SqliteExecutor::open_in_memory().unwrap();
        executor.execute_batch("CREATE TABLE t (id INTEGER)").unwrap();
        let ctx = ExecutionContext::new();
        let canceller = ctx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(50)).await;
            canceller.cancel();
        });

        let err = tokio::time::timeout(
            std::time::Duration::from_secs(30),
            executor.execute(&ctx, ENDLESS_INSERT, &[]),
        )
        .await
        .expect("statement was interrupted")
        .unwrap_err();

        assert!(matches!(err, BtchrrError::Cancelled));
        // Waits for the interrupted statement to roll back
        assert_eq!(executor.count_rows("t").unwrap(), 0);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_deadline_interrupts_running_statement() {
        let executor = SqliteExecutor::open_in_memory().unwrap();
        executor.execute_batch("CREATE TABLE t (id INTEGER)").unwrap();
        let ctx = ExecutionContext::with_timeout(std::time::Duration::from_millis(50));

        let err = tokio::time::timeout(
            std::time::Duration::from_secs(30),
            executor.execute(&ctx, ENDLESS_INSERT, &[]),
        )
        .await
        .expect("statement was interrupted")
        .unwrap_err();

        assert!(matches!(err, BtchrrError::Timeout(_)));
        assert_eq!(executor.count_rows("t").unwrap(), 0);
    }

    #[tokio::test]
    async fn test_numbered_parameters_bind_by_number() {
        let executor = SqliteExecutor::open_in_memory().unwrap();
        executor.execute_batch("CREATE TABLE t (a TEXT, b TEXT)").unwrap();

        executor
            .execute(
                &ExecutionContext::new(),
                "INSERT INTO t (a, b) VALUES ($2, $1), ($4, $3)",
                &[
                    Value::from("one"),
                    Value::from("two"),
                    Value::from("three"),
                    Value::from("four"),
                ],
            )
            .await
            .unwrap();

        let swapped = executor
            .query_i64(
                "SELECT COUNT(*) FROM t WHERE (a = 'two' AND b = 'one') OR (a = 'four' AND b = 'three')",
            )
            .unwrap();
        assert_eq!(swapped, 2);
    }

    #[tokio::test]
    async fn test_repeated_number_binds_once() {
        let executor = SqliteExecutor::open_in_memory().unwrap();
        executor.execute_batch("CREATE TABLE t (a INTEGER, b INTEGER)").unwrap();

        let outcome = executor
            .execute(
                &ExecutionContext::new(),
                "INSERT INTO t (a, b) VALUES ($1, $1), ($2, $2)",
                &[Value::from(7), Value::from(8)],
            )
            .await
            .unwrap();

        assert_eq!(outcome.affected_rows, 2);
        assert_eq!(
            executor.query_i64("SELECT COUNT(*) FROM t WHERE a = b").unwrap(),
            2
        );
    }

    #[tokio::test]
    async fn test_parameter_count_mismatch_fails() {
        let executor = SqliteExecutor::open_in_memory().unwrap();
        executor.execute_batch("CREATE TABLE t (id INTEGER)").unwrap();

        let err = executor
            .execute(
                &ExecutionContext::new(),
                "INSERT INTO t (id) VALUES (?), (?)",
                &[Value::from(1)],
            )
            .await
            .unwrap_err();

        assert!(matches!(err, BtchrrError::Execution(_)));
        assert_eq!(executor.count_rows("t").unwrap(), 0);
    }

    #[test]
    fn test_open_missing_parent_dir() {
        let err = SqliteExecutor::open("/nonexistent-btchrr-dir/sub/db.sqlite").err();
        assert!(matches!(err, Some(BtchrrError::InvalidConfiguration(_))));
    }
}
