//! Query executor
//!
//! Every statement runs on its own connection: open, prepare, bind, fetch all
//! rows, close. The connection is closed on the error path as well, so a
//! failing statement never leaves a handle open. Work happens on the blocking
//! pool since rusqlite is synchronous.

use rusqlite::{types::ToSql, Batch, Connection, Statement};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{Result, SqliteMcpError};
use crate::types::{NamedParams, ResultSet, Row, SqlValue};

/// Runs statements against a SQLite database file
#[derive(Debug, Clone)]
pub struct QueryExecutor {
    path: Arc<PathBuf>,
}

impl QueryExecutor {
    /// Prepare the database at `path` and return an executor for it
    ///
    /// The path is made absolute, its parent directory is created if missing,
    /// and a connection is opened and closed once so the file exists before
    /// any statement runs.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let path = std::path::absolute(path).map_err(|e| SqliteMcpError::startup(path, e))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| SqliteMcpError::startup(parent, e))?;
        }

        let conn = Connection::open(&path).map_err(|e| SqliteMcpError::startup(&path, e))?;
        conn.close()
            .map_err(|(_, e)| SqliteMcpError::startup(&path, e))?;

        tracing::info!("Database ready at {}", path.display());

        Ok(Self {
            path: Arc::new(path),
        })
    }

    /// Absolute path of the database file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Execute a statement with named parameters and collect every row
    ///
    /// Statements that produce no columns (INSERT, CREATE TABLE, ...) yield a
    /// single `affected_rows` row.
    pub async fn execute(&self, sql: &str, params: &NamedParams) -> Result<ResultSet> {
        let path = Arc::clone(&self.path);
        let sql = sql.to_string();
        let params = params.clone();

        tokio::task::spawn_blocking(move || execute_blocking(&path, &sql, &params)).await?
    }

    /// Execute a statement that takes no parameters
    pub async fn execute_unbound(&self, sql: &str) -> Result<ResultSet> {
        self.execute(sql, &NamedParams::new()).await
    }
}

fn execute_blocking(path: &Path, sql: &str, params: &NamedParams) -> Result<ResultSet> {
    let conn = Connection::open(path)?;

    let outcome = run_statement(&conn, sql, params);
    let closed = conn.close().map_err(|(_, e)| SqliteMcpError::from(e));

    let rows = outcome?;
    closed?;
    Ok(rows)
}

fn run_statement(conn: &Connection, sql: &str, params: &NamedParams) -> Result<ResultSet> {
    let mut stmt = prepare_single(conn, sql)?;

    let named: Vec<(String, &SqlValue)> = params
        .iter()
        .map(|(name, value)| (placeholder(name), value))
        .collect();
    let bound: Vec<(&str, &dyn ToSql)> = named
        .iter()
        .map(|(name, value)| (name.as_str(), *value as &dyn ToSql))
        .collect();

    if stmt.column_count() == 0 {
        let affected = stmt.execute(bound.as_slice())?;
        return Ok(vec![Row::affected(affected)]);
    }

    let columns: Vec<String> = stmt
        .column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();

    let mut rows = stmt.query(bound.as_slice())?;
    let mut result = Vec::new();
    while let Some(row) = rows.next()? {
        let mut out = Row::new();
        for (i, column) in columns.iter().enumerate() {
            out.push(column.clone(), SqlValue::from(row.get_ref(i)?));
        }
        result.push(out);
    }

    Ok(result)
}

/// Prepare `sql`, refusing text that holds more than one statement
///
/// Trailing whitespace, semicolons and comments are fine. Nothing is executed
/// when a second statement is present.
fn prepare_single<'conn>(conn: &'conn Connection, sql: &str) -> Result<Statement<'conn>> {
    let mut batch = Batch::new(conn, sql);

    let stmt = batch
        .next()?
        .ok_or_else(|| SqliteMcpError::Validation("No SQL statement to execute".to_string()))?;

    if !matches!(batch.next(), Ok(None)) {
        return Err(SqliteMcpError::Validation(
            "Only one SQL statement can be executed per call".to_string(),
        ));
    }

    Ok(stmt)
}

/// Bare names bind as `:name`
fn placeholder(name: &str) -> String {
    if name.starts_with([':', '@', '$']) {
        name.to_string()
    } else {
        format!(":{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_executor() -> (TempDir, QueryExecutor) {
        let dir = TempDir::new().unwrap();
        let executor = QueryExecutor::open(dir.path().join("test.db")).unwrap();
        (dir, executor)
    }

    #[test]
    fn test_open_creates_directory_and_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("deeper").join("store.db");

        let executor = QueryExecutor::open(&path).unwrap();

        assert!(path.exists());
        assert!(executor.path().is_absolute());
    }

    #[tokio::test]
    async fn test_create_insert_select() {
        let (_dir, executor) = create_test_executor();

        let created = executor
            .execute_unbound("CREATE TABLE t (id INTEGER, name TEXT)")
            .await
            .unwrap();
        assert_eq!(created, vec![Row::affected(0)]);

        let inserted = executor
            .execute_unbound("INSERT INTO t VALUES (1, 'a'), (2, 'b')")
            .await
            .unwrap();
        assert_eq!(inserted[0].get("affected_rows"), Some(&SqlValue::Integer(2)));

        let rows = executor
            .execute_unbound("SELECT * FROM t ORDER BY id")
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("id"), Some(&SqlValue::Integer(1)));
        assert_eq!(rows[1].get("name"), Some(&SqlValue::Text("b".to_string())));
        assert_eq!(rows[0].column_names().collect::<Vec<_>>(), vec!["id", "name"]);
    }

    #[tokio::test]
    async fn test_named_params() {
        let (_dir, executor) = create_test_executor();
        executor
            .execute_unbound("CREATE TABLE t (id INTEGER, name TEXT, data BLOB)")
            .await
            .unwrap();

        let mut params = NamedParams::new();
        params.insert("id".to_string(), SqlValue::Integer(5));
        params.insert(":name".to_string(), SqlValue::Text("five".to_string()));
        params.insert("data".to_string(), SqlValue::Blob(vec![1, 2, 3]));
        executor
            .execute("INSERT INTO t VALUES (:id, :name, :data)", &params)
            .await
            .unwrap();

        let mut lookup = NamedParams::new();
        lookup.insert("id".to_string(), SqlValue::Integer(5));
        let rows = executor
            .execute("SELECT name, data FROM t WHERE id = :id", &lookup)
            .await
            .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("name").and_then(SqlValue::as_str), Some("five"));
        assert_eq!(rows[0].get("data"), Some(&SqlValue::Blob(vec![1, 2, 3])));
    }

    #[tokio::test]
    async fn test_store_errors_surface() {
        let (_dir, executor) = create_test_executor();

        let missing = executor.execute_unbound("SELECT * FROM nope").await;
        assert!(matches!(missing, Err(SqliteMcpError::Execution(_))));
        assert!(missing.unwrap_err().to_string().contains("no such table"));

        let syntax = executor.execute_unbound("SELEC oops").await;
        assert!(matches!(syntax, Err(SqliteMcpError::Execution(_))));
    }

    #[tokio::test]
    async fn test_usable_after_failure() {
        let (_dir, executor) = create_test_executor();
        executor
            .execute_unbound("CREATE TABLE t (id INTEGER PRIMARY KEY)")
            .await
            .unwrap();
        executor
            .execute_unbound("INSERT INTO t VALUES (1)")
            .await
            .unwrap();

        // Constraint violation
        assert!(executor
            .execute_unbound("INSERT INTO t VALUES (1)")
            .await
            .is_err());

        executor
            .execute_unbound("INSERT INTO t VALUES (2)")
            .await
            .unwrap();
        let rows = executor.execute_unbound("SELECT id FROM t").await.unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[tokio::test]
    async fn test_select_without_rows() {
        let (_dir, executor) = create_test_executor();
        executor
            .execute_unbound("CREATE TABLE t (id INTEGER)")
            .await
            .unwrap();

        let rows = executor.execute_unbound("SELECT * FROM t").await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_multiple_statements_rejected() {
        let (_dir, executor) = create_test_executor();
        executor
            .execute_unbound("CREATE TABLE t (id INTEGER, name TEXT)")
            .await
            .unwrap();

        let result = executor
            .execute_unbound("INSERT INTO t VALUES (1,'a'); DROP TABLE t")
            .await;
        assert!(matches!(result, Err(SqliteMcpError::Validation(_))));

        // Neither statement ran
        let rows = executor.execute_unbound("SELECT * FROM t").await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_trailing_semicolon_and_comment_allowed() {
        let (_dir, executor) = create_test_executor();

        let rows = executor
            .execute_unbound("SELECT 1 AS one;  -- done\n")
            .await
            .unwrap();
        assert_eq!(rows[0].get("one"), Some(&SqlValue::Integer(1)));
    }

    #[tokio::test]
    async fn test_empty_statement_rejected() {
        let (_dir, executor) = create_test_executor();

        let result = executor.execute_unbound("   ").await;
        assert!(matches!(result, Err(SqliteMcpError::Validation(_))));
    }

    #[tokio::test]
    async fn test_non_finite_real() {
        let (_dir, executor) = create_test_executor();

        let rows = executor.execute_unbound("SELECT 1e999 AS big").await.unwrap();
        let json = serde_json::to_value(&rows).unwrap();
        assert_eq!(json, serde_json::json!([{ "big": "inf" }]));
    }

    #[test]
    fn test_placeholder() {
        assert_eq!(placeholder("id"), ":id");
        assert_eq!(placeholder(":id"), ":id");
        assert_eq!(placeholder("@id"), "@id");
        assert_eq!(placeholder("$id"), "$id");
    }
}
