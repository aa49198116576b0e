//! Handler implementations for sqlite-mcp tools
//!
//! Each handler checks the statement shape, runs it through the executor and
//! maps the outcome onto a `CallToolResult`. Rejections and store faults come
//! back as `is_error = true` results; only a failure to serialize a result is
//! returned as `Err`.

use rmcp::{model::CallToolResult, ErrorData as McpError};

use crate::classify::StatementKind;
use crate::error::SqliteMcpError;
use crate::executor::QueryExecutor;
use crate::ledger::InsightLedger;
use crate::memo;
use crate::params::*;
use crate::response::{json_success, text_error, text_success};

const LIST_TABLES_SQL: &str = "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name";

// ============================================================================
// Helper Functions
// ============================================================================

fn rejected(operation: &str, message: &str) -> CallToolResult {
    let err = SqliteMcpError::Validation(message.to_string());
    tracing::warn!("{} rejected statement: {}", operation, err);
    text_error(err.to_string())
}

fn failed(operation: &str, err: SqliteMcpError) -> CallToolResult {
    tracing::warn!("{} failed: {}", operation, err);
    text_error(format!("Database error: {}", err))
}

// ============================================================================
// Queries
// ============================================================================

pub async fn read_query(
    executor: &QueryExecutor,
    params: ReadQueryParams,
) -> Result<CallToolResult, McpError> {
    if !StatementKind::of(&params.query).is_read() {
        return Ok(rejected(
            "read_query",
            "Only SELECT queries are allowed for read_query",
        ));
    }

    tracing::debug!("read_query: {}", params.query);

    match executor.execute(&params.query, &bind_params(params.params)).await {
        Ok(rows) => json_success(&rows),
        Err(e) => Ok(failed("read_query", e)),
    }
}

pub async fn write_query(
    executor: &QueryExecutor,
    params: WriteQueryParams,
) -> Result<CallToolResult, McpError> {
    if !StatementKind::of(&params.query).allows_write() {
        return Ok(rejected(
            "write_query",
            "SELECT queries are not allowed for write_query",
        ));
    }

    tracing::debug!("write_query: {}", params.query);

    match executor.execute(&params.query, &bind_params(params.params)).await {
        Ok(rows) => json_success(&rows),
        Err(e) => Ok(failed("write_query", e)),
    }
}

// ============================================================================
// Schema
// ============================================================================

pub async fn create_table(
    executor: &QueryExecutor,
    params: CreateTableParams,
) -> Result<CallToolResult, McpError> {
    if !StatementKind::of(&params.query).is_create_table() {
        return Ok(rejected(
            "create_table",
            "Only CREATE TABLE statements are allowed",
        ));
    }

    tracing::debug!("create_table: {}", params.query);

    match executor.execute_unbound(&params.query).await {
        Ok(_) => Ok(text_success("Table created successfully")),
        Err(e) => Ok(failed("create_table", e)),
    }
}

pub async fn list_tables(executor: &QueryExecutor) -> Result<CallToolResult, McpError> {
    match executor.execute_unbound(LIST_TABLES_SQL).await {
        Ok(rows) => json_success(&rows),
        Err(e) => Ok(failed("list_tables", e)),
    }
}

/// Column metadata via `PRAGMA table_info`
///
/// The table name is interpolated as given, without quoting. Callers are
/// trusted to pass a plain identifier.
pub async fn describe_table(
    executor: &QueryExecutor,
    params: DescribeTableParams,
) -> Result<CallToolResult, McpError> {
    let pragma = format!("PRAGMA table_info({})", params.table_name);

    match executor.execute_unbound(&pragma).await {
        Ok(rows) if rows.is_empty() => Ok(text_error(format!(
            "Table '{}' not found",
            params.table_name
        ))),
        Ok(rows) => json_success(&rows),
        Err(e) => Ok(failed("describe_table", e)),
    }
}

// ============================================================================
// Insights
// ============================================================================

pub async fn append_insight(
    ledger: &InsightLedger,
    params: AppendInsightParams,
) -> Result<CallToolResult, McpError> {
    if params.insight.trim().is_empty() {
        return Ok(rejected("append_insight", "Insight text must not be empty"));
    }

    ledger.append(params.insight).await;
    tracing::info!("Insight recorded ({} total)", ledger.len().await);

    Ok(text_success("Insight added to memo"))
}

/// Current memo text, rebuilt from the ledger
pub async fn read_memo(ledger: &InsightLedger) -> String {
    memo::synthesize(&ledger.snapshot().await)
}
