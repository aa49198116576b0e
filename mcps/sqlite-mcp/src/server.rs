//! MCP Server implementation for SQLite access and insight capture
//!
//! This module defines the main MCP server that exposes the database as tools,
//! the insights memo as a resource, and the `mcp-demo` prompt.
//! Handler implementations are in the handlers module.

use rmcp::{
    handler::server::{
        router::{prompt::PromptRouter, tool::ToolRouter},
        wrapper::Parameters,
    },
    model::{
        AnnotateAble, CallToolResult, GetPromptRequestParam, GetPromptResult, ListPromptsResult,
        ListResourcesResult, PaginatedRequestParam, PromptMessage, PromptMessageRole, RawResource,
        ReadResourceRequestParam, ReadResourceResult, Resource, ResourceContents,
        ResourceUpdatedNotificationParam, ServerCapabilities, ServerInfo, Tool,
    },
    prompt, prompt_handler, prompt_router,
    service::RequestContext,
    tool, tool_handler, tool_router, ErrorData as McpError, RoleServer, ServerHandler,
};
use serde_json::Value;
use std::path::Path;

use crate::error::SqliteMcpError;
use crate::executor::QueryExecutor;
use crate::handlers;
use crate::ledger::InsightLedger;
use crate::memo::{MEMO_MIME_TYPE, MEMO_NAME, MEMO_URI};
use crate::params::*;
use crate::response::is_error;

const INSTRUCTIONS: &str = "SQLite database MCP server with a business insights memo. \
    Use read_query for SELECT statements, write_query for INSERT/UPDATE/DELETE, \
    create_table to add tables, list_tables and describe_table to explore the schema, \
    and append_insight to record findings. The memo://insights resource holds the \
    memo built from all recorded insights.";

/// The main SQLite MCP Server
#[derive(Clone)]
pub struct SqliteMcpServer {
    executor: QueryExecutor,
    ledger: InsightLedger,
    tool_router: ToolRouter<Self>,
    prompt_router: PromptRouter<Self>,
}

// ============================================================================
// Tool Router - Each tool delegates to its handler
// ============================================================================

#[tool_router]
impl SqliteMcpServer {
    /// Create a server for the database at `db_path`
    ///
    /// The database file and its directory are created if needed. Each server
    /// starts with an empty insight ledger.
    pub fn new(db_path: impl AsRef<Path>) -> Result<Self, SqliteMcpError> {
        let executor = QueryExecutor::open(db_path)?;

        Ok(Self {
            executor,
            ledger: InsightLedger::new(),
            tool_router: Self::tool_router(),
            prompt_router: Self::prompt_router(),
        })
    }

    // ========================================================================
    // Queries
    // ========================================================================

    #[tool(description = "Execute a SELECT query on the SQLite database. Returns the rows as a JSON array of objects. Supports named parameters. Only one statement per call.")]
    async fn read_query(
        &self,
        Parameters(params): Parameters<ReadQueryParams>,
    ) -> Result<CallToolResult, McpError> {
        handlers::read_query(&self.executor, params).await
    }

    #[tool(description = "Execute an INSERT, UPDATE, or DELETE query on the SQLite database. SELECT statements are rejected. Only one statement per call.")]
    async fn write_query(
        &self,
        Parameters(params): Parameters<WriteQueryParams>,
    ) -> Result<CallToolResult, McpError> {
        handlers::write_query(&self.executor, params).await
    }

    // ========================================================================
    // Schema
    // ========================================================================

    #[tool(description = "Create a new table in the SQLite database. Only CREATE TABLE statements are accepted.")]
    async fn create_table(
        &self,
        Parameters(params): Parameters<CreateTableParams>,
    ) -> Result<CallToolResult, McpError> {
        handlers::create_table(&self.executor, params).await
    }

    #[tool(description = "List all tables in the SQLite database")]
    async fn list_tables(&self) -> Result<CallToolResult, McpError> {
        handlers::list_tables(&self.executor).await
    }

    #[tool(description = "Get the column definitions of a table: name, type, nullability, default value, and primary key flag")]
    async fn describe_table(
        &self,
        Parameters(params): Parameters<DescribeTableParams>,
    ) -> Result<CallToolResult, McpError> {
        handlers::describe_table(&self.executor, params).await
    }

    // ========================================================================
    // Insights
    // ========================================================================

    #[tool(description = "Add a business insight to the memo. The memo://insights resource is updated and subscribers are notified.")]
    async fn append_insight(
        &self,
        Parameters(params): Parameters<AppendInsightParams>,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let result = handlers::append_insight(&self.ledger, params).await?;

        if !is_error(&result) {
            let notification = ResourceUpdatedNotificationParam {
                uri: MEMO_URI.to_string(),
            };
            if let Err(e) = context.peer.notify_resource_updated(notification).await {
                tracing::warn!("Failed to notify memo update: {}", e);
            }
        }

        Ok(result)
    }
}

// ============================================================================
// Prompt Router
// ============================================================================

#[prompt_router]
impl SqliteMcpServer {
    #[prompt(
        name = "mcp-demo",
        description = "Seed the database with data on a topic and walk through an analysis that builds the insights memo"
    )]
    async fn mcp_demo(
        &self,
        Parameters(args): Parameters<DemoPromptArgs>,
    ) -> Result<GetPromptResult, McpError> {
        tracing::debug!("Building demo prompt for topic: {}", args.topic);

        Ok(GetPromptResult {
            description: Some(format!("Demo template for {}", args.topic)),
            messages: vec![PromptMessage::new_text(
                PromptMessageRole::User,
                demo_prompt(&args.topic),
            )],
        })
    }
}

fn demo_prompt(topic: &str) -> String {
    format!(
        "You are walking a user through a business intelligence exercise on the topic \
         \"{topic}\" using an SQLite database exposed through tools.\n\n\
         1. Invent a short, realistic business scenario around {topic} and explain it.\n\
         2. Design two or three related tables for the scenario and create them with \
            create_table. Use list_tables and describe_table to confirm the schema.\n\
         3. Populate the tables with a few dozen plausible rows using write_query.\n\
         4. Offer the user a handful of questions the data could answer, then run \
            read_query to answer the one they pick.\n\
         5. Whenever an analysis reveals something noteworthy, record it with \
            append_insight. The memo://insights resource collects every insight into \
            a memo the user can read at any time.\n\
         6. Finish by summarising what the memo now says and suggesting next steps.\n\n\
         Keep each step brief and ask the user before moving on."
    )
}

// ============================================================================
// Direct Dispatch
// ============================================================================

impl SqliteMcpServer {
    /// Call a tool by name without going through an MCP transport
    ///
    /// Insight updates made this way do not send resource notifications, since
    /// there is no connected peer.
    pub async fn dispatch(&self, name: &str, args: Value) -> Result<CallToolResult, SqliteMcpError> {
        let result = match name {
            "read_query" => {
                let params: ReadQueryParams = serde_json::from_value(args)?;
                handlers::read_query(&self.executor, params).await
            }
            "write_query" => {
                let params: WriteQueryParams = serde_json::from_value(args)?;
                handlers::write_query(&self.executor, params).await
            }
            "create_table" => {
                let params: CreateTableParams = serde_json::from_value(args)?;
                handlers::create_table(&self.executor, params).await
            }
            "list_tables" => handlers::list_tables(&self.executor).await,
            "describe_table" => {
                let params: DescribeTableParams = serde_json::from_value(args)?;
                handlers::describe_table(&self.executor, params).await
            }
            "append_insight" => {
                let params: AppendInsightParams = serde_json::from_value(args)?;
                handlers::append_insight(&self.ledger, params).await
            }
            _ => return Err(SqliteMcpError::UnknownOperation(name.to_string())),
        };

        Ok(result?)
    }

    /// Current memo text, as served by the memo resource
    pub async fn memo(&self) -> String {
        handlers::read_memo(&self.ledger).await
    }

    pub fn list_tools(&self) -> Vec<Tool> {
        self.tool_router.list_all()
    }

    pub fn ledger(&self) -> &InsightLedger {
        &self.ledger
    }

    pub fn db_path(&self) -> &Path {
        self.executor.path()
    }
}

fn memo_resource() -> Resource {
    let mut resource = RawResource::new(MEMO_URI, MEMO_NAME.to_string());
    resource.description = Some("A living document of discovered business insights".to_string());
    resource.mime_type = Some(MEMO_MIME_TYPE.to_string());
    resource.no_annotation()
}

fn memo_contents(memo: String, uri: String) -> ResourceContents {
    let mut contents = ResourceContents::text(memo, uri);
    if let ResourceContents::TextResourceContents { mime_type, .. } = &mut contents {
        *mime_type = Some(MEMO_MIME_TYPE.to_string());
    }
    contents
}

// ============================================================================
// Server Handler Implementation
// ============================================================================

#[tool_handler]
#[prompt_handler]
impl ServerHandler for SqliteMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(INSTRUCTIONS.into()),
            capabilities: ServerCapabilities::builder()
                .enable_prompts()
                .enable_resources()
                .enable_tools()
                .build(),
            ..Default::default()
        }
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, McpError> {
        Ok(ListResourcesResult::with_all_items(vec![memo_resource()]))
    }

    async fn read_resource(
        &self,
        request: ReadResourceRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, McpError> {
        if request.uri != MEMO_URI {
            return Err(McpError::resource_not_found(
                format!("Unknown resource: {}", request.uri),
                Some(serde_json::json!({ "uri": request.uri })),
            ));
        }

        let memo = handlers::read_memo(&self.ledger).await;
        Ok(ReadResourceResult {
            contents: vec![memo_contents(memo, request.uri)],
        })
    }
}
