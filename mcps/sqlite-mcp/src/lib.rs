//! SQLite MCP Library
//!
//! Exposes a SQLite database to an agent through a small set of tools
//! (read, write, create/list/describe tables) and keeps a memo of business
//! insights recorded during the session.
//!
//! # Usage as Library
//!
//! ```rust,ignore
//! use sqlite_mcp::SqliteMcpServer;
//!
//! let server = SqliteMcpServer::new("/tmp/analytics.db")?;
//! let result = server
//!     .dispatch("read_query", serde_json::json!({ "query": "SELECT 1" }))
//!     .await?;
//! ```
//!
//! # Usage as Binary
//!
//! Run directly: `sqlite-mcp --db-path ~/data/analytics.db`
//!
//! Or configure in `.mcp.json`:
//! ```json
//! { "mcpServers": { "sqlite": { "command": "./sqlite-mcp", "args": ["--db-path", "analytics.db"] } } }
//! ```

pub mod classify;
pub mod config;
pub mod error;
pub mod executor;
pub mod handlers;
pub mod ledger;
pub mod memo;
pub mod params;
pub mod response;
pub mod server;
pub mod types;

// Re-export main server type
pub use server::SqliteMcpServer;

pub use error::SqliteMcpError;

// Re-export parameter types for direct API usage
pub use params::*;
