//! SQLite MCP Server
//!
//! Serves a SQLite database and a business insights memo over stdio.

use std::path::PathBuf;

use clap::Parser;
use rmcp::{transport::io::stdio, ServiceExt};
use sqlite_mcp::{config::SqliteConfig, SqliteMcpServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "sqlite-mcp")]
#[command(about = "MCP server for SQLite queries and business insight capture")]
struct Cli {
    /// Path to the SQLite database file (created if missing)
    #[arg(long, env = "SQLITE_MCP_DB_PATH")]
    db_path: Option<PathBuf>,

    /// Path to a TOML config file (default: ~/.binks/sqlite.toml)
    #[arg(long, env = "SQLITE_MCP_CONFIG")]
    config: Option<PathBuf>,
}

/// Filter used when `RUST_LOG` is unset or unparseable
const DEFAULT_LOG_DIRECTIVE: &str = "sqlite_mcp=info";

fn log_filter(rust_log: Option<&str>) -> EnvFilter {
    rust_log
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_DIRECTIVE))
}

/// Logging goes to stderr; stdout carries the MCP protocol.
/// `RUST_LOG` replaces the default filter entirely.
/// Set `LOG_FORMAT=json` for structured output.
fn init_tracing() -> anyhow::Result<()> {
    let filter = log_filter(std::env::var("RUST_LOG").ok().as_deref());

    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);

    if use_json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(false),
            )
            .init();
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing()?;

    tracing::info!("Starting SQLite MCP server");

    let config = SqliteConfig::load(cli.config.as_deref())?;
    let db_path = config.resolve_db_path(cli.db_path.as_deref())?;

    let server = SqliteMcpServer::new(&db_path)?;
    tracing::info!("Using database {}", server.db_path().display());

    let service = server.serve(stdio()).await?;

    tracing::info!("SQLite MCP server running");

    service.waiting().await?;

    tracing::info!("SQLite MCP server stopped");

    Ok(())
}
