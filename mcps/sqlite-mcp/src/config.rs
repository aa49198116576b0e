//! Configuration for SQLite MCP Server

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::{Result, SqliteMcpError};

/// SQLite MCP configuration file (`~/.binks/sqlite.toml`)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SqliteConfig {
    /// Database settings
    #[serde(default)]
    pub database: DatabaseConfig,
}

/// Database configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file
    pub path: Option<PathBuf>,
}

impl SqliteConfig {
    /// Load configuration from file
    ///
    /// An explicit path must exist and parse. Without one, `~/.binks/sqlite.toml`
    /// is read if present; otherwise the defaults apply.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let config_path = match explicit {
            Some(path) => expand_tilde(path),
            None => match default_config_path() {
                Some(path) if path.exists() => path,
                _ => return Ok(Self::default()),
            },
        };

        let content = std::fs::read_to_string(&config_path).map_err(|e| {
            SqliteMcpError::Config(format!(
                "Failed to read config from {}: {}",
                config_path.display(),
                e
            ))
        })?;

        let config = Self::parse(&content).map_err(|e| {
            SqliteMcpError::Config(format!(
                "Failed to parse config from {}: {}",
                config_path.display(),
                e
            ))
        })?;

        tracing::info!("Loaded config from {}", config_path.display());
        Ok(config)
    }

    pub fn parse(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Pick the database path: command line, then config file, then default
    pub fn resolve_db_path(&self, cli: Option<&Path>) -> Result<PathBuf> {
        if let Some(path) = cli.or(self.database.path.as_deref()) {
            return Ok(expand_tilde(path));
        }

        default_db_path()
    }
}

fn binks_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".binks"))
}

fn default_config_path() -> Option<PathBuf> {
    binks_dir().map(|dir| dir.join("sqlite.toml"))
}

/// `~/.binks/sqlite-mcp.db`
pub fn default_db_path() -> Result<PathBuf> {
    binks_dir()
        .map(|dir| dir.join("sqlite-mcp.db"))
        .ok_or_else(|| SqliteMcpError::Config("Could not determine home directory".to_string()))
}

/// Resolve a leading `~/` to the home directory
pub fn expand_tilde(path: &Path) -> PathBuf {
    if let Ok(rest) = path.strip_prefix("~") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    path.to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let config = SqliteConfig::parse(
            r#"
            [database]
            path = "/data/analytics.db"
            "#,
        )
        .unwrap();

        assert_eq!(config.database.path, Some(PathBuf::from("/data/analytics.db")));
    }

    #[test]
    fn test_parse_empty_config() {
        let config = SqliteConfig::parse("").unwrap();
        assert!(config.database.path.is_none());
    }

    #[test]
    fn test_cli_path_wins() {
        let config = SqliteConfig {
            database: DatabaseConfig {
                path: Some(PathBuf::from("/from/config.db")),
            },
        };

        let path = config
            .resolve_db_path(Some(Path::new("/from/cli.db")))
            .unwrap();
        assert_eq!(path, PathBuf::from("/from/cli.db"));

        let path = config.resolve_db_path(None).unwrap();
        assert_eq!(path, PathBuf::from("/from/config.db"));
    }

    #[test]
    fn test_default_db_path() {
        let path = SqliteConfig::default().resolve_db_path(None).unwrap();
        assert!(path.ends_with(".binks/sqlite-mcp.db"));
    }

    #[test]
    fn test_tilde_resolution() {
        let resolved = expand_tilde(Path::new("~/data/store.db"));
        assert!(resolved.to_string_lossy().ends_with("data/store.db"));
        assert!(!resolved.to_string_lossy().starts_with('~'));

        assert_eq!(expand_tilde(Path::new("/abs.db")), PathBuf::from("/abs.db"));
    }

    #[test]
    fn test_missing_explicit_config_is_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let result = SqliteConfig::load(Some(dir.path().join("absent.toml").as_path()));
        assert!(matches!(result, Err(SqliteMcpError::Config(_))));
    }

    #[test]
    fn test_load_explicit_config() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("sqlite.toml");
        std::fs::write(&path, "[database]\npath = \"/tmp/x.db\"\n").unwrap();

        let config = SqliteConfig::load(Some(path.as_path())).unwrap();
        assert_eq!(config.database.path, Some(PathBuf::from("/tmp/x.db")));
    }
}
