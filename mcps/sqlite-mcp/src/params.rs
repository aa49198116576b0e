//! Parameter definitions for sqlite-mcp tools and prompts

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::{NamedParams, SqlValue};

// ============================================================================
// Queries
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ReadQueryParams {
    /// SELECT statement to execute
    pub query: String,
    /// Named parameters, e.g. {"id": 1} for `WHERE id = :id`
    #[serde(default)]
    pub params: Option<BTreeMap<String, serde_json::Value>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WriteQueryParams {
    /// INSERT, UPDATE or DELETE statement to execute
    pub query: String,
    /// Named parameters, e.g. {"name": "a"} for `VALUES (:name)`
    #[serde(default)]
    pub params: Option<BTreeMap<String, serde_json::Value>>,
}

/// Convert caller-supplied JSON parameters into bindable values
pub fn bind_params(params: Option<BTreeMap<String, serde_json::Value>>) -> NamedParams {
    params
        .unwrap_or_default()
        .into_iter()
        .map(|(name, value)| (name, SqlValue::from(value)))
        .collect()
}

// ============================================================================
// Schema
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CreateTableParams {
    /// CREATE TABLE statement
    pub query: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DescribeTableParams {
    /// Name of the table to describe
    pub table_name: String,
}

// ============================================================================
// Insights
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AppendInsightParams {
    /// Business insight discovered from data analysis
    pub insight: String,
}

// ============================================================================
// Prompts
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DemoPromptArgs {
    /// Topic to seed the database with initial data
    pub topic: String,
}
