//! Insight ledger - in-memory, append-only list of insights
//!
//! Lives as long as the server process. Cloning the ledger shares the same
//! underlying list.

use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Clone, Default)]
pub struct InsightLedger {
    insights: Arc<RwLock<Vec<String>>>,
}

impl InsightLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an insight to the end of the ledger
    pub async fn append(&self, insight: String) {
        self.insights.write().await.push(insight);
    }

    /// Current insights in insertion order
    pub async fn snapshot(&self) -> Vec<String> {
        self.insights.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.insights.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.insights.read().await.is_empty()
    }
}
