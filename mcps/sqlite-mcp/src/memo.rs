//! Business insights memo
//!
//! The memo is never stored; it is rebuilt from the ledger each time the
//! resource is read.

/// URI of the memo resource
pub const MEMO_URI: &str = "memo://insights";

pub const MEMO_NAME: &str = "Business Insights Memo";

pub const MEMO_MIME_TYPE: &str = "text/plain";

/// Text of the memo when no insights have been recorded
pub const EMPTY_MEMO: &str = "No business insights have been discovered yet.";

const MEMO_HEADER: &str = "📊 Business Intelligence Memo 📊";

/// Render the memo for the given insights
pub fn synthesize(insights: &[String]) -> String {
    if insights.is_empty() {
        return EMPTY_MEMO.to_string();
    }

    let bullets = insights
        .iter()
        .map(|insight| format!("- {}", insight))
        .collect::<Vec<_>>()
        .join("\n");

    let mut memo = format!("{}\n\n{}", MEMO_HEADER, bullets);

    if insights.len() > 1 {
        memo.push_str("\n\nSummary:\n");
        memo.push_str(&format!(
            "Analysis has revealed {} key business insights that suggest \
             opportunities for strategic optimization and growth.",
            insights.len()
        ));
    }

    memo
}
