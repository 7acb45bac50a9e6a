use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Author id used when the API does not report a channel id.
pub const UNKNOWN_AUTHOR: &str = "Unknown";

/// A single top-level comment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub text: String,
    pub published_at: DateTime<Utc>,
    pub author_id: String,
    pub like_count: u64,
}

/// One page of the comment listing.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CommentPage {
    pub comments: Vec<Comment>,
    pub next_page_token: Option<String>,
}

/// Everything a fetch produced, plus the count the API claimed up front.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchOutcome {
    pub comments: Vec<Comment>,
    pub reported_total: u64,
}

impl FetchOutcome {
    pub fn warning(&self) -> Option<PartialFetchWarning> {
        let retrieved = self.comments.len();
        ((retrieved as u64) < self.reported_total).then_some(PartialFetchWarning {
            retrieved,
            total: self.reported_total,
        })
    }
}

/// Fewer comments came back than the API reported. Not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartialFetchWarning {
    pub retrieved: usize,
    pub total: u64,
}

impl fmt::Display for PartialFetchWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Note: Retrieved {} out of {} comments",
            self.retrieved, self.total
        )
    }
}
