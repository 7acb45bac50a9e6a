use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::sentiment::Sentiment;

/// One classified comment, in the same position as its input comment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Comment text as echoed back by the classifier.
    pub comment: String,
    pub sentiment: Sentiment,
    pub timestamp: DateTime<Utc>,
}
