use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Serialize;

use super::types::Prediction;
use crate::config::ClassifierConfig;
use crate::error::PredictionError;
use crate::youtube::Comment;

/// Remote sentiment classification.
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Classifies one batch. Results come back in input order.
    async fn classify(&self, batch: &[Comment]) -> Result<Vec<Prediction>, PredictionError>;
}

/// Client for the `/predict_with_timestamps` endpoint.
pub struct HttpClassifier {
    client: Client,
    base_url: String,
}

#[derive(Serialize)]
struct PredictRequest<'a> {
    comments: Vec<CommentPayload<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CommentPayload<'a> {
    text: &'a str,
    timestamp: DateTime<Utc>,
    author_id: &'a str,
    like_count: u64,
    published_at: DateTime<Utc>,
}

impl<'a> From<&'a Comment> for CommentPayload<'a> {
    fn from(c: &'a Comment) -> Self {
        CommentPayload {
            text: &c.text,
            timestamp: c.published_at,
            author_id: &c.author_id,
            like_count: c.like_count,
            published_at: c.published_at,
        }
    }
}

impl HttpClassifier {
    pub fn new(config: &ClassifierConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl Classifier for HttpClassifier {
    async fn classify(&self, batch: &[Comment]) -> Result<Vec<Prediction>, PredictionError> {
        let url = format!("{}/predict_with_timestamps", self.base_url);
        let request = PredictRequest {
            comments: batch.iter().map(CommentPayload::from).collect(),
        };

        let response = self.client.post(&url).json(&request).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PredictionError::Status(status.as_u16()));
        }

        let predictions: Vec<Prediction> = response.json().await?;
        Ok(predictions)
    }
}
