//! Error taxonomy for the analysis pipeline.
//!
//! Terminal errors ([`PipelineError`]) replace the whole view with a single
//! message. [`ArtifactRenderError`] only ever affects its own artifact slot.

use thiserror::Error;

/// The submitted URL is not a YouTube watch link.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("not a valid YouTube watch URL: {url}")]
pub struct ValidationError {
    pub url: String,
}

/// Comment retrieval failed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// The request never produced a response.
    #[error("request failed: {0}")]
    Transport(String),

    /// The API answered with a non-success HTTP status.
    #[error("HTTP error! status: {0}")]
    Status(u16),

    /// The API returned a structured error payload.
    #[error("{0}")]
    Api(String),

    /// The response body could not be decoded.
    #[error("malformed response: {0}")]
    Decode(String),

    /// Every attempt for a single page failed.
    #[error("Failed to fetch comments after {attempts} attempts (last error: {last_error})")]
    Exhausted { attempts: u32, last_error: String },
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            FetchError::Decode(e.to_string())
        } else {
            FetchError::Transport(e.to_string())
        }
    }
}

/// A classification request failed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PredictionError {
    #[error("analyzing comments failed: {0}")]
    Request(String),

    #[error("analyzing comments failed: classifier returned {0}")]
    Status(u16),

    #[error("analyzing comments failed: malformed classifier response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for PredictionError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            PredictionError::Decode(e.to_string())
        } else {
            PredictionError::Request(e.to_string())
        }
    }
}

/// A chart, word cloud or trend graph could not be rendered.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ArtifactRenderError {
    #[error("renderer request failed: {0}")]
    Request(String),

    #[error("renderer returned {0}")]
    Status(u16),
}

impl From<reqwest::Error> for ArtifactRenderError {
    fn from(e: reqwest::Error) -> Self {
        ArtifactRenderError::Request(e.to_string())
    }
}

/// Any condition that aborts an analysis run.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PipelineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("no comments found for this video")]
    EmptyResult,

    #[error(transparent)]
    Prediction(#[from] PredictionError),

    /// The classifier returned a different number of predictions than it was sent.
    #[error("classifier returned {actual} predictions for {expected} comments")]
    Integrity { expected: usize, actual: usize },
}

impl PipelineError {
    /// Message shown in place of the whole view.
    pub fn user_message(&self) -> String {
        match self {
            PipelineError::Validation(_) => "This is not a valid YouTube URL.".to_string(),
            PipelineError::EmptyResult => "No comments found for this video.".to_string(),
            other => format!("Error: {}", other),
        }
    }
}
