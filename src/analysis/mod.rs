pub mod batcher;
pub mod classifier;
pub mod metrics;
pub mod sentiment;
pub mod types;

pub use batcher::PredictionBatcher;
pub use classifier::HttpClassifier;
pub use metrics::{Metrics, SentimentCounts};
pub use sentiment::Sentiment;
pub use types::Prediction;
