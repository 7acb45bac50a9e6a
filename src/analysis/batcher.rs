use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

use super::classifier::Classifier;
use super::types::Prediction;
use crate::config::ClassifierConfig;
use crate::error::PredictionError;
use crate::progress::{Progress, ProgressSink};
use crate::youtube::Comment;

/// Sends comments to the classifier in fixed-size batches, strictly one after another.
pub struct PredictionBatcher {
    classifier: Arc<dyn Classifier>,
    batch_size: usize,
    batch_delay: Duration,
}

impl PredictionBatcher {
    pub fn new(classifier: Arc<dyn Classifier>, config: &ClassifierConfig) -> Self {
        Self::with_settings(classifier, config.batch_size, config.batch_delay())
    }

    pub fn with_settings(
        classifier: Arc<dyn Classifier>,
        batch_size: usize,
        batch_delay: Duration,
    ) -> Self {
        Self {
            classifier,
            batch_size: batch_size.max(1),
            batch_delay,
        }
    }

    /// Classifies every comment. The first failed batch aborts the run.
    ///
    /// Results are concatenated in input order; whether the classifier
    /// returned one prediction per comment is left to the caller to check.
    pub async fn predict_all(
        &self,
        comments: &[Comment],
        progress: &ProgressSink,
    ) -> Result<Vec<Prediction>, PredictionError> {
        let total = comments.len();
        let mut predictions = Vec::with_capacity(total);

        for (index, batch) in comments.chunks(self.batch_size).enumerate() {
            if index > 0 {
                tokio::time::sleep(self.batch_delay).await;
            }

            let processed = (index * self.batch_size + batch.len()).min(total);
            progress.emit(Progress::Classified { processed, total });

            let results = self.classifier.classify(batch).await.map_err(|e| {
                error!("Batch {} ({} comments) failed: {}", index + 1, batch.len(), e);
                e
            })?;

            debug!(
                "Batch {} returned {} predictions for {} comments",
                index + 1,
                results.len(),
                batch.len()
            );
            predictions.extend(results);
        }

        info!("Classified {} comments", predictions.len());
        Ok(predictions)
    }
}
