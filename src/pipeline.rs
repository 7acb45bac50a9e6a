use std::sync::Arc;
use tracing::{error, info, warn};

use crate::analysis::{HttpClassifier, Metrics, PredictionBatcher, SentimentCounts};
use crate::config::AppConfig;
use crate::error::PipelineError;
use crate::presenter::Filter;
use crate::progress::ProgressSink;
use crate::render::{self, ArtifactRenderer, HttpRenderer};
use crate::session::Session;
use crate::youtube::{CommentFetcher, VideoId, YoutubeClient};

/// Fetch, classify, aggregate and render, in that order.
pub struct Pipeline {
    fetcher: CommentFetcher,
    batcher: PredictionBatcher,
    renderer: Arc<dyn ArtifactRenderer>,
}

impl Pipeline {
    pub fn new(
        fetcher: CommentFetcher,
        batcher: PredictionBatcher,
        renderer: Arc<dyn ArtifactRenderer>,
    ) -> Self {
        Self {
            fetcher,
            batcher,
            renderer,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        let source = Arc::new(YoutubeClient::new(&config.youtube));
        let classifier = Arc::new(HttpClassifier::new(&config.classifier));
        let renderer = Arc::new(HttpRenderer::new(&config.renderer));

        Self::new(
            CommentFetcher::new(source, &config.youtube),
            PredictionBatcher::new(classifier, &config.classifier),
            renderer,
        )
    }

    /// Entry check for a submitted URL. Nothing is requested for a URL that
    /// fails here.
    pub fn validate(url: &str) -> Result<VideoId, PipelineError> {
        VideoId::from_url(url).map_err(|e| {
            warn!("Rejected URL: {}", e.url);
            PipelineError::from(e)
        })
    }

    pub async fn analyze(
        &self,
        video: &VideoId,
        progress: &ProgressSink,
    ) -> Result<Session, PipelineError> {
        progress.stage("Initializing...");
        progress.stage("Fetching video details...");

        let outcome = self.fetcher.fetch_all(video, progress).await?;
        let warning = outcome.warning();
        let comments = outcome.comments;

        if comments.is_empty() {
            warn!("No comments found for {}", video);
            return Err(PipelineError::EmptyResult);
        }

        progress.stage(format!("Analyzing {} comments...", comments.len()));
        let predictions = self.batcher.predict_all(&comments, progress).await?;

        if predictions.len() != comments.len() {
            error!(
                "Classifier returned {} predictions for {} comments",
                predictions.len(),
                comments.len()
            );
            return Err(PipelineError::Integrity {
                expected: comments.len(),
                actual: predictions.len(),
            });
        }

        let metrics = Metrics::compute(&comments, &predictions);
        let counts = SentimentCounts::tally(&predictions);
        let artifacts =
            render::render_artifacts(self.renderer.as_ref(), &counts, &comments, &predictions)
                .await;

        info!(
            "Analysis of {} done: {} comments, {} unique commenters, avg sentiment {}/10",
            video,
            metrics.total_comments,
            metrics.unique_commenters,
            metrics.avg_sentiment_display()
        );

        Ok(Session {
            video: video.clone(),
            comments,
            predictions,
            metrics,
            counts,
            warning,
            artifacts,
            filter: Filter::All,
        })
    }
}
