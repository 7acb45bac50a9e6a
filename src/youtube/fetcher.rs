use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use super::client::CommentSource;
use super::types::{Comment, FetchOutcome};
use super::video::VideoId;
use crate::config::YoutubeConfig;
use crate::error::FetchError;
use crate::progress::{Progress, ProgressSink};
use crate::retry::RetryPolicy;

/// Pages through every top-level comment of a video, one page at a time.
pub struct CommentFetcher {
    source: Arc<dyn CommentSource>,
    page_size: u32,
    retry: RetryPolicy,
    page_delay: Duration,
}

impl CommentFetcher {
    pub fn new(source: Arc<dyn CommentSource>, config: &YoutubeConfig) -> Self {
        Self::with_settings(
            source,
            config.page_size,
            config.retry_policy(),
            config.page_delay(),
        )
    }

    pub fn with_settings(
        source: Arc<dyn CommentSource>,
        page_size: u32,
        retry: RetryPolicy,
        page_delay: Duration,
    ) -> Self {
        Self {
            source,
            page_size,
            retry,
            page_delay,
        }
    }

    /// Fetches all pages in order. Any page that exhausts its retries aborts
    /// the whole fetch and nothing collected so far is returned.
    pub async fn fetch_all(
        &self,
        video: &VideoId,
        progress: &ProgressSink,
    ) -> Result<FetchOutcome, FetchError> {
        let reported_total = self.source.total_count(video).await.map_err(|e| {
            error!("Could not read comment count for {}: {}", video, e);
            e
        })?;
        info!("Video {} reports {} comments", video, reported_total);

        let mut comments: Vec<Comment> = Vec::new();
        let mut page_token = String::new();

        loop {
            let page = self
                .retry
                .run(
                    |_| self.source.fetch_page(video, &page_token, self.page_size),
                    |attempt, delay, e| {
                        warn!(
                            "Page request for {} failed ({}), attempt {} in {:?}",
                            video, e, attempt, delay
                        );
                        progress.emit(Progress::Retrying { attempt, delay });
                    },
                )
                .await
                .map_err(|exhausted| {
                    error!(
                        "Giving up on {} after {} attempts: {}",
                        video, exhausted.attempts, exhausted.last_error
                    );
                    FetchError::Exhausted {
                        attempts: exhausted.attempts,
                        last_error: exhausted.last_error.to_string(),
                    }
                })?;

            if page.comments.is_empty() {
                break;
            }

            comments.extend(page.comments);
            progress.emit(Progress::Fetched {
                retrieved: comments.len(),
                total: reported_total,
            });

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => page_token = token,
                None => break,
            }

            tokio::time::sleep(self.page_delay).await;
        }

        let outcome = FetchOutcome {
            comments,
            reported_total,
        };

        match outcome.warning() {
            Some(w) => warn!("{} for {}", w, video),
            None => info!("Fetched {} comments for {}", outcome.comments.len(), video),
        }

        Ok(outcome)
    }
}
