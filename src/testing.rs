//! In-memory stand-ins for the three remote services.

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::broadcast;

use crate::analysis::classifier::Classifier;
use crate::analysis::{Prediction, PredictionBatcher, Sentiment};
use crate::error::{ArtifactRenderError, FetchError, PredictionError};
use crate::pipeline::Pipeline;
use crate::render::{Artifact, ArtifactKind, ArtifactRenderer};
use crate::retry::RetryPolicy;
use crate::web::state::AppState;
use crate::youtube::client::CommentSource;
use crate::youtube::types::CommentPage;
use crate::youtube::{Comment, CommentFetcher, VideoId};

fn base_time() -> DateTime<Utc> {
    "2024-01-05T12:00:00Z".parse().unwrap()
}

pub fn comment(text: &str, author: &str) -> Comment {
    Comment {
        text: text.to_string(),
        published_at: base_time(),
        author_id: author.to_string(),
        like_count: 0,
    }
}

/// `n` distinct comments, one minute apart.
pub fn comments(n: usize) -> Vec<Comment> {
    (0..n)
        .map(|i| Comment {
            text: format!("comment number {}", i),
            published_at: base_time() + ChronoDuration::minutes(i as i64),
            author_id: format!("UC{}", i % 7),
            like_count: i as u64,
        })
        .collect()
}

pub fn prediction(text: &str, sentiment: Sentiment) -> Prediction {
    Prediction {
        comment: text.to_string(),
        sentiment,
        timestamp: base_time(),
    }
}

/// Serves pages addressed by `""`, `"page-1"`, `"page-2"`, ...
pub struct FakeSource {
    total: u64,
    pages: Vec<CommentPage>,
    script: Mutex<VecDeque<Result<CommentPage, FetchError>>>,
    failures: Mutex<HashMap<usize, (u32, FetchError)>>,
    count_error: Mutex<Option<FetchError>>,
    count_requests: AtomicUsize,
    tokens: Mutex<Vec<String>>,
    panics: bool,
}

impl FakeSource {
    pub fn paged(all: &[Comment], page_size: usize, total: u64) -> Self {
        let chunks: Vec<&[Comment]> = all.chunks(page_size).collect();
        let pages = chunks
            .iter()
            .enumerate()
            .map(|(i, chunk)| CommentPage {
                comments: chunk.to_vec(),
                next_page_token: (i + 1 < chunks.len()).then(|| format!("page-{}", i + 1)),
            })
            .collect();

        Self {
            total,
            pages,
            script: Mutex::new(VecDeque::new()),
            failures: Mutex::new(HashMap::new()),
            count_error: Mutex::new(None),
            count_requests: AtomicUsize::new(0),
            tokens: Mutex::new(Vec::new()),
            panics: false,
        }
    }

    /// Panics inside the count request, as a buggy source would.
    pub fn panicking(self) -> Self {
        Self {
            panics: true,
            ..self
        }
    }

    /// Answers page requests from `responses` in order, ignoring tokens.
    pub fn scripted(total: u64, responses: Vec<Result<CommentPage, FetchError>>) -> Self {
        let source = Self::paged(&[], 1, total);
        *source.script.lock().unwrap() = responses.into();
        source
    }

    /// Page `index` fails `times` times before it is served.
    pub fn fail_page_times(&self, index: usize, times: u32, error: FetchError) {
        self.failures.lock().unwrap().insert(index, (times, error));
    }

    pub fn fail_count(&self, error: FetchError) {
        *self.count_error.lock().unwrap() = Some(error);
    }

    pub fn page_requests(&self) -> usize {
        self.tokens.lock().unwrap().len()
    }

    pub fn count_requests(&self) -> usize {
        self.count_requests.load(Ordering::SeqCst)
    }

    pub fn tokens(&self) -> Vec<String> {
        self.tokens.lock().unwrap().clone()
    }
}

#[async_trait]
impl CommentSource for FakeSource {
    async fn total_count(&self, _video: &VideoId) -> Result<u64, FetchError> {
        self.count_requests.fetch_add(1, Ordering::SeqCst);
        if self.panics {
            panic!("comment source crashed");
        }
        match self.count_error.lock().unwrap().clone() {
            Some(e) => Err(e),
            None => Ok(self.total),
        }
    }

    async fn fetch_page(
        &self,
        _video: &VideoId,
        page_token: &str,
        _page_size: u32,
    ) -> Result<CommentPage, FetchError> {
        self.tokens.lock().unwrap().push(page_token.to_string());

        if let Some(response) = self.script.lock().unwrap().pop_front() {
            return response;
        }

        let index = page_token
            .strip_prefix("page-")
            .and_then(|n| n.parse().ok())
            .unwrap_or(0);

        if let Some((remaining, error)) = self.failures.lock().unwrap().get_mut(&index) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(error.clone());
            }
        }

        Ok(self.pages.get(index).cloned().unwrap_or_default())
    }
}

/// Echoes each comment back with a label.
pub struct FakeClassifier {
    label: Box<dyn Fn(usize) -> Sentiment + Send + Sync>,
    seen: AtomicUsize,
    batches: Mutex<Vec<usize>>,
    failures: Mutex<HashMap<usize, PredictionError>>,
    drop_last: Mutex<bool>,
}

impl FakeClassifier {
    /// Positive, Neutral, Negative, Positive, ... across all batches.
    pub fn cycling() -> Self {
        Self::with_label(|i| Sentiment::all()[i % 3])
    }

    pub fn constant(sentiment: Sentiment) -> Self {
        Self::with_label(move |_| sentiment)
    }

    fn with_label(label: impl Fn(usize) -> Sentiment + Send + Sync + 'static) -> Self {
        Self {
            label: Box::new(label),
            seen: AtomicUsize::new(0),
            batches: Mutex::new(Vec::new()),
            failures: Mutex::new(HashMap::new()),
            drop_last: Mutex::new(false),
        }
    }

    pub fn fail_batch(&self, index: usize, error: PredictionError) {
        self.failures.lock().unwrap().insert(index, error);
    }

    pub fn drop_last_of_each_batch(&self) {
        *self.drop_last.lock().unwrap() = true;
    }

    /// Sizes of every batch received, including ones that failed.
    pub fn batch_sizes(&self) -> Vec<usize> {
        self.batches.lock().unwrap().clone()
    }
}

#[async_trait]
impl Classifier for FakeClassifier {
    async fn classify(&self, batch: &[Comment]) -> Result<Vec<Prediction>, PredictionError> {
        let index = {
            let mut batches = self.batches.lock().unwrap();
            batches.push(batch.len());
            batches.len() - 1
        };

        if let Some(error) = self.failures.lock().unwrap().get(&index) {
            return Err(error.clone());
        }

        let mut predictions: Vec<Prediction> = batch
            .iter()
            .map(|c| Prediction {
                comment: c.text.clone(),
                sentiment: (self.label)(self.seen.fetch_add(1, Ordering::SeqCst)),
                timestamp: c.published_at,
            })
            .collect();

        if *self.drop_last.lock().unwrap() {
            predictions.pop();
        }
        Ok(predictions)
    }
}

/// Returns the artifact slug as image bytes, or a 500 for the failing kinds.
pub struct FakeRenderer {
    failing: HashSet<ArtifactKind>,
    delay: Duration,
    calls: AtomicUsize,
}

impl FakeRenderer {
    pub fn failing(kinds: &[ArtifactKind]) -> Self {
        Self {
            failing: kinds.iter().copied().collect(),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn slow(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::failing(&[])
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ArtifactRenderer for FakeRenderer {
    async fn render(
        &self,
        kind: ArtifactKind,
        _payload: serde_json::Value,
    ) -> Result<Artifact, ArtifactRenderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.failing.contains(&kind) {
            return Err(ArtifactRenderError::Status(500));
        }
        Ok(Artifact {
            content_type: "image/png".to_string(),
            bytes: kind.slug().as_bytes().to_vec(),
        })
    }
}

/// Web state over fake services with the production pacing.
pub fn app_state(source: FakeSource) -> AppState {
    let pipeline = Pipeline::new(
        CommentFetcher::with_settings(
            Arc::new(source),
            100,
            RetryPolicy::default(),
            Duration::from_millis(200),
        ),
        PredictionBatcher::with_settings(
            Arc::new(FakeClassifier::cycling()),
            100,
            Duration::from_millis(100),
        ),
        Arc::new(FakeRenderer::failing(&[])),
    );
    let (tx, _) = broadcast::channel(64);
    AppState::new(tx, pipeline)
}
