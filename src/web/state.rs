use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tracing::{error, info, warn};

use crate::error::PipelineError;
use crate::pipeline::Pipeline;
use crate::presenter::Filter;
use crate::progress::{Progress, ProgressSink};
use crate::session::Session;
use crate::youtube::VideoId;

const ABORTED: &str = "the analysis stopped unexpectedly";

#[derive(Clone)]
pub struct AppState {
    pub tx: broadcast::Sender<Progress>,
    pub view: Arc<RwLock<ViewState>>,
    pub pipeline: Arc<Pipeline>,
}

/// What the popup currently shows.
#[derive(Debug, Clone, Default)]
pub enum ViewState {
    #[default]
    Idle,
    Running {
        video: VideoId,
        last: Option<Progress>,
    },
    Failed(String),
    Ready(Box<Session>),
}

impl AppState {
    pub fn new(tx: broadcast::Sender<Progress>, pipeline: Pipeline) -> Self {
        Self {
            tx,
            view: Arc::new(RwLock::new(ViewState::Idle)),
            pipeline: Arc::new(pipeline),
        }
    }

    pub async fn is_running(&self) -> bool {
        matches!(*self.view.read().await, ViewState::Running { .. })
    }

    /// Switches to the running state. Returns false if a run is already in flight.
    pub async fn begin(&self, video: VideoId) -> bool {
        let mut view = self.view.write().await;
        if matches!(*view, ViewState::Running { .. }) {
            return false;
        }
        *view = ViewState::Running { video, last: None };
        true
    }

    /// Shows an error in place of the view, unless a run is in flight.
    pub async fn fail(&self, message: String) {
        let mut view = self.view.write().await;
        if !matches!(*view, ViewState::Running { .. }) {
            *view = ViewState::Failed(message);
        }
    }

    /// Stores the outcome of a run, then tells listeners it is over.
    pub async fn finish(&self, result: Result<Session, PipelineError>) {
        self.settle(match result {
            Ok(session) => ViewState::Ready(Box::new(session)),
            Err(e) => ViewState::Failed(e.user_message()),
        })
        .await;
    }

    async fn settle(&self, view: ViewState) {
        *self.view.write().await = view;
        let _ = self.tx.send(Progress::Finished);
    }

    pub async fn record_progress(&self, progress: Progress) {
        if let ViewState::Running { last, .. } = &mut *self.view.write().await {
            *last = Some(progress);
        }
    }

    /// Applies a filter to the current results, if there are any.
    pub async fn set_filter(&self, filter: Filter) {
        if let ViewState::Ready(session) = &mut *self.view.write().await {
            session.set_filter(filter);
        }
    }

    /// Runs the pipeline for `video` in the background.
    pub async fn spawn_analysis(&self, video: VideoId) {
        if !self.begin(video.clone()).await {
            warn!("Analysis already running, ignoring request for {}", video);
            return;
        }

        info!("Starting analysis of {}", video);
        let state = self.clone();
        tokio::spawn(async move {
            let pipeline = state.pipeline.clone();
            let progress = ProgressSink::new(state.tx.clone());
            let target = video.clone();
            let run = tokio::spawn(async move { pipeline.analyze(&target, &progress).await });

            // A panicking run still settles the view.
            match run.await {
                Ok(result) => {
                    if let Err(e) = &result {
                        error!("Analysis of {} failed: {}", video, e);
                    }
                    state.finish(result).await;
                }
                Err(e) => {
                    error!("Analysis task for {} aborted: {}", video, e);
                    state
                        .settle(ViewState::Failed(format!("Error: {}", ABORTED)))
                        .await;
                }
            }
        });
    }
}
