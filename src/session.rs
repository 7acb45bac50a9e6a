use crate::analysis::{Metrics, Prediction, SentimentCounts};
use crate::presenter::{self, Filter};
use crate::render::Artifacts;
use crate::youtube::{Comment, PartialFetchWarning, VideoId};

/// Everything one analysis produced, plus the filter currently applied to it.
///
/// Filter changes only touch this value; nothing is fetched or classified again.
#[derive(Debug, Clone)]
pub struct Session {
    pub video: VideoId,
    pub comments: Vec<Comment>,
    pub predictions: Vec<Prediction>,
    pub metrics: Metrics,
    pub counts: SentimentCounts,
    pub warning: Option<PartialFetchWarning>,
    pub artifacts: Artifacts,
    pub filter: Filter,
}

impl Session {
    pub fn set_filter(&mut self, filter: Filter) {
        self.filter = filter;
    }

    /// Predictions for the comment list under the current filter.
    pub fn visible(&self) -> Vec<&Prediction> {
        presenter::present(&self.predictions, self.filter)
    }
}
