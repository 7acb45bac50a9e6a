pub mod client;

pub use client::{Artifact, ArtifactKind, ArtifactRenderer, HttpRenderer};

use serde_json::{json, Value};
use tracing::{error, info};

use crate::analysis::{Prediction, SentimentCounts};
use crate::error::ArtifactRenderError;
use crate::youtube::Comment;

/// Outcome of one render request. A failure stays in its own slot.
pub type ArtifactSlot = Result<Artifact, ArtifactRenderError>;

#[derive(Debug, Clone)]
pub struct Artifacts {
    pub chart: ArtifactSlot,
    pub word_cloud: ArtifactSlot,
    pub trend: ArtifactSlot,
}

impl Artifacts {
    pub fn get(&self, kind: ArtifactKind) -> &ArtifactSlot {
        match kind {
            ArtifactKind::Chart => &self.chart,
            ArtifactKind::WordCloud => &self.word_cloud,
            ArtifactKind::Trend => &self.trend,
        }
    }
}

pub fn chart_payload(counts: &SentimentCounts) -> Value {
    json!({ "sentiment_counts": counts })
}

pub fn wordcloud_payload(comments: &[Comment]) -> Value {
    let texts: Vec<&str> = comments.iter().map(|c| c.text.as_str()).collect();
    json!({ "comments": texts })
}

pub fn trend_payload(predictions: &[Prediction]) -> Value {
    json!({ "sentiment_data": predictions })
}

/// Requests all three images at once and waits for every one of them.
pub async fn render_artifacts(
    renderer: &dyn ArtifactRenderer,
    counts: &SentimentCounts,
    comments: &[Comment],
    predictions: &[Prediction],
) -> Artifacts {
    let (chart, word_cloud, trend) = tokio::join!(
        render_one(renderer, ArtifactKind::Chart, chart_payload(counts)),
        render_one(renderer, ArtifactKind::WordCloud, wordcloud_payload(comments)),
        render_one(renderer, ArtifactKind::Trend, trend_payload(predictions)),
    );

    Artifacts {
        chart,
        word_cloud,
        trend,
    }
}

async fn render_one(
    renderer: &dyn ArtifactRenderer,
    kind: ArtifactKind,
    payload: Value,
) -> ArtifactSlot {
    match renderer.render(kind, payload).await {
        Ok(artifact) => {
            info!("Rendered {} ({} bytes)", kind, artifact.bytes.len());
            Ok(artifact)
        }
        Err(e) => {
            error!("{}: {}", kind.error_message(), e);
            Err(e)
        }
    }
}
