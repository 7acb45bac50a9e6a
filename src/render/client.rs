use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::fmt;
use std::str::FromStr;

use crate::config::RendererConfig;
use crate::error::ArtifactRenderError;

/// The three images produced by the remote renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    Chart,
    WordCloud,
    Trend,
}

impl ArtifactKind {
    pub fn endpoint(&self) -> &'static str {
        match self {
            ArtifactKind::Chart => "generate_chart",
            ArtifactKind::WordCloud => "generate_wordcloud",
            ArtifactKind::Trend => "generate_trend_graph",
        }
    }

    /// Path segment under `/artifacts/`.
    pub fn slug(&self) -> &'static str {
        match self {
            ArtifactKind::Chart => "chart",
            ArtifactKind::WordCloud => "wordcloud",
            ArtifactKind::Trend => "trend",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ArtifactKind::Chart => "Sentiment Breakdown",
            ArtifactKind::WordCloud => "Comment Wordcloud",
            ArtifactKind::Trend => "Sentiment Trend Over Time",
        }
    }

    pub fn error_message(&self) -> &'static str {
        match self {
            ArtifactKind::Chart => "Error generating chart",
            ArtifactKind::WordCloud => "Error generating word cloud",
            ArtifactKind::Trend => "Error generating trend graph",
        }
    }

    pub fn all() -> &'static [ArtifactKind] {
        &[ArtifactKind::Chart, ArtifactKind::Trend, ArtifactKind::WordCloud]
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for ArtifactKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ArtifactKind::all()
            .iter()
            .copied()
            .find(|k| k.slug() == s)
            .ok_or_else(|| format!("unknown artifact: {}", s))
    }
}

/// A rendered image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[async_trait]
pub trait ArtifactRenderer: Send + Sync {
    async fn render(
        &self,
        kind: ArtifactKind,
        payload: serde_json::Value,
    ) -> Result<Artifact, ArtifactRenderError>;
}

pub struct HttpRenderer {
    client: Client,
    base_url: String,
}

impl HttpRenderer {
    pub fn new(config: &RendererConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl ArtifactRenderer for HttpRenderer {
    async fn render(
        &self,
        kind: ArtifactKind,
        payload: serde_json::Value,
    ) -> Result<Artifact, ArtifactRenderError> {
        let url = format!("{}/{}", self.base_url, kind.endpoint());
        let response = self.client.post(&url).json(&payload).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ArtifactRenderError::Status(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("image/png")
            .to_string();
        let bytes = response.bytes().await?.to_vec();

        Ok(Artifact {
            content_type,
            bytes,
        })
    }
}
