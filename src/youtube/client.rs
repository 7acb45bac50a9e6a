use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use tracing::debug;

use super::types::{Comment, CommentPage, UNKNOWN_AUTHOR};
use super::video::VideoId;
use crate::config::YoutubeConfig;
use crate::error::FetchError;

/// Anything that can list the top-level comments of a video.
#[async_trait]
pub trait CommentSource: Send + Sync {
    /// Total comment count reported by the API, 0 when it reports none.
    async fn total_count(&self, video: &VideoId) -> Result<u64, FetchError>;

    /// One page, newest first. An empty `page_token` requests the first page.
    async fn fetch_page(
        &self,
        video: &VideoId,
        page_token: &str,
        page_size: u32,
    ) -> Result<CommentPage, FetchError>;
}

/// `commentThreads` client for the YouTube Data API v3.
pub struct YoutubeClient {
    client: Client,
    api_key: String,
    base_url: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThreadListResponse {
    #[serde(default)]
    items: Vec<Thread>,
    page_info: Option<PageInfo>,
    next_page_token: Option<String>,
    error: Option<ApiError>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageInfo {
    total_results: Option<u64>,
}

#[derive(Deserialize)]
struct ApiError {
    message: String,
}

#[derive(Deserialize)]
struct Thread {
    snippet: ThreadSnippet,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThreadSnippet {
    top_level_comment: TopLevelComment,
}

#[derive(Deserialize)]
struct TopLevelComment {
    snippet: CommentSnippet,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentSnippet {
    #[serde(default)]
    text_original: String,
    published_at: DateTime<Utc>,
    author_channel_id: Option<AuthorChannelId>,
    #[serde(default)]
    like_count: u64,
}

#[derive(Deserialize)]
struct AuthorChannelId {
    value: String,
}

impl From<CommentSnippet> for Comment {
    fn from(s: CommentSnippet) -> Self {
        Comment {
            text: s.text_original,
            published_at: s.published_at,
            author_id: s
                .author_channel_id
                .map(|a| a.value)
                .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string()),
            like_count: s.like_count,
        }
    }
}

/// Decodes a `commentThreads` response. An error payload wins over the
/// HTTP status so the API's own message reaches the user.
fn parse_response(status: u16, body: &str) -> Result<ThreadListResponse, FetchError> {
    let success = (200..300).contains(&status);
    let parsed: ThreadListResponse = match serde_json::from_str(body) {
        Ok(parsed) => parsed,
        Err(_) if !success => return Err(FetchError::Status(status)),
        Err(e) => return Err(FetchError::Decode(e.to_string())),
    };

    if let Some(error) = parsed.error {
        return Err(FetchError::Api(error.message));
    }
    if !success {
        return Err(FetchError::Status(status));
    }

    Ok(parsed)
}

impl YoutubeClient {
    pub fn new(config: &YoutubeConfig) -> Self {
        Self {
            client: Client::new(),
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    fn request(&self, params: &[(&str, &str)]) -> RequestBuilder {
        self.client
            .get(format!("{}/commentThreads", self.base_url))
            .query(&[("part", "snippet"), ("key", self.api_key.as_str())])
            .query(params)
    }

    fn count_request(&self, video: &VideoId) -> RequestBuilder {
        self.request(&[("videoId", video.as_str()), ("maxResults", "1")])
    }

    fn page_request(&self, video: &VideoId, page_token: &str, page_size: u32) -> RequestBuilder {
        let page_size = page_size.to_string();
        self.request(&[
            ("videoId", video.as_str()),
            ("maxResults", page_size.as_str()),
            ("pageToken", page_token),
            ("textFormat", "plainText"),
            ("order", "time"),
        ])
    }

    async fn list(&self, request: RequestBuilder) -> Result<ThreadListResponse, FetchError> {
        let response = request.send().await?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        parse_response(status, &body)
    }
}

#[async_trait]
impl CommentSource for YoutubeClient {
    async fn total_count(&self, video: &VideoId) -> Result<u64, FetchError> {
        let response = self.list(self.count_request(video)).await?;

        Ok(response
            .page_info
            .and_then(|p| p.total_results)
            .unwrap_or(0))
    }

    async fn fetch_page(
        &self,
        video: &VideoId,
        page_token: &str,
        page_size: u32,
    ) -> Result<CommentPage, FetchError> {
        let response = self
            .list(self.page_request(video, page_token, page_size))
            .await?;

        debug!(
            "Page for {} returned {} threads",
            video,
            response.items.len()
        );

        Ok(CommentPage {
            comments: response
                .items
                .into_iter()
                .map(|t| t.snippet.top_level_comment.snippet.into())
                .collect(),
            next_page_token: response.next_page_token,
        })
    }
}
