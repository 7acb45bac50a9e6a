use askama::Template;
use axum::extract::{Form, Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use serde::Deserialize;

use super::state::{AppState, ViewState};
use crate::pipeline::Pipeline;
use crate::presenter::{format_timestamp, Filter};
use crate::render::ArtifactKind;
use crate::session::Session;

#[derive(Template)]
#[template(path = "popup.html")]
struct PopupTemplate {
    loading: Option<LoadingView>,
    error: Option<String>,
    results: Option<ResultsView>,
}

struct LoadingView {
    video: String,
    message: String,
    percent: Option<u32>,
}

struct ResultsView {
    video: String,
    warning: Option<String>,
    total_comments: usize,
    unique_commenters: usize,
    avg_word_length: String,
    avg_sentiment: String,
    rows: Vec<SentimentRow>,
    total: usize,
    artifacts: Vec<ArtifactView>,
    filters: Vec<FilterButton>,
    comments: Vec<CommentView>,
}

struct SentimentRow {
    label: &'static str,
    css: &'static str,
    count: usize,
    percentage: String,
}

struct ArtifactView {
    slug: &'static str,
    title: &'static str,
    ok: bool,
    error: &'static str,
}

struct FilterButton {
    value: &'static str,
    label: &'static str,
    active: bool,
}

struct CommentView {
    text: String,
    sentiment: &'static str,
    css: &'static str,
    timestamp: String,
}

impl PopupTemplate {
    fn from_view(view: &ViewState) -> Self {
        let mut template = PopupTemplate {
            loading: None,
            error: None,
            results: None,
        };

        match view {
            ViewState::Idle => {}
            ViewState::Running { video, last } => {
                template.loading = Some(LoadingView {
                    video: video.to_string(),
                    message: last
                        .as_ref()
                        .map(|p| p.to_string())
                        .unwrap_or_else(|| "Initializing...".to_string()),
                    percent: last.as_ref().and_then(|p| p.percent()),
                });
            }
            ViewState::Failed(message) => template.error = Some(message.clone()),
            ViewState::Ready(session) => template.results = Some(ResultsView::from_session(session)),
        }

        template
    }
}

impl ResultsView {
    fn from_session(session: &Session) -> Self {
        let rows = session
            .counts
            .rows()
            .into_iter()
            .map(|(sentiment, count, percentage)| SentimentRow {
                label: sentiment.label(),
                css: sentiment.css_class(),
                count,
                percentage,
            })
            .collect();

        let artifacts = ArtifactKind::all()
            .iter()
            .map(|kind| ArtifactView {
                slug: kind.slug(),
                title: kind.title(),
                ok: session.artifacts.get(*kind).is_ok(),
                error: kind.error_message(),
            })
            .collect();

        let filters = Filter::all()
            .iter()
            .map(|f| FilterButton {
                value: f.as_str(),
                label: f.label(),
                active: *f == session.filter,
            })
            .collect();

        let comments = session
            .visible()
            .into_iter()
            .map(|p| CommentView {
                text: p.comment.clone(),
                sentiment: p.sentiment.label(),
                css: p.sentiment.css_class(),
                timestamp: format_timestamp(&p.timestamp),
            })
            .collect();

        ResultsView {
            video: session.video.to_string(),
            warning: session.warning.map(|w| w.to_string()),
            total_comments: session.comments.len(),
            unique_commenters: session.metrics.unique_commenters,
            avg_word_length: session.metrics.avg_word_length_display(),
            avg_sentiment: session.metrics.avg_sentiment_display(),
            rows,
            total: session.predictions.len(),
            artifacts,
            filters,
            comments,
        }
    }
}

#[derive(Deserialize)]
pub struct PopupQuery {
    filter: Option<Filter>,
}

pub async fn popup(State(state): State<AppState>, Query(query): Query<PopupQuery>) -> Html<String> {
    if let Some(filter) = query.filter {
        state.set_filter(filter).await;
    }

    let view = state.view.read().await;
    let template = PopupTemplate::from_view(&view);

    Html(template.render().unwrap_or_else(|e| format!("Template error: {}", e)))
}

#[derive(Deserialize)]
pub struct AnalyzeForm {
    url: String,
}

pub async fn analyze(State(state): State<AppState>, Form(form): Form<AnalyzeForm>) -> Redirect {
    match Pipeline::validate(&form.url) {
        Ok(video) => state.spawn_analysis(video).await,
        Err(e) => state.fail(e.user_message()).await,
    }
    Redirect::to("/")
}

pub async fn artifact(State(state): State<AppState>, Path(kind): Path<String>) -> Response {
    let Ok(kind) = kind.parse::<ArtifactKind>() else {
        return StatusCode::NOT_FOUND.into_response();
    };

    let view = state.view.read().await;
    let ViewState::Ready(session) = &*view else {
        return StatusCode::NOT_FOUND.into_response();
    };

    match session.artifacts.get(kind) {
        Ok(image) => (
            [(header::CONTENT_TYPE, image.content_type.clone())],
            image.bytes.clone(),
        )
            .into_response(),
        Err(_) => StatusCode::NOT_FOUND.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::Progress;
    use crate::testing::{app_state, comment, comments, FakeSource};

    const URL: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";

    async fn ready_state() -> AppState {
        let state = app_state(FakeSource::paged(&comments(6), 100, 8));
        let video = Pipeline::validate(URL).unwrap();
        let session = state
            .pipeline
            .analyze(&video, &crate::progress::ProgressSink::disabled())
            .await
            .unwrap();
        state.finish(Ok(session)).await;
        state
    }

    async fn page(state: &AppState, filter: Option<Filter>) -> String {
        popup(State(state.clone()), Query(PopupQuery { filter })).await.0
    }

    #[tokio::test(start_paused = true)]
    async fn results_page_shows_metrics_table_and_warning() {
        let state = ready_state().await;
        let html = page(&state, None).await;

        assert!(html.contains("Comment Analysis Summary"));
        assert!(html.contains("Note: Retrieved 6 out of 8 comments"));
        assert!(html.contains("33.33%"));
        assert!(html.contains("Filtered Comments (6)"));
        assert!(html.contains("/artifacts/chart"));
        assert!(html.contains("/artifacts/wordcloud"));
        assert!(html.contains("/artifacts/trend"));
    }

    #[tokio::test(start_paused = true)]
    async fn filter_query_narrows_list_without_refetching() {
        let state = ready_state().await;
        let html = page(&state, Some(Filter::Negative)).await;
        assert!(html.contains("Filtered Comments (2)"));

        // the filter sticks to the session
        let html = page(&state, None).await;
        assert!(html.contains("Filtered Comments (2)"));

        let view = state.view.read().await;
        match &*view {
            ViewState::Ready(session) => assert_eq!(session.filter, Filter::Negative),
            other => panic!("unexpected view state: {:?}", other),
        }
    }

    #[tokio::test]
    async fn invalid_url_shows_validation_message() {
        let state = app_state(FakeSource::paged(&[], 100, 0));
        analyze(
            State(state.clone()),
            Form(AnalyzeForm {
                url: "https://example.com/watch?v=dQw4w9WgXcQ".into(),
            }),
        )
        .await;

        let html = page(&state, None).await;
        assert!(html.contains("This is not a valid YouTube URL."));
    }

    #[tokio::test]
    async fn running_view_shows_latest_progress() {
        let state = app_state(FakeSource::paged(&[], 100, 0));
        state.begin(Pipeline::validate(URL).unwrap()).await;
        state
            .record_progress(Progress::Fetched {
                retrieved: 100,
                total: 400,
            })
            .await;

        let html = page(&state, None).await;
        assert!(html.contains("Fetching comments: 100 of 400"));
        assert!(html.contains("25%"));
    }

    #[tokio::test(start_paused = true)]
    async fn artifact_route_serves_bytes_or_404() {
        let state = ready_state().await;

        let response = artifact(State(state.clone()), Path("chart".into())).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "image/png"
        );

        let response = artifact(State(state.clone()), Path("pie".into())).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let idle = app_state(FakeSource::paged(&[], 100, 0));
        let response = artifact(State(idle), Path("chart".into())).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn error_message_is_escaped() {
        let mut template = PopupTemplate::from_view(&ViewState::Idle);
        template.error = Some("<script>alert(1)</script>".into());
        let html = template.render().unwrap();
        assert!(!html.contains("<script>alert(1)</script>"));
        assert!(html.contains("alert(1)"));
    }

    #[tokio::test(start_paused = true)]
    async fn comment_text_is_escaped() {
        let state = app_state(FakeSource::paged(
            &[comment("<img src=x onerror=alert(2)> nice", "UC1")],
            100,
            1,
        ));
        let video = Pipeline::validate(URL).unwrap();
        let session = state
            .pipeline
            .analyze(&video, &crate::progress::ProgressSink::disabled())
            .await
            .unwrap();
        state.finish(Ok(session)).await;

        let html = page(&state, None).await;
        assert!(html.contains("Filtered Comments (1)"));
        assert!(!html.contains("<img src=x"));
        assert!(html.contains("onerror=alert(2)"));
    }
}
