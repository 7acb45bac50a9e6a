use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use std::convert::Infallible;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

use super::state::AppState;
use crate::progress::Progress;

pub async fn sse_handler(
    State(state): State<AppState>,
) -> Sse<impl tokio_stream::Stream<Item = Result<Event, Infallible>>> {
    // Subscribe before checking, so a run that ends in between is still seen.
    let rx = state.tx.subscribe();
    let already_done = !state.is_running().await;

    let initial = tokio_stream::iter(
        already_done.then(|| Ok::<_, Infallible>(to_event(&Progress::Finished))),
    );
    let updates = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(progress) => Some(Ok::<_, Infallible>(to_event(&progress))),
        Err(_) => None,
    });

    Sse::new(initial.chain(updates)).keep_alive(KeepAlive::default())
}

fn to_event(progress: &Progress) -> Event {
    match progress {
        Progress::Finished => Event::default().event("done").data("done"),
        other => Event::default().event("progress").data(render_progress(other)),
    }
}

fn render_progress(progress: &Progress) -> String {
    let bar = match progress.percent() {
        Some(percent) => format!(
            r#"
  <div class="progress-bar">
    <div class="progress-fill" style="width: {}%"></div>
  </div>
  <div id="commentCount">Progress: {}%</div>"#,
            percent, percent
        ),
        None => String::new(),
    };

    format!(
        r#"<div class="progress-container">
  <div class="loading-spinner"></div>
  <div class="progress-text">{}</div>{}
</div>"#,
        html_escape(&progress.to_string()),
        bar
    )
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
