pub mod routes;
pub mod sse;
pub mod state;

use axum::routing::{get, post};
use axum::Router;
use tower_http::services::ServeDir;

use state::AppState;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::popup))
        .route("/analyze", post(routes::analyze))
        .route("/artifacts/{kind}", get(routes::artifact))
        .route("/sse", get(sse::sse_handler))
        .nest_service("/static", ServeDir::new("templates/static"))
        .with_state(state)
}
