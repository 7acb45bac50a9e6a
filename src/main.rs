mod analysis;
mod config;
mod error;
mod pipeline;
mod presenter;
mod progress;
mod render;
mod retry;
mod session;
#[cfg(test)]
mod testing;
mod web;
mod youtube;

use anyhow::Result;
use tokio::sync::broadcast;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tubesense=info".into()),
        )
        .init();

    info!("Loading configuration...");
    let config = config::AppConfig::load()?;

    // Progress side-channel shared by the pipeline, the SSE stream and the view
    let (progress_tx, _) = broadcast::channel::<progress::Progress>(256);

    let pipeline = pipeline::Pipeline::from_config(&config);
    let app_state = web::state::AppState::new(progress_tx.clone(), pipeline);

    // Keeps the latest progress message in the view so a reload shows it
    let state_for_updater = app_state.clone();
    let mut updater_rx = progress_tx.subscribe();
    let updater_handle = tokio::spawn(async move {
        loop {
            match updater_rx.recv().await {
                Ok(progress) => {
                    state_for_updater.record_progress(progress).await;
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!("Progress updater lagged, skipped {} messages", n);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    let router = web::create_router(app_state);
    let addr = format!("{}:{}", config.web.host, config.web.port);
    info!("Starting web server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    let web_handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router).await {
            tracing::error!("Web server error: {:#}", e);
        }
    });

    tokio::select! {
        _ = updater_handle => info!("Updater task ended"),
        _ = web_handle => info!("Web server ended"),
    }

    Ok(())
}
