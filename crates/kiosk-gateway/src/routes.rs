//! HTTP surface: landing text, the timetable dashboard, and static assets.

use std::any::Any;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Request, State},
    middleware::{self, Next},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use kiosk_core::{LocalClock, RenderError, UpstreamError};
use thiserror::Error;
use tower_http::{catch_panic::CatchPanicLayer, services::ServeDir};

use crate::state::AppState;

pub const LANDING_TEXT: &str = "hello world";
pub const FALLBACK_MESSAGE: &str = "Timetables are unavailable right now. Please try again later.";

#[derive(Error, Debug)]
enum PipelineError {
    #[error("transit: {0}")]
    Transit(#[from] UpstreamError),

    #[error("template read: {0}")]
    Template(#[from] std::io::Error),

    #[error("render: {0}")]
    Render(#[from] RenderError),
}

pub fn router(state: Arc<AppState>, public_root: impl AsRef<Path>) -> Router {
    Router::new()
        .route("/", get(landing))
        .route("/timetables", get(timetables))
        .fallback_service(ServeDir::new(public_root))
        .with_state(state)
        .layer(CatchPanicLayer::custom(panic_fallback))
        .layer(middleware::from_fn(log_request))
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(request).await;

    tracing::info!(
        %method,
        %path,
        status = response.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "request served"
    );
    response
}

async fn landing() -> &'static str {
    LANDING_TEXT
}

/// Runs fetch, transform and render for this request. Any failure becomes the
/// fallback message with status 200 so the kiosk keeps polling.
async fn timetables(State(state): State<Arc<AppState>>) -> Html<String> {
    match build_dashboard(&state).await {
        Ok(html) => Html(html),
        Err(e) => {
            tracing::error!("timetable pipeline failed: {}", e);
            Html(FALLBACK_MESSAGE.to_string())
        }
    }
}

async fn build_dashboard(state: &AppState) -> Result<String, PipelineError> {
    let (board, quote, template) = tokio::join!(
        state.transit.fetch_departures(),
        state.quotes.fetch_daily_quote(),
        tokio::fs::read_to_string(&state.template_path),
    );
    let board = board?;
    let template = template?;

    let now = LocalClock::now_in(state.timezone);
    Ok(state.renderer.render(&template, &board, &quote, now)?)
}

fn panic_fallback(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!("handler panicked: {}", detail);
    Html(FALLBACK_MESSAGE).into_response()
}
