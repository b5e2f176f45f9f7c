pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod repository;
pub mod runner;
pub mod signature;
pub mod webhook;

use axum::{
    Router,
    http::{HeaderValue, header},
    middleware,
    response::Response,
    routing,
};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Instant;

pub use config::Settings;
pub use runner::{CommandRunner, ProcessRunner};

const SERVER_HEADER: &str = "pull_hook";

pub struct AppState {
    pub settings: Settings,
    pub runner: Arc<dyn CommandRunner>,
    pub start_time: Instant,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(settings: Settings, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            settings,
            runner,
            start_time: Instant::now(),
            started_at: Utc::now(),
        }
    }
}

pub type SharedState = Arc<AppState>;

async fn set_server_header(mut response: Response) -> Response {
    response
        .headers_mut()
        .insert(header::SERVER, HeaderValue::from_static(SERVER_HEADER));
    response
}

/// Build the application router.
pub fn app(state: SharedState) -> Router {
    Router::new()
        .route("/", routing::get(api::root))
        .route("/status", routing::get(api::status))
        .route("/github", routing::post(api::handle_webhook))
        .layer(middleware::map_response(set_server_header))
        .with_state(state)
}
