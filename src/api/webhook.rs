//! Webhook handler for GitHub push events

use axum::{
    body::{Body, to_bytes},
    extract::State as AxumState,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::{Instrument, error, info, info_span, warn};

use crate::SharedState;
use crate::error::{HookError, Result};
use crate::pipeline::{UpdateOutcome, run_update};
use crate::repository::resolve_target_directory;
use crate::signature::{SIGNATURE_HEADER, verify_github_signature};
use crate::webhook::{DELIVERY_HEADER, EVENT_HEADER, GitHubEvent, PushPayload};

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Handles the GitHub webhook POST request.
///
/// The update runs inline, so the status code tells the sender whether the
/// pull and build succeeded.
pub async fn handle_webhook(
    AxumState(state): AxumState<SharedState>,
    headers: HeaderMap,
    body: Body,
) -> Response {
    let delivery = header_str(&headers, DELIVERY_HEADER)
        .unwrap_or("-")
        .to_string();
    let span = info_span!("webhook", delivery = %delivery);

    async move {
        match process_webhook(&state, &headers, body).await {
            Ok(response) => response,
            Err(e) => {
                if e.status_code().is_server_error() {
                    error!("{}", e);
                } else {
                    warn!("Rejected delivery: {}", e);
                }
                e.into_response()
            }
        }
    }
    .instrument(span)
    .await
}

async fn process_webhook(state: &SharedState, headers: &HeaderMap, body: Body) -> Result<Response> {
    let settings = &state.settings;

    let body = to_bytes(body, settings.max_body_bytes)
        .await
        .map_err(|e| HookError::ReadError(e.to_string()))?;

    // Authenticate before looking at anything inside the body.
    let signature = headers
        .get(SIGNATURE_HEADER)
        .map(|v| {
            v.to_str()
                .map_err(|_| HookError::InvalidSignature("header is not ASCII".to_string()))
        })
        .transpose()?;
    verify_github_signature(&settings.github_secret, &body, signature)?;

    match GitHubEvent::from_header(header_str(headers, EVENT_HEADER)) {
        GitHubEvent::Push => {}
        GitHubEvent::Ping => {
            info!("Received ping event");
            return Ok((StatusCode::OK, "pong").into_response());
        }
        GitHubEvent::Other(event) => {
            info!("Not push event; Received {:?} event", event);
            return Ok(StatusCode::NO_CONTENT.into_response());
        }
    }

    let payload = PushPayload::from_slice(&body)?;
    let repo_name = payload.repository.name;

    let workdir = resolve_target_directory(
        &repo_name,
        &settings.parent_directory,
        &settings.folder_suffix,
    )?;

    info!(
        "Push event for repository '{}', updating {}",
        repo_name,
        workdir.display()
    );

    match run_update(state.runner.as_ref(), settings, &workdir).await? {
        UpdateOutcome::Pulled => info!("Repository '{}' pulled", repo_name),
        UpdateOutcome::Built => info!("Repository '{}' pulled and built", repo_name),
    }

    Ok(StatusCode::OK.into_response())
}
