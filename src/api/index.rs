//! Index page and status endpoint

use axum::{Json, extract::State as AxumState, response::Html};
use serde_json::{Value, json};

use crate::SharedState;

const INDEX_PAGE: &str = r#"<html>
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
</head>
<body>
<pre style="text-align: center; margin: 3em 0;">
<b>pull_hook</b><br>
Nothing to see here. Push webhooks go to <code>POST /github</code>.
</pre>
</body>
</html>"#;

pub async fn root() -> Html<&'static str> {
    Html(INDEX_PAGE)
}

/// Server name, version and uptime. Deliberately says nothing about the
/// configured repositories.
pub async fn status(AxumState(state): AxumState<SharedState>) -> Json<Value> {
    Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "started_at": state.started_at,
        "uptime_seconds": state.start_time.elapsed().as_secs(),
    }))
}
