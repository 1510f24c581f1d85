//! Purpose: Top-level HTTP dispatcher for the edge API.
//! Exports: `app`, `validate_prefix`, `error_response`, `DEFAULT_PREFIX`, error types.
//! Role: Mounts the route table under a prefix and owns the JSON error envelope.
//! Invariants: Unknown paths answer 404 with `{"error":{...}}`, never an empty body.
//! Invariants: `app` refuses prefixes axum cannot register instead of panicking.

mod routes;

use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use serde::Serialize;
use tower_http::trace::TraceLayer;

pub use crate::core::error::{Error, ErrorKind, to_exit_code};
pub use routes::{GREETING, Greeting, greeting};

pub const DEFAULT_PREFIX: &str = "/api";

/// Build the dispatcher with the API routes mounted under `prefix`.
pub fn app(prefix: &str) -> Result<Router, Error> {
    validate_prefix(prefix)?;
    let router = routes::mount(Router::new(), prefix)
        .fallback(not_found)
        .layer(TraceLayer::new_for_http());
    Ok(router)
}

pub fn validate_prefix(prefix: &str) -> Result<(), Error> {
    if !prefix.starts_with('/') {
        return Err(Error::new(ErrorKind::Usage)
            .with_message("api prefix must start with '/'")
            .with_hint("Use a value like /api."));
    }
    if prefix == "/" || prefix.ends_with('/') {
        return Err(Error::new(ErrorKind::Usage)
            .with_message("api prefix must not end with '/'")
            .with_hint("Drop the trailing slash, e.g. /api instead of /api/."));
    }
    if prefix.chars().any(char::is_whitespace) {
        return Err(Error::new(ErrorKind::Usage)
            .with_message("api prefix must not contain whitespace"));
    }
    if prefix.contains("//") || prefix.contains(':') || prefix.contains('*') {
        return Err(Error::new(ErrorKind::Usage)
            .with_message("api prefix must be a literal path")
            .with_hint("Avoid empty segments and route captures (':' or '*')."));
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    kind: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    hint: Option<String>,
}

async fn not_found(uri: Uri) -> Response {
    tracing::debug!(path = %uri.path(), "no route");
    error_response(
        Error::new(ErrorKind::NotFound)
            .with_message(format!("no route for {}", uri.path()))
            .with_hint("The API answers GET on its prefix root only."),
    )
}

pub fn error_response(err: Error) -> Response {
    let status = match err.kind() {
        ErrorKind::Usage => StatusCode::BAD_REQUEST,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Io | ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let body = ErrorEnvelope {
        error: ErrorBody {
            kind: format!("{:?}", err.kind()),
            message: err.message().unwrap_or("error").to_string(),
            hint: err.hint().map(str::to_string),
        },
    };
    (status, Json(body)).into_response()
}
