//! Purpose: Route table for the API surface.
//! Exports: `mount`, `greeting`, `GREETING`.
//! Role: Owns the handlers; the dispatcher decides the prefix they live under.
//! Invariants: Handlers are stateless; the greeting body is byte-stable.

use axum::Json;
use axum::Router;
use axum::routing::get;
use serde::Serialize;

pub const GREETING: &str = "Hello from API";

#[derive(Debug, Serialize)]
pub struct Greeting {
    message: &'static str,
}

pub async fn greeting() -> Json<Greeting> {
    Json(Greeting { message: GREETING })
}

/// Register the API routes under `prefix`. The root route answers both with
/// and without a trailing slash.
pub(crate) fn mount(router: Router, prefix: &str) -> Router {
    router
        .route(prefix, get(greeting))
        .route(&format!("{prefix}/"), get(greeting))
}

#[cfg(test)]
mod tests {
    use super::greeting;
    use axum::http::{StatusCode, header};
    use axum::response::IntoResponse;

    #[tokio::test]
    async fn greeting_body_is_exact() {
        let response = greeting().await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response
                .headers()
                .get(header::CONTENT_TYPE)
                .and_then(|value| value.to_str().ok()),
            Some("application/json")
        );
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        assert_eq!(&body[..], br#"{"message":"Hello from API"}"#);
    }
}
