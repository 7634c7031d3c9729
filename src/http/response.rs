//! Response relay.
//!
//! # Responsibilities
//! - Copy status, `Content-Length` and `Content-Type` from the upstream response
//! - Stream the upstream body to the caller
//! - Materialize and log the body when full logging was requested
//!
//! # Design Decisions
//! - Streaming is the default: memory use does not grow with body size
//! - Status and headers are committed before the first body byte; a failure
//!   mid-body aborts the caller's connection rather than becoming a status

use axum::body::Body;
use axum::http::{header, Response};

use crate::error::ProxyError;

/// Turn the upstream response into the caller-facing one.
pub async fn relay_response(
    upstream: Response<Body>,
    destination: &str,
    full_log: bool,
) -> Result<Response<Body>, ProxyError> {
    let (parts, body) = upstream.into_parts();

    let mut builder = Response::builder().status(parts.status);
    for name in [header::CONTENT_LENGTH, header::CONTENT_TYPE] {
        if let Some(value) = parts.headers.get(&name) {
            builder = builder.header(name, value.clone());
        }
    }

    let body = if full_log {
        let bytes = axum::body::to_bytes(body, usize::MAX).await?;
        tracing::info!(destination = %destination, status = %parts.status, "Response");
        tracing::info!(
            destination = %destination,
            body = %String::from_utf8_lossy(&bytes),
            "Response body"
        );
        Body::from(bytes)
    } else {
        body
    };

    builder.body(body).map_err(ProxyError::Relay)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    fn upstream(status: u16, headers: &[(&'static str, &'static str)], body: &'static str) -> Response<Body> {
        let mut builder = Response::builder().status(status);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(Body::from(body)).unwrap()
    }

    #[tokio::test]
    async fn copies_status_length_type_and_body() {
        let response = relay_response(
            upstream(
                201,
                &[("content-type", "application/json"), ("content-length", "7")],
                r#"{"a":1}"#,
            ),
            "api.example.com",
            false,
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
        assert_eq!(response.headers()[header::CONTENT_LENGTH], "7");
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], br#"{"a":1}"#);
    }

    #[tokio::test]
    async fn other_upstream_headers_are_not_relayed() {
        let response = relay_response(
            upstream(200, &[("set-cookie", "s=1"), ("x-upstream", "yes")], "ok"),
            "api.example.com",
            false,
        )
        .await
        .unwrap();

        assert!(response.headers().get("set-cookie").is_none());
        assert!(response.headers().get("x-upstream").is_none());
    }

    #[tokio::test]
    async fn full_log_relays_identical_bytes() {
        let response = relay_response(
            upstream(502, &[("content-type", "text/plain")], "bad gateway upstream"),
            "api.example.com",
            true,
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"bad gateway upstream");
    }
}
