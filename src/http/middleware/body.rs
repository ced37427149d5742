//! Body-parsing middleware presets.
//!
//! Parsed bodies are attached as request extensions; the raw bytes are put
//! back so handlers can still read the body themselves.
//!
//! The parsers impose no size cap of their own. The server's body limit
//! layer (`limits.max_body_bytes`) bounds what they buffer, and a body cut
//! off by that layer is answered with `413`.

use std::collections::HashMap;

use axum::body::{to_bytes, Body, Bytes};
use axum::extract::Request;
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use serde_json::Value;

/// Parsed `application/json` request body.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonBody(pub Value);

/// Parsed `application/x-www-form-urlencoded` request body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormBody(pub HashMap<String, String>);

fn has_content_type(req: &Request, expected: &str) -> bool {
    req.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(|mime| mime.trim().eq_ignore_ascii_case(expected))
        .unwrap_or(false)
}

async fn buffer(req: Request) -> Result<(Request, Bytes), Response> {
    let (parts, body) = req.into_parts();
    let bytes = to_bytes(body, usize::MAX).await.map_err(|_| {
        (StatusCode::PAYLOAD_TOO_LARGE, "Request body too large").into_response()
    })?;
    Ok((Request::from_parts(parts, Body::from(bytes.clone())), bytes))
}

pub async fn parse_json(req: Request, next: Next) -> Response {
    if !has_content_type(&req, "application/json") {
        return next.run(req).await;
    }

    let (mut req, bytes) = match buffer(req).await {
        Ok(buffered) => buffered,
        Err(response) => return response,
    };
    if bytes.is_empty() {
        return next.run(req).await;
    }

    match serde_json::from_slice::<Value>(&bytes) {
        Ok(value) => {
            req.extensions_mut().insert(JsonBody(value));
            next.run(req).await
        }
        Err(e) => {
            tracing::debug!(error = %e, "Rejecting malformed JSON body");
            (StatusCode::BAD_REQUEST, format!("Invalid JSON body: {}", e)).into_response()
        }
    }
}

pub async fn parse_urlencoded(req: Request, next: Next) -> Response {
    if !has_content_type(&req, "application/x-www-form-urlencoded") {
        return next.run(req).await;
    }

    let (mut req, bytes) = match buffer(req).await {
        Ok(buffered) => buffered,
        Err(response) => return response,
    };
    let fields = url::form_urlencoded::parse(&bytes).into_owned().collect();
    req.extensions_mut().insert(FormBody(fields));
    next.run(req).await
}
