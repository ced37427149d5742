//! Request identification.
//!
//! # Responsibilities
//! - Keep an incoming `x-request-id` or generate a UUID v4
//! - Expose the id to handlers as a [`RequestId`] extension
//! - Echo the id on the response for correlation

use axum::extract::Request;
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;
use uuid::Uuid;

/// Header carrying the request identifier.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Identifier attached to each request by [`request_id`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(pub String);

impl RequestId {
    fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

/// Access the request id from a request.
pub trait RequestIdExt {
    fn request_id(&self) -> Option<&RequestId>;
}

impl<B> RequestIdExt for axum::http::Request<B> {
    fn request_id(&self) -> Option<&RequestId> {
        self.extensions().get::<RequestId>()
    }
}

pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(|v| RequestId(v.to_string()))
        .unwrap_or_else(RequestId::generate);

    if let Ok(value) = HeaderValue::from_str(&id.0) {
        req.headers_mut().insert(X_REQUEST_ID, value.clone());
        req.extensions_mut().insert(id);
        let mut response = next.run(req).await;
        response.headers_mut().insert(X_REQUEST_ID, value);
        return response;
    }

    next.run(req).await
}
