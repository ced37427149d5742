//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::fs;
use std::path::Path;
use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::extract::Request;
use axum::http::{HeaderValue, Method, StatusCode};
use axum::middleware::Next;
use axum::response::Response;
use axum::Router;
use serde::Deserialize;
use tower::ServiceExt;
use utoipa::openapi::path::PathItem;

use route_manager::discovery::{BoxError, UnitCatalog, UnitContext};
use route_manager::{MethodHandlers, Middleware, RouteOptions, RouteUnit, Verb};

/// Response header listing the middleware that ran, in order.
pub const TRAIL_HEADER: &str = "x-trail";

/// Write `contents` to `rel` under `dir`, creating parent directories.
pub fn write_route(dir: &Path, rel: &str, contents: &str) {
    let path = dir.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

/// Manifest for a `fixture` unit.
pub fn fixture(path: &str, verbs: &[&str], label: &str) -> String {
    let verbs: Vec<String> = verbs.iter().map(|v| format!("\"{}\"", v)).collect();
    format!(
        "export = \"fixture\"\n\n[settings]\npath = \"{}\"\nverbs = [{}]\nlabel = \"{}\"\n",
        path,
        verbs.join(", "),
        label
    )
}

/// Steps recorded by [`trail`] middleware.
#[derive(Debug, Clone, Default)]
pub struct Trail(pub Vec<String>);

/// Middleware that appends `name` to the request's [`Trail`].
pub fn trail(name: impl Into<String>) -> Middleware {
    let name = name.into();
    Middleware::from_fn(name.clone(), move |mut req: Request, next: Next| {
        let mut steps = req.extensions_mut().remove::<Trail>().unwrap_or_default();
        steps.0.push(name.clone());
        req.extensions_mut().insert(steps);
        next.run(req)
    })
}

#[derive(Debug, Deserialize)]
struct FixtureSettings {
    path: String,
    #[serde(default)]
    verbs: Vec<String>,
    #[serde(default)]
    label: String,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    middleware: Vec<String>,
}

/// Configurable unit answering `"{label} {METHOD}"` on each declared verb.
pub struct Fixture {
    options: RouteOptions,
    verbs: Vec<Verb>,
    label: String,
}

impl Fixture {
    fn new(ctx: &UnitContext<'_>) -> Result<Self, BoxError> {
        let settings: FixtureSettings = ctx.settings_as()?;
        let verbs = settings
            .verbs
            .iter()
            .map(|v| v.parse::<Verb>())
            .collect::<Result<Vec<_>, _>>()?;

        let mut options = RouteOptions::new(settings.path);
        for name in settings.middleware {
            options = options.middleware(trail(name));
        }
        if let Some(summary) = settings.summary {
            let fragment: PathItem = serde_json::from_value(serde_json::json!({ "summary": summary }))?;
            options = options.spec(fragment);
        }

        Ok(Self {
            options,
            verbs,
            label: settings.label,
        })
    }

    async fn respond(self: Arc<Self>, req: Request) -> Response {
        let steps = req
            .extensions()
            .get::<Trail>()
            .map(|t| t.0.join(","))
            .unwrap_or_default();
        let mut response = Response::new(Body::from(format!("{} {}", self.label, req.method())));
        if let Ok(value) = HeaderValue::from_str(&steps) {
            response.headers_mut().insert(TRAIL_HEADER, value);
        }
        response
    }
}

impl RouteUnit for Fixture {
    fn options(&self) -> &RouteOptions {
        &self.options
    }

    fn handlers(self: Arc<Self>) -> MethodHandlers {
        let verbs = self.verbs.clone();
        verbs
            .into_iter()
            .fold(MethodHandlers::on(self), |table, verb| table.handler(verb, Fixture::respond))
            .build()
    }
}

/// Catalog with the `fixture` unit and a `broken` factory that always fails.
pub fn test_catalog() -> UnitCatalog {
    UnitCatalog::new()
        .with("fixture", |ctx: &UnitContext<'_>| Fixture::new(ctx))
        .with("broken", |_: &UnitContext<'_>| -> Result<Fixture, BoxError> {
            Err("refusing to construct".into())
        })
}

/// Send one request through `router`, returning status, headers and body text.
pub async fn send(router: &Router, method: Method, uri: &str) -> (StatusCode, axum::http::HeaderMap, String) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, headers, String::from_utf8(bytes.to_vec()).unwrap())
}
