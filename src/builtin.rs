//! Route units shipped with the binary.
//!
//! - `health`: `GET` answers `{"status":"ok"}`
//! - `echo`: `POST` answers with the parsed JSON body, `GET` with the unit's
//!   own settings
//!
//! Both accept an optional `path` setting to move their mount path.

use std::sync::Arc;

use axum::extract::Request;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use utoipa::openapi::path::{HttpMethod, OperationBuilder, PathItem};
use utoipa::openapi::response::ResponseBuilder;

use crate::discovery::{UnitCatalog, UnitContext};
use crate::http::{JsonBody, Middleware, RequestIdExt};
use crate::routing::{MethodHandlers, RouteOptions, RouteUnit};

/// Catalog containing every built-in unit.
pub fn catalog() -> UnitCatalog {
    UnitCatalog::new()
        .with("health", |ctx: &UnitContext<'_>| Ok(Health::new(ctx)))
        .with("echo", |ctx: &UnitContext<'_>| Echo::new(ctx))
}

fn operation(summary: &str) -> utoipa::openapi::path::Operation {
    OperationBuilder::new()
        .summary(Some(summary))
        .response("200", ResponseBuilder::new().description("Success").build())
        .build()
}

pub struct Health {
    options: RouteOptions,
}

impl Health {
    fn new(ctx: &UnitContext<'_>) -> Self {
        let path = ctx.str_setting("path").unwrap_or("/health");
        Self {
            options: RouteOptions::new(path)
                .spec(PathItem::new(HttpMethod::Get, operation("Liveness check"))),
        }
    }

    async fn status(self: Arc<Self>, _req: Request) -> Json<Value> {
        Json(json!({ "status": "ok" }))
    }
}

impl RouteUnit for Health {
    fn options(&self) -> &RouteOptions {
        &self.options
    }

    fn handlers(self: Arc<Self>) -> MethodHandlers {
        MethodHandlers::on(self).get(Health::status).build()
    }
}

#[derive(Debug, Deserialize)]
struct EchoSettings {
    #[serde(default = "default_echo_path")]
    path: String,
    #[serde(default)]
    greeting: Option<String>,
}

fn default_echo_path() -> String {
    "/echo".to_string()
}

pub struct Echo {
    options: RouteOptions,
    greeting: Option<String>,
}

impl Echo {
    fn new(ctx: &UnitContext<'_>) -> Result<Self, crate::discovery::BoxError> {
        let settings: EchoSettings = ctx.settings_as()?;

        let mut spec = PathItem::new(HttpMethod::Post, operation("Echo the JSON request body"));
        spec.get = Some(operation("Show the echo unit's settings"));

        Ok(Self {
            options: RouteOptions::new(settings.path)
                .middleware(Middleware::json())
                .spec(spec),
            greeting: settings.greeting,
        })
    }

    async fn describe(self: Arc<Self>, _req: Request) -> Json<Value> {
        Json(json!({
            "path": self.options.path,
            "greeting": self.greeting,
        }))
    }

    async fn echo(self: Arc<Self>, req: Request) -> Response {
        let request_id = req.request_id().map(|id| id.0.clone());
        match req.extensions().get::<JsonBody>() {
            Some(JsonBody(body)) => Json(json!({
                "greeting": self.greeting,
                "request_id": request_id,
                "body": body,
            }))
            .into_response(),
            None => (StatusCode::UNSUPPORTED_MEDIA_TYPE, "Expected a JSON body").into_response(),
        }
    }
}

impl RouteUnit for Echo {
    fn options(&self) -> &RouteOptions {
        &self.options
    }

    fn handlers(self: Arc<Self>) -> MethodHandlers {
        MethodHandlers::on(self)
            .get(Echo::describe)
            .post(Echo::echo)
            .build()
    }
}
