//! Request middleware shared by the global chain and route units.
//!
//! # Ordering
//! ```text
//! request
//!     → service layers (trace, timeout, body limit)
//!     → global middleware, in declared order
//!     → unit middleware, in declared order
//!     → handler
//! ```

pub mod body;

use std::borrow::Cow;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use axum::extract::Request;
use axum::middleware::{from_fn, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::MethodRouter;
use axum::Router;
use futures_util::future::BoxFuture;
use tower_http::compression::CompressionLayer;

pub use body::{FormBody, JsonBody};

type MiddlewareFn = dyn Fn(Request, Next) -> BoxFuture<'static, Response> + Send + Sync;
type RouteLayerFn = dyn Fn(MethodRouter) -> MethodRouter + Send + Sync;
type RouterLayerFn = dyn Fn(Router) -> Router + Send + Sync;

#[derive(Clone)]
enum Step {
    /// Async function of `(Request, Next)`.
    Func(Arc<MiddlewareFn>),
    /// A tower layer, for steps that must also rewrite the response body.
    Layer {
        route: Arc<RouteLayerFn>,
        router: Arc<RouterLayerFn>,
    },
}

/// A named request-processing step run before a handler.
#[derive(Clone)]
pub struct Middleware {
    name: Cow<'static, str>,
    step: Step,
}

impl Middleware {
    /// Build a middleware from an async function of `(Request, Next)`.
    pub fn from_fn<F, Fut, R>(name: impl Into<Cow<'static, str>>, f: F) -> Self
    where
        F: Fn(Request, Next) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoResponse,
    {
        Self {
            name: name.into(),
            step: Step::Func(Arc::new(move |req, next| {
                let fut = f(req, next);
                Box::pin(async move { fut.await.into_response() })
            })),
        }
    }

    /// Parse `application/json` bodies into a [`JsonBody`] extension.
    pub fn json() -> Self {
        Self::from_fn("json", body::parse_json)
    }

    /// Parse `application/x-www-form-urlencoded` bodies into a [`FormBody`] extension.
    pub fn urlencoded() -> Self {
        Self::from_fn("urlencoded", body::parse_urlencoded)
    }

    /// Ensure every request and response carries an `x-request-id`.
    pub fn request_id() -> Self {
        Self::from_fn("request_id", crate::http::request::request_id)
    }

    /// Gzip response bodies for clients that send `accept-encoding: gzip`.
    pub fn compression() -> Self {
        Self {
            name: Cow::Borrowed("compression"),
            step: Step::Layer {
                route: Arc::new(|route: MethodRouter| -> MethodRouter { route.layer(CompressionLayer::new()) }),
                router: Arc::new(|router: Router| -> Router { router.layer(CompressionLayer::new()) }),
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn wrap_route(&self, route: MethodRouter) -> MethodRouter {
        match &self.step {
            Step::Func(run) => {
                let run = Arc::clone(run);
                route.layer(from_fn(move |req: Request, next: Next| run(req, next)))
            }
            Step::Layer { route: apply, .. } => apply(route),
        }
    }

    pub(crate) fn wrap_router(&self, router: Router) -> Router {
        match &self.step {
            Step::Func(run) => {
                let run = Arc::clone(run);
                router.layer(from_fn(move |req: Request, next: Next| run(req, next)))
            }
            Step::Layer { router: apply, .. } => apply(router),
        }
    }
}

impl fmt::Debug for Middleware {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Middleware").field(&self.name).finish()
    }
}

/// Wrap `route` so `chain` runs in declared order before it.
pub(crate) fn wrap_route(route: MethodRouter, chain: &[Middleware]) -> MethodRouter {
    // The last layer applied is the outermost, so apply in reverse.
    chain
        .iter()
        .rev()
        .fold(route, |route, middleware| middleware.wrap_route(route))
}

/// Wrap every route of `router` so `chain` runs in declared order first.
pub(crate) fn wrap_router(router: Router, chain: &[Middleware]) -> Router {
    chain
        .iter()
        .rev()
        .fold(router, |router, middleware| middleware.wrap_router(router))
}
