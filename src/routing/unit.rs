//! Route unit contract.
//!
//! # Responsibilities
//! - Define the six HTTP verbs a unit may answer
//! - Carry a unit's static metadata (mount path, middleware, doc fragment)
//! - Expose the unit's handlers bound to the unit instance itself
//!
//! # Design Decisions
//! - Metadata is resolved at construction and never mutated afterwards
//! - Handlers receive `Arc<Self>`, so they behave like methods on the unit
//! - A unit without handlers is valid: it is tracked but binds nothing

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use axum::http::Method;
use axum::routing::MethodFilter;
use serde::{Deserialize, Serialize};
use utoipa::openapi::PathItem;

use crate::http::middleware::Middleware;
use crate::routing::handlers::MethodHandlers;

/// HTTP verbs a route unit can declare handlers for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verb {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
}

impl Verb {
    /// Every supported verb, in registration order.
    pub const ALL: [Verb; 6] = [
        Verb::Get,
        Verb::Post,
        Verb::Put,
        Verb::Patch,
        Verb::Delete,
        Verb::Head,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Verb::Get => "GET",
            Verb::Post => "POST",
            Verb::Put => "PUT",
            Verb::Patch => "PATCH",
            Verb::Delete => "DELETE",
            Verb::Head => "HEAD",
        }
    }

    pub(crate) fn filter(self) -> MethodFilter {
        match self {
            Verb::Get => MethodFilter::GET,
            Verb::Post => MethodFilter::POST,
            Verb::Put => MethodFilter::PUT,
            Verb::Patch => MethodFilter::PATCH,
            Verb::Delete => MethodFilter::DELETE,
            Verb::Head => MethodFilter::HEAD,
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Verb> for Method {
    fn from(verb: Verb) -> Self {
        match verb {
            Verb::Get => Method::GET,
            Verb::Post => Method::POST,
            Verb::Put => Method::PUT,
            Verb::Patch => Method::PATCH,
            Verb::Delete => Method::DELETE,
            Verb::Head => Method::HEAD,
        }
    }
}

/// Error returned when a string names no supported verb.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported HTTP verb: {0}")]
pub struct UnknownVerb(pub String);

impl FromStr for Verb {
    type Err = UnknownVerb;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Verb::ALL
            .into_iter()
            .find(|verb| verb.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownVerb(s.to_string()))
    }
}

/// Static metadata attached to a route unit.
#[derive(Clone, Default)]
pub struct RouteOptions {
    /// Mount path the unit's handlers are bound at.
    pub path: String,

    /// Per-unit middleware, run in declared order after the global chain.
    pub middleware: Vec<Middleware>,

    /// Documentation fragment merged into the aggregate document.
    pub spec: Option<PathItem>,
}

impl RouteOptions {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            middleware: Vec::new(),
            spec: None,
        }
    }

    /// Append a middleware to the unit's chain.
    pub fn middleware(mut self, middleware: Middleware) -> Self {
        self.middleware.push(middleware);
        self
    }

    /// Attach the unit's documentation fragment.
    pub fn spec(mut self, fragment: PathItem) -> Self {
        self.spec = Some(fragment);
        self
    }
}

impl fmt::Debug for RouteOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteOptions")
            .field("path", &self.path)
            .field("middleware", &self.middleware)
            .field("spec", &self.spec.is_some())
            .finish()
    }
}

/// A self-describing bundle of handlers mounted at one path.
///
/// # Example
///
/// ```ignore
/// struct Items {
///     options: RouteOptions,
/// }
///
/// impl RouteUnit for Items {
///     fn options(&self) -> &RouteOptions {
///         &self.options
///     }
///
///     fn handlers(self: Arc<Self>) -> MethodHandlers {
///         MethodHandlers::on(self).get(Items::list).build()
///     }
/// }
///
/// impl Items {
///     async fn list(self: Arc<Self>, _req: Request) -> String {
///         format!("items at {}", self.options.path)
///     }
/// }
/// ```
pub trait RouteUnit: Send + Sync + 'static {
    /// Metadata resolved when the unit was constructed.
    fn options(&self) -> &RouteOptions;

    /// Handlers bound to this instance, keyed by verb.
    fn handlers(self: Arc<Self>) -> MethodHandlers {
        MethodHandlers::default()
    }
}

/// Check that a mount path can be bound by the router.
///
/// Rejects empty paths, paths without a leading `/`, `:name` / `*name`
/// segments (captures are written `{name}` / `{*name}`), and anything the
/// router's path syntax refuses, such as unbalanced braces or a catch-all
/// that is not the last segment.
pub fn validate_mount_path(path: &str) -> Result<(), String> {
    if path.is_empty() {
        return Err("mount path is empty".to_string());
    }
    if !path.starts_with('/') {
        return Err("mount path must start with '/'".to_string());
    }
    if path
        .split('/')
        .any(|segment| segment.starts_with(':') || segment.starts_with('*'))
    {
        return Err("capture segments must use {name} syntax".to_string());
    }
    matchit::Router::<()>::new()
        .insert(path, ())
        .map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verb_parse_is_case_insensitive() {
        assert_eq!("get".parse::<Verb>().unwrap(), Verb::Get);
        assert_eq!("Patch".parse::<Verb>().unwrap(), Verb::Patch);
        assert_eq!("HEAD".parse::<Verb>().unwrap(), Verb::Head);
        assert!("OPTIONS".parse::<Verb>().is_err());
    }

    #[test]
    fn test_verb_maps_to_method() {
        for verb in Verb::ALL {
            assert_eq!(Method::from(verb).as_str(), verb.as_str());
        }
    }

    #[test]
    fn test_mount_path_validation() {
        assert!(validate_mount_path("/items").is_ok());
        assert!(validate_mount_path("/").is_ok());
        assert!(validate_mount_path("/items/{id}").is_ok());
        assert!(validate_mount_path("/files/{*rest}").is_ok());

        assert!(validate_mount_path("").is_err());
        assert!(validate_mount_path("items").is_err());
        assert!(validate_mount_path("/items/:id").is_err());
        assert!(validate_mount_path("/files/*rest").is_err());
    }

    #[test]
    fn test_mount_path_rejects_router_syntax_errors() {
        for path in ["/a/{", "/a/{}", "/a/}x", "/{*rest}/more"] {
            assert!(validate_mount_path(path).is_err(), "{} should be rejected", path);
        }
        assert!(validate_mount_path("/users/{id}/posts/{post_id}").is_ok());
    }

    #[test]
    fn test_route_options_builder() {
        let options = RouteOptions::new("/items")
            .middleware(Middleware::request_id())
            .spec(PathItem::default());

        assert_eq!(options.path, "/items");
        assert_eq!(options.middleware.len(), 1);
        assert!(options.spec.is_some());
    }
}
