//! Convention-based route registration for axum.
//!
//! Route files dropped into a directory name a route unit from a compiled-in
//! catalog; the manager constructs each unit, binds its per-verb handlers
//! behind the global and per-unit middleware, and merges its documentation
//! fragment into one OpenAPI document served at `/openapi.json`.

pub mod builtin;
pub mod config;
pub mod discovery;
pub mod http;
pub mod lifecycle;
pub mod manager;
pub mod observability;
pub mod openapi;
pub mod routing;

pub use config::ManagerConfig;
pub use discovery::{UnitCatalog, UnitContext};
pub use http::Middleware;
pub use lifecycle::Shutdown;
pub use manager::{LoadReport, ManagerError, RouteManager, RouteManagerBuilder, SkippedFile};
pub use routing::{DuplicatePolicy, MethodHandlers, RouteOptions, RouteUnit, Verb};
