//! Composition root: discovery → validation → registration → aggregation.
//!
//! # Responsibilities
//! - Own the routing table, the global middleware chain, the API document,
//!   and the registry of loaded units
//! - Run the load pipeline over every file of the routes directory
//! - Render the router and serve it
//!
//! # Design Decisions
//! - Each file is fully loaded, registered and merged before the next one
//! - `load_routes` is not idempotent: a second call binds everything again
//! - Nothing is rolled back on a fatal error; the caller must not serve

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use utoipa::openapi::OpenApi;

use crate::config::ManagerConfig;
use crate::discovery::{self, DiscoveryError, LoadError, LoadOutcome, LoadedUnit, SkipReason, UnitCatalog};
use crate::http::server::{self, ServiceSettings};
use crate::http::Middleware;
use crate::openapi::{self, SkeletonError, SpecAggregator, OPENAPI_PATH};
use crate::routing::{registrar, DuplicatePolicy, RegistrationError, RouteBinder, RouteBinding, RoutingTable, Verb};

/// Fatal error from building or running a manager.
#[derive(Debug, thiserror::Error)]
pub enum ManagerError {
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Registration(#[from] RegistrationError),
    #[error(transparent)]
    Skeleton(#[from] SkeletonError),
    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),
}

/// A route file that was not loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: SkipReason,
}

/// Summary of one `load_routes` run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Units loaded and registered.
    pub units: usize,
    /// Bind calls made, including the document endpoint.
    pub bindings: usize,
    /// Files skipped as malformed.
    pub skipped: Vec<SkippedFile>,
}

/// Discovers route units and serves them.
pub struct RouteManager {
    routes_dir: PathBuf,
    catalog: UnitCatalog,
    middleware: Vec<Middleware>,
    table: RoutingTable,
    spec: Option<SpecAggregator>,
    registry: Vec<LoadedUnit>,
    sorted_discovery: bool,
    service: ServiceSettings,
}

impl RouteManager {
    pub fn builder(routes_dir: impl Into<PathBuf>) -> RouteManagerBuilder {
        RouteManagerBuilder {
            routes_dir: routes_dir.into(),
            catalog: UnitCatalog::new(),
            spec: None,
            middleware: Vec::new(),
            policy: DuplicatePolicy::default(),
            sorted_discovery: false,
            service: ServiceSettings::default(),
        }
    }

    /// Build a manager from validated configuration.
    pub fn from_config(config: &ManagerConfig, catalog: UnitCatalog) -> Result<Self, ManagerError> {
        let mut builder = Self::builder(&config.routes_dir)
            .catalog(catalog)
            .duplicate_policy(config.routing.duplicate_policy)
            .sorted_discovery(config.routing.sorted_discovery)
            .request_timeout(Duration::from_secs(config.timeouts.request_secs))
            .max_body_bytes(config.limits.max_body_bytes);

        if config.openapi.enabled {
            let skeleton = match &config.openapi.skeleton_path {
                Some(path) => openapi::load_skeleton(path)?,
                None => openapi::default_skeleton(&config.openapi.title, &config.openapi.version),
            };
            builder = builder.spec(skeleton);
        }

        if config.middleware.request_id {
            builder = builder.middleware(Middleware::request_id());
        }
        if config.middleware.json {
            builder = builder.middleware(Middleware::json());
        }
        if config.middleware.urlencoded {
            builder = builder.middleware(Middleware::urlencoded());
        }
        if config.middleware.compression {
            builder = builder.middleware(Middleware::compression());
        }

        Ok(builder.build())
    }

    /// Load, register and document every route file under the routes directory.
    pub fn load_routes(&mut self) -> Result<LoadReport, ManagerError> {
        tracing::info!(routes_dir = %self.routes_dir.display(), "Loading routes");
        let mut report = LoadReport::default();

        for file in discovery::walk(&self.routes_dir, self.sorted_discovery)? {
            let file = file?;
            match discovery::load(&file, &self.catalog)? {
                LoadOutcome::Unit(loaded) => {
                    report.bindings += self.register(&loaded)?;
                    report.units += 1;
                    self.registry.push(loaded);
                }
                LoadOutcome::Skipped(reason) => {
                    tracing::warn!(file = %file.display(), reason = %reason, "Skipping route file");
                    report.skipped.push(SkippedFile { path: file, reason });
                }
            }
        }

        if let Some(spec) = &self.spec {
            self.table.bind(RouteBinding {
                verb: Verb::Get,
                path: OPENAPI_PATH.to_string(),
                middleware: Vec::new(),
                handler: spec.handler(),
                owner: "openapi".to_string(),
            })?;
            report.bindings += 1;
        }

        tracing::info!(
            units = report.units,
            bindings = report.bindings,
            skipped = report.skipped.len(),
            "Routes loaded"
        );
        Ok(report)
    }

    fn register(&mut self, loaded: &LoadedUnit) -> Result<usize, ManagerError> {
        let owner = loaded.source.display().to_string();
        let count = registrar::register(&loaded.unit, &owner, &mut self.table)?;

        let options = loaded.unit.options();
        if let (Some(spec), Some(fragment)) = (&self.spec, &options.spec) {
            spec.merge(&options.path, fragment);
        }

        tracing::debug!(
            file = %owner,
            export = %loaded.export,
            path = %options.path,
            handlers = count,
            "Route unit registered"
        );
        Ok(count)
    }

    /// Render the router: routing table, global middleware, service layers.
    pub fn router(&self) -> Router {
        let router = crate::http::middleware::wrap_router(self.table.to_router(), &self.middleware);
        server::with_service_layers(router, &self.service)
    }

    /// Serve on all interfaces at `port` until Ctrl+C or SIGTERM.
    pub async fn serve(&self, port: u16) -> Result<(), ManagerError> {
        let listener = server::bind(port).await?;
        tracing::info!(port, "Listening on port {}", port);
        self.serve_with_shutdown(listener, crate::lifecycle::shutdown_signal()).await
    }

    /// Serve on `listener` until `shutdown` resolves.
    pub async fn serve_with_shutdown<F>(&self, listener: TcpListener, shutdown: F) -> Result<(), ManagerError>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        server::run(self.router(), listener, shutdown).await?;
        Ok(())
    }

    pub fn routes_dir(&self) -> &Path {
        &self.routes_dir
    }

    /// Loaded units in discovery order.
    pub fn routes(&self) -> &[LoadedUnit] {
        &self.registry
    }

    pub fn table(&self) -> &RoutingTable {
        &self.table
    }

    pub fn middleware(&self) -> &[Middleware] {
        &self.middleware
    }

    /// Current aggregate document, if documentation is enabled.
    pub fn spec(&self) -> Option<Arc<OpenApi>> {
        self.spec.as_ref().map(SpecAggregator::document)
    }
}

impl fmt::Debug for RouteManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteManager")
            .field("routes_dir", &self.routes_dir)
            .field("catalog", &self.catalog)
            .field("middleware", &self.middleware)
            .field("units", &self.registry.len())
            .field("bindings", &self.table.binding_count())
            .field("openapi", &self.spec.is_some())
            .finish()
    }
}

/// Builder for [`RouteManager`].
pub struct RouteManagerBuilder {
    routes_dir: PathBuf,
    catalog: UnitCatalog,
    spec: Option<OpenApi>,
    middleware: Vec<Middleware>,
    policy: DuplicatePolicy,
    sorted_discovery: bool,
    service: ServiceSettings,
}

impl RouteManagerBuilder {
    pub fn catalog(mut self, catalog: UnitCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Enable the aggregate document, seeded with `skeleton`.
    pub fn spec(mut self, skeleton: OpenApi) -> Self {
        self.spec = Some(skeleton);
        self
    }

    /// Append a global middleware.
    pub fn middleware(mut self, middleware: Middleware) -> Self {
        self.middleware.push(middleware);
        self
    }

    pub fn duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn sorted_discovery(mut self, sorted: bool) -> Self {
        self.sorted_discovery = sorted;
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.service.request_timeout = Some(timeout);
        self
    }

    pub fn max_body_bytes(mut self, limit: usize) -> Self {
        self.service.max_body_bytes = Some(limit);
        self
    }

    pub fn build(self) -> RouteManager {
        RouteManager {
            routes_dir: self.routes_dir,
            catalog: self.catalog,
            middleware: self.middleware,
            table: RoutingTable::new(self.policy),
            spec: self.spec.map(SpecAggregator::new),
            registry: Vec::new(),
            sorted_discovery: self.sorted_discovery,
            service: self.service,
        }
    }
}
