//! Aggregate API description built from route units' fragments.
//!
//! # Responsibilities
//! - Seed the document from a skeleton (file or title/version)
//! - Set `paths[mount_path]` for every unit that carries a fragment
//! - Serve the current document as JSON
//!
//! # Design Decisions
//! - Shallow replace: a later fragment for the same path wins outright
//! - The document lives behind `ArcSwap`, so the endpoint bound during load
//!   serves whatever the document holds when a request arrives

use std::path::{Path, PathBuf};
use std::sync::Arc;

use arc_swap::ArcSwap;
use axum::extract::Request;
use axum::http::StatusCode;
use axum::Json;
use utoipa::openapi::{Info, OpenApi, PathItem, Paths};

use crate::routing::handlers::{bound, BoundHandler};

/// Path the aggregate document is served at.
pub const OPENAPI_PATH: &str = "/openapi.json";

/// Error raised while loading a skeleton document.
#[derive(Debug, thiserror::Error)]
pub enum SkeletonError {
    #[error("failed to read OpenAPI skeleton {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse OpenAPI skeleton {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Load a skeleton document from a JSON file.
pub fn load_skeleton(path: &Path) -> Result<OpenApi, SkeletonError> {
    let content = std::fs::read_to_string(path).map_err(|source| SkeletonError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| SkeletonError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// A skeleton with only `info` filled in.
pub fn default_skeleton(title: &str, version: &str) -> OpenApi {
    OpenApi::new(Info::new(title, version), Paths::new())
}

/// Shared aggregate document.
#[derive(Clone)]
pub struct SpecAggregator {
    document: Arc<ArcSwap<OpenApi>>,
}

impl SpecAggregator {
    pub fn new(skeleton: OpenApi) -> Self {
        if !skeleton.paths.paths.is_empty() {
            tracing::debug!(
                paths = skeleton.paths.paths.len(),
                "OpenAPI skeleton already declares paths"
            );
        }
        Self {
            document: Arc::new(ArcSwap::from_pointee(skeleton)),
        }
    }

    /// Set the entry for `path`, returning the fragment it replaced.
    pub fn merge(&self, path: &str, fragment: &PathItem) -> Option<PathItem> {
        let mut document = OpenApi::clone(&self.document.load());
        let previous = document
            .paths
            .paths
            .insert(path.to_string(), fragment.clone());
        self.document.store(Arc::new(document));

        if previous.is_some() {
            tracing::info!(path, "OpenAPI entry replaced by later route unit");
        }
        previous
    }

    /// Snapshot of the current document.
    pub fn document(&self) -> Arc<OpenApi> {
        self.document.load_full()
    }

    pub fn fragment(&self, path: &str) -> Option<PathItem> {
        self.document.load().paths.paths.get(path).cloned()
    }

    /// Handler answering with the full document.
    pub fn handler(&self) -> BoundHandler {
        let aggregator = self.clone();
        bound(move |_req: Request| {
            let document = aggregator.document();
            async move { (StatusCode::OK, Json(OpenApi::clone(&document))) }
        })
    }
}
