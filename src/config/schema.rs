//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the route
//! manager. All types derive Serde traits for deserialization from config files.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::routing::DuplicatePolicy;

/// Root configuration for the route manager.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ManagerConfig {
    /// Directory scanned for route files.
    pub routes_dir: PathBuf,

    /// Listener configuration.
    pub listener: ListenerConfig,

    /// Aggregate API document settings.
    pub openapi: OpenApiConfig,

    /// Registration settings.
    pub routing: RoutingConfig,

    /// Global middleware chain.
    pub middleware: MiddlewareConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Request size limits.
    pub limits: LimitsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            routes_dir: PathBuf::from("routes"),
            listener: ListenerConfig::default(),
            openapi: OpenApiConfig::default(),
            routing: RoutingConfig::default(),
            middleware: MiddlewareConfig::default(),
            timeouts: TimeoutConfig::default(),
            limits: LimitsConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Aggregate API document configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OpenApiConfig {
    /// Serve the aggregate document at `/openapi.json`.
    pub enabled: bool,

    /// JSON skeleton to seed the document with.
    pub skeleton_path: Option<PathBuf>,

    /// Title used when no skeleton file is given.
    pub title: String,

    /// Version used when no skeleton file is given.
    pub version: String,
}

impl Default for OpenApiConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            skeleton_path: None,
            title: "API".to_string(),
            version: "0.1.0".to_string(),
        }
    }
}

/// Route registration configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// What to do when two units bind the same path and verb.
    pub duplicate_policy: DuplicatePolicy,

    /// Walk route files in file-name order instead of listing order.
    pub sorted_discovery: bool,
}

/// Global middleware switches, applied in the order listed here.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MiddlewareConfig {
    /// Attach an `x-request-id` to every request.
    pub request_id: bool,

    /// Parse JSON request bodies.
    pub json: bool,

    /// Parse URL-encoded form bodies.
    pub urlencoded: bool,

    /// Gzip responses for clients that accept it.
    pub compression: bool,
}

impl Default for MiddlewareConfig {
    fn default() -> Self {
        Self {
            request_id: true,
            json: true,
            urlencoded: true,
            compression: false,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Request size limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum body size in bytes.
    pub max_body_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit logs as JSON lines.
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}
