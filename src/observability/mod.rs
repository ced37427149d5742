//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! discovery, registration, serving
//!     → tracing events (structured fields: file, path, verb, owner)
//!     → logging.rs subscriber (pretty or JSON to stdout)
//! ```
//!
//! # Design Decisions
//! - Skipped route files are `warn` events, never errors
//! - Request spans come from tower-http's `TraceLayer`

pub mod logging;
