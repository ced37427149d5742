//! API description subsystem.
//!
//! # Data Flow
//! ```text
//! skeleton (file or title/version)
//!     → aggregator.rs (paths[mount_path] = fragment, per loaded unit)
//!     → GET /openapi.json
//! ```

pub mod aggregator;

pub use aggregator::{default_skeleton, load_skeleton, SkeletonError, SpecAggregator, OPENAPI_PATH};
