//! Route discovery subsystem.
//!
//! # Data Flow
//! ```text
//! routes directory
//!     → walker.rs (depth-first, absolute file paths)
//!     → loader.rs (read manifest, resolve export)
//!     → catalog.rs (construct the named unit)
//!     → LoadedUnit or SkipReason
//! ```
//!
//! # Design Decisions
//! - Files are processed strictly one at a time, in walk order
//! - Malformed files are skipped with a warning; I/O and syntax errors abort
//! - No dynamic code loading: files reference compiled-in constructors

pub mod catalog;
pub mod loader;
pub mod walker;

pub use catalog::{BoxError, UnitCatalog, UnitContext};
pub use loader::{load, LoadError, LoadOutcome, LoadedUnit, RouteManifest, SkipReason};
pub use walker::{walk, DiscoveryError, RouteFiles};
