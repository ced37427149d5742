//! HTTP plumbing around the routing table.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (axum serve, trace/timeout/limit layers)
//!     → middleware/ (global chain, then the unit's own chain)
//!     → bound handler of the matched route unit
//! ```

pub mod middleware;
pub mod request;
pub mod server;

pub use middleware::{FormBody, JsonBody, Middleware};
pub use request::{RequestId, RequestIdExt, X_REQUEST_ID};
pub use server::ServiceSettings;
