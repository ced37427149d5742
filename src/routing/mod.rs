//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route unit (options + handlers bound to the unit)
//!     → registrar.rs (one binding per declared verb)
//!     → table.rs (RouteBinder capability, duplicate policy, history)
//!     → axum Router, rendered once loading is done
//! ```
//!
//! # Design Decisions
//! - Units only ever see the `RouteBinder` capability, never the router
//! - Routes are frozen once rendered; no removal, no hot reload
//! - Duplicate (path, verb) handling is an explicit policy

pub mod handlers;
pub mod registrar;
pub mod table;
pub mod unit;

pub use handlers::{BoundHandler, HandlerTable, MethodHandlers};
pub use table::{BindOutcome, BindRecord, DuplicatePolicy, RegistrationError, RouteBinder, RouteBinding, RoutingTable};
pub use unit::{RouteOptions, RouteUnit, Verb};
