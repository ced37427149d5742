//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (manager.rs):
//!     Load config → build manager → load routes → serve
//!
//! Shutdown (shutdown.rs, signals.rs):
//!     SIGINT/SIGTERM or Shutdown::trigger → stop accepting → drain → exit
//! ```
//!
//! # Design Decisions
//! - Routes are fully loaded before the listener starts serving
//! - A failed load means the server is never started

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
pub use signals::shutdown_signal;
