//! Binds a unit's handlers to the routing table.

use std::sync::Arc;

use crate::routing::table::{RegistrationError, RouteBinder, RouteBinding};
use crate::routing::unit::RouteUnit;

/// Bind every handler `unit` declares at its mount path.
///
/// Each binding carries the unit's own middleware; the global chain wraps the
/// whole router. Returns the number of bindings made.
pub fn register(
    unit: &Arc<dyn RouteUnit>,
    owner: &str,
    binder: &mut dyn RouteBinder,
) -> Result<usize, RegistrationError> {
    let options = unit.options();
    let handlers = Arc::clone(unit).handlers();
    let count = handlers.len();

    if handlers.is_empty() {
        tracing::debug!(path = %options.path, owner, "Route unit declares no handlers");
    }

    for (verb, handler) in handlers {
        binder.bind(RouteBinding {
            verb,
            path: options.path.clone(),
            middleware: options.middleware.clone(),
            handler,
            owner: owner.to_string(),
        })?;
    }

    Ok(count)
}
