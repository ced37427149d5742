//! Routing table and the registration capability handed to units.
//!
//! # Responsibilities
//! - Accept bindings through the narrow [`RouteBinder`] capability
//! - Keep one active binding per (path, verb), per [`DuplicatePolicy`]
//! - Check every new path against the router's path matcher, so paths that
//!   would conflict at render time (`/users/{id}` vs `/users/{name}`) are
//!   handled at bind time under the same policy
//! - Record every bind call, including shadowed duplicates
//! - Render the active bindings as an axum `Router`
//!
//! # Design Decisions
//! - Bindings are collected first and rendered later, so the router never
//!   sees two handlers for the same (path, verb) or two conflicting paths
//! - Under `LastWins` a conflicting path evicts the earlier path with all of
//!   its verbs
//! - Repeated loads are not deduplicated: history grows with each bind

use std::collections::BTreeMap;
use std::fmt;

use axum::extract::Request;
use axum::routing::{on, MethodRouter};
use axum::Router;
use serde::{Deserialize, Serialize};

use crate::http::middleware::{self, Middleware};
use crate::routing::handlers::BoundHandler;
use crate::routing::unit::Verb;

/// What happens when a (path, verb) pair is bound twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Keep the first binding; later ones are recorded but unreachable.
    #[default]
    FirstWins,
    /// Replace the earlier binding.
    LastWins,
    /// Fail the registration.
    Reject,
}

/// Error raised while binding a route.
#[derive(Debug, thiserror::Error)]
pub enum RegistrationError {
    #[error("{verb} {path} is already bound by {existing}; rejected binding from {owner}")]
    Duplicate {
        verb: Verb,
        path: String,
        existing: String,
        owner: String,
    },
    #[error("{path} from {owner} conflicts with bound route {existing}")]
    Conflict {
        path: String,
        existing: String,
        owner: String,
    },
    #[error("{path} from {owner} is not a valid route path: {reason}")]
    InvalidPath {
        path: String,
        owner: String,
        reason: String,
    },
}

/// One handler to bind at a path, with its per-route middleware.
#[derive(Clone)]
pub struct RouteBinding {
    pub verb: Verb,
    pub path: String,
    pub middleware: Vec<Middleware>,
    pub handler: BoundHandler,
    /// Label of whatever produced the binding, for logs and errors.
    pub owner: String,
}

impl fmt::Debug for RouteBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteBinding")
            .field("verb", &self.verb)
            .field("path", &self.path)
            .field("middleware", &self.middleware)
            .field("owner", &self.owner)
            .finish()
    }
}

/// The only server capability route registration gets.
pub trait RouteBinder {
    fn bind(&mut self, binding: RouteBinding) -> Result<(), RegistrationError>;
}

/// How a bind call affected dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindOutcome {
    /// First binding for its (path, verb).
    Active,
    /// Duplicate kept out of dispatch by `FirstWins`.
    Shadowed,
    /// Duplicate that displaced the earlier binding under `LastWins`.
    Replaced,
}

/// Entry in the bind history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindRecord {
    pub verb: Verb,
    pub path: String,
    pub owner: String,
    pub outcome: BindOutcome,
}

pub struct RoutingTable {
    policy: DuplicatePolicy,
    routes: BTreeMap<String, BTreeMap<Verb, RouteBinding>>,
    /// Every path in `routes`, as the router will match them.
    matcher: matchit::Router<()>,
    history: Vec<BindRecord>,
}

impl RoutingTable {
    pub fn new(policy: DuplicatePolicy) -> Self {
        Self {
            policy,
            routes: BTreeMap::new(),
            matcher: matchit::Router::new(),
            history: Vec::new(),
        }
    }

    pub fn policy(&self) -> DuplicatePolicy {
        self.policy
    }

    /// Number of bind calls accepted so far, duplicates included.
    pub fn binding_count(&self) -> usize {
        self.history.len()
    }

    /// Number of (path, verb) pairs requests can reach.
    pub fn active_count(&self) -> usize {
        self.routes.values().map(BTreeMap::len).sum()
    }

    pub fn history(&self) -> &[BindRecord] {
        &self.history
    }

    pub fn contains(&self, verb: Verb, path: &str) -> bool {
        self.active(verb, path).is_some()
    }

    /// The binding that serves `verb` at `path`.
    pub fn active(&self, verb: Verb, path: &str) -> Option<&RouteBinding> {
        self.routes.get(path).and_then(|verbs| verbs.get(&verb))
    }

    /// Render active bindings into a router.
    pub fn to_router(&self) -> Router {
        self.routes
            .iter()
            .fold(Router::new(), |router, (path, verbs)| {
                let method_router = verbs
                    .values()
                    .map(render)
                    .fold(MethodRouter::new(), MethodRouter::merge);
                router.route(path, method_router)
            })
    }
}

fn render(binding: &RouteBinding) -> MethodRouter {
    let handler = BoundHandler::clone(&binding.handler);
    let route = on(binding.verb.filter(), move |req: Request| handler(req));
    middleware::wrap_route(route, &binding.middleware)
}

impl Default for RoutingTable {
    fn default() -> Self {
        Self::new(DuplicatePolicy::default())
    }
}

/// What happened to a path on its first bind.
enum Admission {
    Fresh,
    /// Admitted after evicting conflicting paths.
    Evicted,
    /// Kept out by a conflicting path.
    Shadowed,
}

impl RoutingTable {
    fn record(&mut self, binding: &RouteBinding, outcome: BindOutcome) {
        self.history.push(BindRecord {
            verb: binding.verb,
            path: binding.path.clone(),
            owner: binding.owner.clone(),
            outcome,
        });
    }

    /// Add a path not yet in `routes` to the matcher.
    fn admit_path(&mut self, binding: &RouteBinding) -> Result<Admission, RegistrationError> {
        let mut evicted = false;
        loop {
            let mut candidate = self.matcher.clone();
            let existing = match candidate.insert(binding.path.as_str(), ()) {
                Ok(()) => {
                    self.matcher = candidate;
                    return Ok(if evicted { Admission::Evicted } else { Admission::Fresh });
                }
                Err(matchit::InsertError::Conflict { with, .. }) => with,
                Err(e) => {
                    return Err(RegistrationError::InvalidPath {
                        path: binding.path.clone(),
                        owner: binding.owner.clone(),
                        reason: e.to_string(),
                    })
                }
            };

            match self.policy {
                DuplicatePolicy::FirstWins => {
                    tracing::warn!(
                        verb = %binding.verb,
                        path = %binding.path,
                        existing = %existing,
                        owner = %binding.owner,
                        "Route path conflicts with a bound path and is unreachable"
                    );
                    return Ok(Admission::Shadowed);
                }
                DuplicatePolicy::LastWins if self.routes.contains_key(&existing) => {
                    tracing::warn!(
                        verb = %binding.verb,
                        path = %binding.path,
                        existing = %existing,
                        owner = %binding.owner,
                        "Route path evicts a conflicting bound path"
                    );
                    self.routes.remove(&existing);
                    self.matcher = self.rebuild_matcher();
                    evicted = true;
                }
                _ => {
                    return Err(RegistrationError::Conflict {
                        path: binding.path.clone(),
                        existing,
                        owner: binding.owner.clone(),
                    })
                }
            }
        }
    }

    fn rebuild_matcher(&self) -> matchit::Router<()> {
        let mut matcher = matchit::Router::new();
        for path in self.routes.keys() {
            // Each key was admitted conflict-free against the others.
            let _ = matcher.insert(path.as_str(), ());
        }
        matcher
    }

    /// Outcome for a (path, verb) that is already bound.
    fn resolve_duplicate(&self, binding: &RouteBinding, existing: &RouteBinding) -> Result<BindOutcome, RegistrationError> {
        match self.policy {
            DuplicatePolicy::FirstWins => {
                tracing::warn!(
                    verb = %binding.verb,
                    path = %binding.path,
                    existing = %existing.owner,
                    owner = %binding.owner,
                    "Duplicate route binding is unreachable"
                );
                Ok(BindOutcome::Shadowed)
            }
            DuplicatePolicy::LastWins => {
                tracing::warn!(
                    verb = %binding.verb,
                    path = %binding.path,
                    existing = %existing.owner,
                    owner = %binding.owner,
                    "Duplicate route binding replaces earlier one"
                );
                Ok(BindOutcome::Replaced)
            }
            DuplicatePolicy::Reject => Err(RegistrationError::Duplicate {
                verb: binding.verb,
                path: binding.path.clone(),
                existing: existing.owner.clone(),
                owner: binding.owner.clone(),
            }),
        }
    }
}

impl RouteBinder for RoutingTable {
    fn bind(&mut self, binding: RouteBinding) -> Result<(), RegistrationError> {
        let outcome = match self.routes.get(&binding.path) {
            Some(verbs) => match verbs.get(&binding.verb) {
                Some(existing) => self.resolve_duplicate(&binding, existing)?,
                None => BindOutcome::Active,
            },
            None => match self.admit_path(&binding)? {
                Admission::Fresh => BindOutcome::Active,
                Admission::Evicted => BindOutcome::Replaced,
                Admission::Shadowed => BindOutcome::Shadowed,
            },
        };

        tracing::debug!(verb = %binding.verb, path = %binding.path, owner = %binding.owner, ?outcome, "Route bound");
        self.record(&binding, outcome);
        if outcome != BindOutcome::Shadowed {
            self.routes
                .entry(binding.path.clone())
                .or_default()
                .insert(binding.verb, binding);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::handlers::bound;
    use axum::body::{to_bytes, Body};
    use axum::http::StatusCode;
    use tower::ServiceExt;

    fn binding(verb: Verb, path: &str, owner: &'static str) -> RouteBinding {
        RouteBinding {
            verb,
            path: path.to_string(),
            middleware: Vec::new(),
            handler: bound(move |_req: Request| async move { owner }),
            owner: owner.to_string(),
        }
    }

    async fn call(router: Router, method: &str, uri: &str) -> (StatusCode, String) {
        let req = Request::builder().method(method).uri(uri).body(Body::empty()).unwrap();
        let response = router.oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_first_wins_keeps_earlier_binding() {
        let mut table = RoutingTable::new(DuplicatePolicy::FirstWins);
        table.bind(binding(Verb::Get, "/a", "one")).unwrap();
        table.bind(binding(Verb::Get, "/a", "two")).unwrap();

        assert_eq!(table.binding_count(), 2);
        assert_eq!(table.active_count(), 1);
        assert_eq!(table.history()[1].outcome, BindOutcome::Shadowed);
        assert_eq!(call(table.to_router(), "GET", "/a").await.1, "one");
    }

    #[tokio::test]
    async fn test_last_wins_replaces_binding() {
        let mut table = RoutingTable::new(DuplicatePolicy::LastWins);
        table.bind(binding(Verb::Get, "/a", "one")).unwrap();
        table.bind(binding(Verb::Get, "/a", "two")).unwrap();

        assert_eq!(table.binding_count(), 2);
        assert_eq!(table.history()[1].outcome, BindOutcome::Replaced);
        assert_eq!(call(table.to_router(), "GET", "/a").await.1, "two");
    }

    #[test]
    fn test_reject_fails_on_duplicate() {
        let mut table = RoutingTable::new(DuplicatePolicy::Reject);
        table.bind(binding(Verb::Post, "/a", "one")).unwrap();

        let err = table.bind(binding(Verb::Post, "/a", "two")).unwrap_err();
        assert!(matches!(err, RegistrationError::Duplicate { verb: Verb::Post, .. }));
        assert_eq!(table.binding_count(), 1);
    }

    #[tokio::test]
    async fn test_disjoint_verbs_share_a_path() {
        let mut table = RoutingTable::new(DuplicatePolicy::Reject);
        table.bind(binding(Verb::Get, "/a", "reader")).unwrap();
        table.bind(binding(Verb::Delete, "/a", "remover")).unwrap();

        let router = table.to_router();
        assert_eq!(call(router.clone(), "GET", "/a").await.1, "reader");
        assert_eq!(call(router.clone(), "DELETE", "/a").await.1, "remover");
        assert_eq!(call(router, "PUT", "/a").await.0, StatusCode::METHOD_NOT_ALLOWED);
    }

    #[test]
    fn test_policy_deserializes_snake_case() {
        #[derive(Deserialize)]
        struct Wrapper {
            policy: DuplicatePolicy,
        }
        let parsed: Wrapper = toml::from_str("policy = \"last_wins\"").unwrap();
        assert_eq!(parsed.policy, DuplicatePolicy::LastWins);
    }

    #[tokio::test]
    async fn test_conflicting_capture_is_shadowed_under_first_wins() {
        let mut table = RoutingTable::new(DuplicatePolicy::FirstWins);
        table.bind(binding(Verb::Get, "/users/{id}", "by-id")).unwrap();
        table.bind(binding(Verb::Post, "/users/{name}", "by-name")).unwrap();

        assert_eq!(table.binding_count(), 2);
        assert_eq!(table.history()[1].outcome, BindOutcome::Shadowed);
        assert!(!table.contains(Verb::Post, "/users/{name}"));

        let router = table.to_router();
        assert_eq!(call(router.clone(), "GET", "/users/7").await.1, "by-id");
        assert_eq!(call(router, "POST", "/users/7").await.0, StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_conflicting_capture_evicts_under_last_wins() {
        let mut table = RoutingTable::new(DuplicatePolicy::LastWins);
        table.bind(binding(Verb::Get, "/users/{id}", "by-id")).unwrap();
        table.bind(binding(Verb::Delete, "/users/{id}", "by-id")).unwrap();
        table.bind(binding(Verb::Post, "/users/{name}", "by-name")).unwrap();

        assert_eq!(table.history()[2].outcome, BindOutcome::Replaced);
        assert_eq!(table.active_count(), 1);

        let router = table.to_router();
        assert_eq!(call(router.clone(), "POST", "/users/7").await.1, "by-name");
        assert_eq!(call(router, "GET", "/users/7").await.0, StatusCode::METHOD_NOT_ALLOWED);
    }

    #[test]
    fn test_conflicting_capture_fails_under_reject() {
        let mut table = RoutingTable::new(DuplicatePolicy::Reject);
        table.bind(binding(Verb::Get, "/users/{id}", "by-id")).unwrap();

        let err = table.bind(binding(Verb::Post, "/users/{name}", "by-name")).unwrap_err();
        assert!(matches!(err, RegistrationError::Conflict { ref existing, .. } if existing == "/users/{id}"));
        assert_eq!(table.binding_count(), 1);
    }

    #[tokio::test]
    async fn test_static_and_capture_paths_coexist() {
        let mut table = RoutingTable::new(DuplicatePolicy::Reject);
        table.bind(binding(Verb::Get, "/users/{id}", "by-id")).unwrap();
        table.bind(binding(Verb::Get, "/users/me", "me")).unwrap();

        let router = table.to_router();
        assert_eq!(call(router.clone(), "GET", "/users/me").await.1, "me");
        assert_eq!(call(router, "GET", "/users/3").await.1, "by-id");
    }

    #[test]
    fn test_malformed_path_is_refused_at_bind() {
        let mut table = RoutingTable::new(DuplicatePolicy::FirstWins);

        let err = table.bind(binding(Verb::Get, "/a/{}", "bad")).unwrap_err();
        assert!(matches!(err, RegistrationError::InvalidPath { .. }));
        assert_eq!(table.binding_count(), 0);
        let _ = table.to_router();
    }
}
