//! Per-verb handler tables bound to their owning unit.

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use axum::extract::Request;
use axum::response::{IntoResponse, Response};
use futures_util::future::BoxFuture;

use crate::routing::unit::Verb;

/// A type-erased request handler, already bound to its unit instance.
pub type BoundHandler = Arc<dyn Fn(Request) -> BoxFuture<'static, Response> + Send + Sync>;

/// Wrap an async closure into a [`BoundHandler`].
pub fn bound<F, Fut, R>(f: F) -> BoundHandler
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse,
{
    Arc::new(move |req| {
        let fut = f(req);
        Box::pin(async move { fut.await.into_response() })
    })
}

/// The handlers a unit declares, at most one per verb.
#[derive(Clone, Default)]
pub struct MethodHandlers {
    handlers: BTreeMap<Verb, BoundHandler>,
}

impl MethodHandlers {
    /// Start a handler table whose handlers all receive `unit`.
    pub fn on<U>(unit: Arc<U>) -> HandlerTable<U>
    where
        U: Send + Sync + 'static,
    {
        HandlerTable {
            unit,
            handlers: BTreeMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub fn get(&self, verb: Verb) -> Option<&BoundHandler> {
        self.handlers.get(&verb)
    }

    /// Declared verbs in `Verb` order.
    pub fn verbs(&self) -> impl Iterator<Item = Verb> + '_ {
        self.handlers.keys().copied()
    }
}

impl IntoIterator for MethodHandlers {
    type Item = (Verb, BoundHandler);
    type IntoIter = std::collections::btree_map::IntoIter<Verb, BoundHandler>;

    fn into_iter(self) -> Self::IntoIter {
        self.handlers.into_iter()
    }
}

impl fmt::Debug for MethodHandlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.handlers.keys()).finish()
    }
}

/// Builder binding async methods of `U` to verbs.
pub struct HandlerTable<U> {
    unit: Arc<U>,
    handlers: BTreeMap<Verb, BoundHandler>,
}

impl<U> HandlerTable<U>
where
    U: Send + Sync + 'static,
{
    /// Bind `f` to `verb`. A second call for the same verb replaces the first.
    pub fn handler<F, Fut, R>(mut self, verb: Verb, f: F) -> Self
    where
        F: Fn(Arc<U>, Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoResponse,
    {
        let unit = Arc::clone(&self.unit);
        self.handlers
            .insert(verb, bound(move |req| f(Arc::clone(&unit), req)));
        self
    }

    pub fn get<F, Fut, R>(self, f: F) -> Self
    where
        F: Fn(Arc<U>, Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoResponse,
    {
        self.handler(Verb::Get, f)
    }

    pub fn post<F, Fut, R>(self, f: F) -> Self
    where
        F: Fn(Arc<U>, Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoResponse,
    {
        self.handler(Verb::Post, f)
    }

    pub fn put<F, Fut, R>(self, f: F) -> Self
    where
        F: Fn(Arc<U>, Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoResponse,
    {
        self.handler(Verb::Put, f)
    }

    pub fn patch<F, Fut, R>(self, f: F) -> Self
    where
        F: Fn(Arc<U>, Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoResponse,
    {
        self.handler(Verb::Patch, f)
    }

    pub fn delete<F, Fut, R>(self, f: F) -> Self
    where
        F: Fn(Arc<U>, Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoResponse,
    {
        self.handler(Verb::Delete, f)
    }

    pub fn head<F, Fut, R>(self, f: F) -> Self
    where
        F: Fn(Arc<U>, Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoResponse,
    {
        self.handler(Verb::Head, f)
    }

    pub fn build(self) -> MethodHandlers {
        MethodHandlers {
            handlers: self.handlers,
        }
    }
}
