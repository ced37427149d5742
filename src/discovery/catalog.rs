//! Explicit registry of route-unit constructors.
//!
//! Route files on disk name an entry of the catalog instead of carrying code,
//! so "drop a file in the routes directory" works without dynamic loading.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::routing::unit::RouteUnit;

/// Error type returned by unit factories.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Everything a factory receives when constructing a unit.
#[derive(Debug, Clone, Copy)]
pub struct UnitContext<'a> {
    /// Absolute path of the route file being loaded.
    pub source: &'a Path,

    /// The file's `[settings]` table, empty when absent.
    pub settings: &'a toml::Table,
}

impl UnitContext<'_> {
    /// Read a string setting.
    pub fn str_setting(&self, key: &str) -> Option<&str> {
        self.settings.get(key).and_then(toml::Value::as_str)
    }

    /// Deserialize the whole settings table into `T`.
    pub fn settings_as<T: serde::de::DeserializeOwned>(&self) -> Result<T, toml::de::Error> {
        toml::Value::Table(self.settings.clone()).try_into()
    }
}

type Factory = dyn Fn(&UnitContext<'_>) -> Result<Arc<dyn RouteUnit>, BoxError> + Send + Sync;

/// Named constructors for route units.
#[derive(Clone, Default)]
pub struct UnitCatalog {
    factories: BTreeMap<String, Arc<Factory>>,
}

impl UnitCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `factory` under `name`, replacing any earlier entry.
    pub fn register<U, F>(&mut self, name: impl Into<String>, factory: F) -> &mut Self
    where
        U: RouteUnit,
        F: Fn(&UnitContext<'_>) -> Result<U, BoxError> + Send + Sync + 'static,
    {
        let factory: Arc<Factory> = Arc::new(move |ctx: &UnitContext<'_>| -> Result<Arc<dyn RouteUnit>, BoxError> {
            let unit: Arc<dyn RouteUnit> = Arc::new(factory(ctx)?);
            Ok(unit)
        });
        self.factories.insert(name.into(), factory);
        self
    }

    /// Builder-style [`register`](Self::register).
    pub fn with<U, F>(mut self, name: impl Into<String>, factory: F) -> Self
    where
        U: RouteUnit,
        F: Fn(&UnitContext<'_>) -> Result<U, BoxError> + Send + Sync + 'static,
    {
        self.register(name, factory);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Construct the unit registered under `name`, if any.
    pub fn construct(
        &self,
        name: &str,
        ctx: &UnitContext<'_>,
    ) -> Option<Result<Arc<dyn RouteUnit>, BoxError>> {
        self.factories.get(name).map(|factory| factory(ctx))
    }
}

impl fmt::Debug for UnitCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.factories.keys()).finish()
    }
}
