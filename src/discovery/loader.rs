//! Route file loading and validation.
//!
//! # Responsibilities
//! - Read one route file and parse it as a TOML route manifest
//! - Resolve its `export` against the unit catalog and construct the unit
//! - Classify non-conforming files as skippable, everything else as fatal
//!
//! # Manifest
//! ```toml
//! export = "items"        # catalog entry to construct
//!
//! [settings]              # optional, handed to the factory
//! page_size = 20
//! ```
//!
//! # Design Decisions
//! - Unreadable or syntactically broken files are fatal: they point at a
//!   broken deployment rather than a stray file
//! - A missing or unknown export only skips the file
//! - Metadata is not inspected beyond the mount path

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;

use crate::discovery::catalog::{BoxError, UnitCatalog, UnitContext};
use crate::routing::unit::{validate_mount_path, RouteUnit};

/// Fatal error while loading a route file.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read route file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse route file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("route unit `{export}` from {path} failed to construct: {source}")]
    Construct {
        path: PathBuf,
        export: String,
        #[source]
        source: BoxError,
    },
}

/// On-disk form of a route file.
#[derive(Debug, Deserialize)]
pub struct RouteManifest {
    /// Name of the catalog entry this file exports.
    pub export: Option<String>,

    #[serde(default)]
    pub settings: toml::Table,
}

/// Why a route file was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The file has no `export`.
    MissingExport,
    /// The `export` names nothing in the catalog.
    UnknownExport(String),
    /// The constructed unit has a mount path the router cannot bind.
    InvalidMountPath { path: String, reason: String },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingExport => write!(f, "no default export"),
            SkipReason::UnknownExport(name) => write!(f, "export `{}` is not a known route unit", name),
            SkipReason::InvalidMountPath { path, reason } => {
                write!(f, "invalid mount path `{}`: {}", path, reason)
            }
        }
    }
}

/// A constructed, validated route unit and where it came from.
#[derive(Clone)]
pub struct LoadedUnit {
    pub source: PathBuf,
    pub export: String,
    pub unit: Arc<dyn RouteUnit>,
}

impl LoadedUnit {
    pub fn mount_path(&self) -> &str {
        &self.unit.options().path
    }
}

impl fmt::Debug for LoadedUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedUnit")
            .field("source", &self.source)
            .field("export", &self.export)
            .field("options", self.unit.options())
            .finish()
    }
}

/// Result of loading one route file.
#[derive(Debug)]
pub enum LoadOutcome {
    Unit(LoadedUnit),
    Skipped(SkipReason),
}

/// Load the route file at `path`.
pub fn load(path: &Path, catalog: &UnitCatalog) -> Result<LoadOutcome, LoadError> {
    let content = std::fs::read_to_string(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let manifest: RouteManifest = toml::from_str(&content).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let Some(export) = manifest.export else {
        return Ok(LoadOutcome::Skipped(SkipReason::MissingExport));
    };

    let ctx = UnitContext {
        source: path,
        settings: &manifest.settings,
    };
    let unit = match catalog.construct(&export, &ctx) {
        None => return Ok(LoadOutcome::Skipped(SkipReason::UnknownExport(export))),
        Some(Err(source)) => {
            return Err(LoadError::Construct {
                path: path.to_path_buf(),
                export,
                source,
            })
        }
        Some(Ok(unit)) => unit,
    };

    if let Err(reason) = validate_mount_path(&unit.options().path) {
        return Ok(LoadOutcome::Skipped(SkipReason::InvalidMountPath {
            path: unit.options().path.clone(),
            reason,
        }));
    }

    Ok(LoadOutcome::Unit(LoadedUnit {
        source: path.to_path_buf(),
        export,
        unit,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::unit::RouteOptions;
    use std::fs;

    struct Plain {
        options: RouteOptions,
    }

    impl RouteUnit for Plain {
        fn options(&self) -> &RouteOptions {
            &self.options
        }
    }

    fn catalog() -> UnitCatalog {
        UnitCatalog::new()
            .with("plain", |ctx: &UnitContext<'_>| {
                let path = ctx.str_setting("path").unwrap_or("/plain");
                Ok(Plain {
                    options: RouteOptions::new(path),
                })
            })
            .with("broken", |_: &UnitContext<'_>| -> Result<Plain, BoxError> {
                Err("no database".into())
            })
    }

    fn load_str(content: &str) -> Result<LoadOutcome, LoadError> {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("route.toml");
        fs::write(&path, content).unwrap();
        load(&path, &catalog())
    }

    #[test]
    fn test_conforming_file_loads() {
        let outcome = load_str("export = \"plain\"\n[settings]\npath = \"/items\"\n").unwrap();

        match outcome {
            LoadOutcome::Unit(loaded) => {
                assert_eq!(loaded.export, "plain");
                assert_eq!(loaded.mount_path(), "/items");
            }
            other => panic!("expected a unit, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_export_is_skipped() {
        let outcome = load_str("[settings]\npath = \"/items\"\n").unwrap();
        assert!(matches!(outcome, LoadOutcome::Skipped(SkipReason::MissingExport)));

        let outcome = load_str("").unwrap();
        assert!(matches!(outcome, LoadOutcome::Skipped(SkipReason::MissingExport)));
    }

    #[test]
    fn test_unknown_export_is_skipped() {
        let outcome = load_str("export = \"nope\"").unwrap();
        assert!(matches!(
            outcome,
            LoadOutcome::Skipped(SkipReason::UnknownExport(ref name)) if name == "nope"
        ));
    }

    #[test]
    fn test_unusable_mount_path_is_skipped() {
        let outcome = load_str("export = \"plain\"\n[settings]\npath = \"items/:id\"\n").unwrap();
        assert!(matches!(
            outcome,
            LoadOutcome::Skipped(SkipReason::InvalidMountPath { .. })
        ));
    }

    #[test]
    fn test_syntax_error_is_fatal() {
        let err = load_str("export = ").unwrap_err();
        assert!(matches!(err, LoadError::Parse { .. }));
    }

    #[test]
    fn test_factory_failure_is_fatal() {
        let err = load_str("export = \"broken\"").unwrap_err();
        assert!(matches!(err, LoadError::Construct { ref export, .. } if export == "broken"));
    }

    #[test]
    fn test_unreadable_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(&dir.path().join("gone.toml"), &catalog()).unwrap_err();
        assert!(matches!(err, LoadError::Read { .. }));
    }
}
