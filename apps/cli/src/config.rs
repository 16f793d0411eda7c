//! # Catalog Configuration
//!
//! Finds and loads the catalog the CLI prices against.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Catalog Priority                                     │
//! │                                                                         │
//! │  1. --catalog <PATH> flag (highest priority)                            │
//! │                                                                         │
//! │  2. Environment Variable                                                │
//! │     TALLY_CATALOG=/srv/tally/catalog.toml                               │
//! │                                                                         │
//! │  3. TOML file in the platform config directory                          │
//! │     ~/.config/tally/catalog.toml (Linux)                                │
//! │     ~/Library/Application Support/dev.tally.tally/catalog.toml (macOS)  │
//! │                                                                         │
//! │  4. Built-in telecom catalog (lowest priority)                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A path given by flag or environment must exist. The config directory
//! file is optional and silently skipped when missing.

use anyhow::{Context, Result};
use std::fmt;
use std::path::{Path, PathBuf};
use tally_core::Catalog;
use tracing::{debug, info};

/// Environment variable naming a catalog file.
pub const ENV_CATALOG: &str = "TALLY_CATALOG";

/// File name looked up in the platform config directory.
pub const CATALOG_FILE_NAME: &str = "catalog.toml";

// =============================================================================
// Catalog Source
// =============================================================================

/// Where the active catalog came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSource {
    /// `--catalog` on the command line.
    Flag(PathBuf),

    /// The `TALLY_CATALOG` environment variable.
    Env(PathBuf),

    /// `catalog.toml` in the platform config directory.
    ConfigDir(PathBuf),

    /// Compiled into the binary.
    Builtin,
}

impl CatalogSource {
    /// Picks a source by priority.
    ///
    /// `config_file` is only chosen when it exists on disk.
    pub fn resolve(
        flag: Option<PathBuf>,
        env: Option<PathBuf>,
        config_file: Option<PathBuf>,
    ) -> Self {
        if let Some(path) = flag {
            return CatalogSource::Flag(path);
        }
        if let Some(path) = env {
            debug!(?path, "Catalog path from environment");
            return CatalogSource::Env(path);
        }
        match config_file {
            Some(path) if path.exists() => CatalogSource::ConfigDir(path),
            Some(path) => {
                debug!(?path, "Config catalog not found, using built-in");
                CatalogSource::Builtin
            }
            None => CatalogSource::Builtin,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            CatalogSource::Flag(path)
            | CatalogSource::Env(path)
            | CatalogSource::ConfigDir(path) => Some(path),
            CatalogSource::Builtin => None,
        }
    }
}

impl fmt::Display for CatalogSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogSource::Flag(path) => write!(f, "{} (--catalog)", path.display()),
            CatalogSource::Env(path) => write!(f, "{} ({})", path.display(), ENV_CATALOG),
            CatalogSource::ConfigDir(path) => write!(f, "{} (config dir)", path.display()),
            CatalogSource::Builtin => write!(f, "built-in"),
        }
    }
}

// =============================================================================
// Loading
// =============================================================================

/// Resolves the catalog source from the flag, the environment and the
/// config directory, then loads it.
pub fn load_catalog(flag: Option<PathBuf>) -> Result<(Catalog, CatalogSource)> {
    let env = std::env::var_os(ENV_CATALOG)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from);
    let source = CatalogSource::resolve(flag, env, default_config_path());

    let catalog = match source.path() {
        Some(path) => read_catalog(path)?,
        None => Catalog::telecom(),
    };

    info!(
        source = %source,
        name = catalog.name(),
        products = catalog.products().len(),
        rules = catalog.rules().len(),
        "Catalog loaded"
    );
    Ok((catalog, source))
}

/// Reads and parses a catalog file.
pub fn read_catalog(path: &Path) -> Result<Catalog> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read catalog {}", path.display()))?;
    Catalog::from_toml_str(&contents)
        .with_context(|| format!("invalid catalog {}", path.display()))
}

/// `<platform config dir>/catalog.toml`.
fn default_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("dev", "tally", "tally")
        .map(|dirs| dirs.config_dir().join(CATALOG_FILE_NAME))
}

// =============================================================================
// Unit Tests
// =============================================================================
