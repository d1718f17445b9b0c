//! Settings loading, parsing, and validation for modstrap.
//!
//! - Schema definitions in [`schema`]
//! - File discovery, loading, and validation in [`loader`]
//! - Command template expansion in [`interpolation`]
//!
//! # Example
//!
//! ```
//! use modstrap::config::{load_config, ModstrapConfig};
//! use tempfile::TempDir;
//!
//! let temp = TempDir::new().unwrap();
//! let config = load_config(temp.path(), None).unwrap();
//! assert_eq!(config, ModstrapConfig::default());
//! ```
//!
//! # Settings File Location
//!
//! 1. `--config PATH` (or `MODSTRAP_CONFIG`), which must exist
//! 2. Project settings (`.modstrap/config.yml`)
//! 3. Built-in defaults

pub mod interpolation;
pub mod loader;
pub mod schema;

pub use interpolation::{
    extract_variables, parse_interpolation, resolve_string, InterpolationContext, Segment,
    KNOWN_VARIABLES,
};
pub use loader::{load_config, load_config_file, parse_config, project_config_path, validate};
pub use schema::{
    ModstrapConfig, OutputMode, PackageManagerConfig, ReportSettings, Settings, UNIT_ENV_VAR,
};
