//! modstrap - Make sure a script's module dependencies are installed and loaded.
//!
//! modstrap reads a manifest naming required, imported, and custom units,
//! installs or updates the required ones through the package manager, then
//! force-loads every imported and custom unit into the session. The first
//! failure stops the run.
//!
//! # Modules
//!
//! - [`bootstrap`] - The bootstrapper state machine
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Settings loading and command templates
//! - [`error`] - Error types and result aliases
//! - [`manifest`] - Manifest decoding (`.psd1`, JSON, YAML)
//! - [`report`] - Event logging and failure reporting
//! - [`shell`] - Shell command execution
//! - [`ui`] - Terminal output
//! - [`units`] - Package manager install and load
//!
//! # Example
//!
//! ```
//! use modstrap::config::{InterpolationContext, resolve_string};
//!
//! let ctx = InterpolationContext::for_unit("Pester").with("force", "-Force");
//! let command = resolve_string("Import-Module ${unit} ${force}", &ctx).unwrap();
//! assert_eq!(command, "Import-Module Pester -Force");
//! ```
//!
//! For end-to-end runs, see the integration tests.

pub mod bootstrap;
pub mod cli;
pub mod config;
pub mod error;
pub mod manifest;
pub mod report;
pub mod shell;
pub mod ui;
pub mod units;

pub use error::{ModstrapError, Result};
