//! Unit installation and loading.
//!
//! The bootstrapper talks to the package manager through two traits:
//!
//! - [`UnitInstaller`] - ensure a unit is installed at a current version
//! - [`UnitLoader`] - load a unit into the session, optionally forcing a reload
//!
//! Production implementations run configurable shell command templates:
//! [`CommandInstaller`] and [`CommandLoader`]. The unit name reaches each
//! command through the `MODSTRAP_UNIT` environment variable, never through
//! shell parsing of the template.

pub mod installer;
pub mod loader;
pub mod version;

pub use installer::CommandInstaller;
pub use loader::{CommandLoader, LoadedUnit, LoadedUnits};
pub use version::{extract_version, is_newer_version};

use std::fmt;

use crate::config::UNIT_ENV_VAR;
use crate::error::{ModstrapError, Result, UnitOperation};
use crate::manifest::is_valid_unit_name;
use crate::shell::{execute, CommandOptions, CommandResult};

/// Ensures a unit is present at a current version.
pub trait UnitInstaller {
    /// Install the unit if missing, update it if outdated, otherwise leave it.
    fn ensure_installed(&mut self, unit: &str) -> Result<InstallOutcome>;
}

/// Makes a unit's exported functionality available to the session.
pub trait UnitLoader {
    /// Load the unit. With `force`, reload even if already loaded.
    fn load(&mut self, unit: &str, force: bool) -> Result<()>;
}

/// What ensuring a unit actually did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    /// The unit was missing and has been installed.
    Installed { version: Option<String> },
    /// The unit was outdated and has been updated.
    Updated { from: String, to: String },
    /// The unit was already current.
    Current { version: String },
}

impl fmt::Display for InstallOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstallOutcome::Installed { version: Some(v) } => write!(f, "installed {}", v),
            InstallOutcome::Installed { version: None } => write!(f, "installed"),
            InstallOutcome::Updated { from, to } => write!(f, "updated {} → {}", from, to),
            InstallOutcome::Current { version } => write!(f, "up to date ({})", version),
        }
    }
}

/// Runs a fully expanded command line on behalf of a unit.
///
/// Arguments are the command line and the unit name.
pub type CommandRunner = Box<dyn Fn(&str, &str) -> Result<CommandResult>>;

/// Runner backed by the platform shell, exporting the unit as `MODSTRAP_UNIT`.
pub fn shell_runner() -> CommandRunner {
    Box::new(|command: &str, unit: &str| {
        execute(command, &CommandOptions::default().with_env(UNIT_ENV_VAR, unit))
    })
}

/// Reject names that could change the meaning of a command line.
fn check_unit_name(unit: &str, operation: UnitOperation) -> Result<()> {
    if is_valid_unit_name(unit) {
        return Ok(());
    }
    Err(ModstrapError::UnitOperationError {
        unit: unit.to_string(),
        operation,
        message: format!("'{}' is not a valid unit name", unit),
    })
}
