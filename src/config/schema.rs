//! Configuration schema definitions for modstrap.
//!
//! This module contains the struct definitions that map to the
//! `.modstrap/config.yml` settings file.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root settings structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModstrapConfig {
    /// Global settings
    pub settings: Settings,

    /// Package manager command templates
    pub package_manager: PackageManagerConfig,
}

/// Global settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Default output mode: verbose, normal, quiet, silent
    pub default_output: OutputMode,

    /// Failure report storage
    pub reports: ReportSettings,
}

/// Output verbosity as written in the settings file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    Verbose,
    #[default]
    Normal,
    Quiet,
    Silent,
}

/// Where failure reports are written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportSettings {
    /// Write a report file for every failed run
    pub enabled: bool,

    /// Report directory (relative to the project root)
    pub dir: PathBuf,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: PathBuf::from(".modstrap").join("reports"),
        }
    }
}

/// Environment variable holding the unit name for every package manager command.
pub const UNIT_ENV_VAR: &str = "MODSTRAP_UNIT";

/// Wrap a PowerShell script so the platform shell passes it through verbatim.
fn pwsh(script: &str) -> String {
    if cfg!(target_os = "windows") {
        format!("pwsh -NoProfile -NonInteractive -Command \"{}\"", script)
    } else {
        format!("pwsh -NoProfile -NonInteractive -Command '{}'", script)
    }
}

/// Shell command templates driving the package manager.
///
/// Every command runs with the unit name in the `MODSTRAP_UNIT` environment
/// variable; the defaults read it as `$env:MODSTRAP_UNIT`. Templates may also
/// use `${unit}`, which is expanded in place. `load` may reference
/// `${force}`, which expands to `-Force` or nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageManagerConfig {
    /// Prints the installed version; empty output or failure means missing.
    pub installed_version: String,

    /// Prints the newest version available from the repository.
    pub available_version: String,

    /// Installs a missing unit.
    pub install: String,

    /// Updates an outdated unit.
    pub update: String,

    /// Loads a unit.
    pub load: String,
}

impl Default for PackageManagerConfig {
    fn default() -> Self {
        Self {
            installed_version: pwsh(
                "(Get-Module -ListAvailable -Name $env:MODSTRAP_UNIT | Sort-Object Version -Descending | Select-Object -First 1).Version.ToString()",
            ),
            available_version: pwsh(
                "(Find-Module -Name $env:MODSTRAP_UNIT -Repository PSGallery -ErrorAction Stop).Version.ToString()",
            ),
            install: pwsh(
                "Install-Module -Name $env:MODSTRAP_UNIT -Repository PSGallery -Scope CurrentUser -Force -AllowClobber -ErrorAction Stop",
            ),
            update: pwsh("Update-Module -Name $env:MODSTRAP_UNIT -Force -ErrorAction Stop"),
            load: pwsh("Import-Module -Name $env:MODSTRAP_UNIT ${force} -ErrorAction Stop"),
        }
    }
}

impl PackageManagerConfig {
    /// All templates with their field names, for validation.
    pub fn templates(&self) -> [(&'static str, &str); 5] {
        [
            ("installed_version", self.installed_version.as_str()),
            ("available_version", self.available_version.as_str()),
            ("install", self.install.as_str()),
            ("update", self.update.as_str()),
            ("load", self.load.as_str()),
        ]
    }
}
