//! Install-or-update through package manager command templates.
//!
//! For each unit the installer asks the package manager for the installed
//! version. A missing unit is installed. An installed unit is compared with
//! the newest version the repository offers and updated when behind.

use crate::config::{resolve_string, InterpolationContext, PackageManagerConfig};
use crate::error::{ModstrapError, Result, UnitOperation};
use crate::units::version::{extract_version, is_newer_version};
use crate::units::{check_unit_name, shell_runner, CommandRunner, InstallOutcome, UnitInstaller};

/// [`UnitInstaller`] driven by shell command templates.
pub struct CommandInstaller {
    config: PackageManagerConfig,
    run: CommandRunner,
}

impl CommandInstaller {
    /// Installer that runs commands through the platform shell.
    pub fn new(config: PackageManagerConfig) -> Self {
        Self::with_runner(config, shell_runner())
    }

    /// Installer with a custom command runner.
    pub fn with_runner(config: PackageManagerConfig, run: CommandRunner) -> Self {
        Self { config, run }
    }

    fn command(&self, template: &str, unit: &str) -> Result<String> {
        resolve_string(template, &InterpolationContext::for_unit(unit))
            .map_err(|e| ModstrapError::install(unit, e.to_string()))
    }

    /// Run a version query; `None` when it fails or prints no version.
    fn query_version(&self, template: &str, unit: &str) -> Result<Option<String>> {
        let command = self.command(template, unit)?;
        let result = (self.run)(&command, unit)?;
        if !result.success {
            tracing::debug!("Version query for {} failed: {}", unit, result.failure_message());
            return Ok(None);
        }
        Ok(result.first_line().and_then(extract_version))
    }

    fn run_step(&self, template: &str, unit: &str, action: &str) -> Result<()> {
        let command = self.command(template, unit)?;
        let result = (self.run)(&command, unit)?;
        if result.success {
            Ok(())
        } else {
            Err(ModstrapError::install(
                unit,
                format!("{} failed: {}", action, result.failure_message()),
            ))
        }
    }
}

impl UnitInstaller for CommandInstaller {
    fn ensure_installed(&mut self, unit: &str) -> Result<InstallOutcome> {
        check_unit_name(unit, UnitOperation::Install)?;
        let installed = self.query_version(&self.config.installed_version, unit)?;

        let Some(current) = installed else {
            tracing::debug!("{} is not installed", unit);
            self.run_step(&self.config.install, unit, "install")?;
            let version = self.query_version(&self.config.installed_version, unit)?;
            return Ok(InstallOutcome::Installed { version });
        };

        let available = self
            .query_version(&self.config.available_version, unit)?
            .ok_or_else(|| ModstrapError::install(unit, "not found in the package repository"))?;

        if is_newer_version(&available, &current) {
            tracing::debug!("{} {} is older than {}", unit, current, available);
            self.run_step(&self.config.update, unit, "update")?;
            Ok(InstallOutcome::Updated {
                from: current,
                to: available,
            })
        } else {
            Ok(InstallOutcome::Current { version: current })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::testing::ScriptedRunner;

    fn templates() -> PackageManagerConfig {
        PackageManagerConfig {
            installed_version: "installed ${unit}".into(),
            available_version: "available ${unit}".into(),
            install: "install ${unit}".into(),
            update: "update ${unit}".into(),
            load: "load ${unit} ${force}".into(),
        }
    }

    #[test]
    fn installs_missing_unit() {
        let script = ScriptedRunner::default();
        script.respond("installed Pester", 1, "");
        script.respond("install Pester", 0, "");

        let mut installer = CommandInstaller::with_runner(templates(), script.runner());
        let outcome = installer.ensure_installed("Pester").unwrap();

        assert_eq!(outcome, InstallOutcome::Installed { version: None });
        assert_eq!(
            script.calls(),
            vec!["installed Pester", "install Pester", "installed Pester"]
        );
    }

    #[test]
    fn empty_version_output_counts_as_missing() {
        let script = ScriptedRunner::default();
        script.respond("installed Pester", 0, "\n");
        script.respond("install Pester", 0, "");

        let mut installer = CommandInstaller::with_runner(templates(), script.runner());
        let outcome = installer.ensure_installed("Pester").unwrap();
        assert!(matches!(outcome, InstallOutcome::Installed { .. }));
    }

    #[test]
    fn updates_outdated_unit() {
        let script = ScriptedRunner::default();
        script.respond("installed Az.Storage", 0, "5.9.0\n");
        script.respond("available Az.Storage", 0, "6.1.3\n");
        script.respond("update Az.Storage", 0, "");

        let mut installer = CommandInstaller::with_runner(templates(), script.runner());
        let outcome = installer.ensure_installed("Az.Storage").unwrap();

        assert_eq!(
            outcome,
            InstallOutcome::Updated {
                from: "5.9.0".into(),
                to: "6.1.3".into()
            }
        );
        assert!(script.calls().contains(&"update Az.Storage".to_string()));
    }

    #[test]
    fn leaves_current_unit_alone() {
        let script = ScriptedRunner::default();
        script.respond("installed Az.Storage", 0, "6.1.3");
        script.respond("available Az.Storage", 0, "6.1.3");

        let mut installer = CommandInstaller::with_runner(templates(), script.runner());
        let outcome = installer.ensure_installed("Az.Storage").unwrap();

        assert_eq!(
            outcome,
            InstallOutcome::Current {
                version: "6.1.3".into()
            }
        );
        assert_eq!(script.calls().len(), 2);
    }

    #[test]
    fn unit_missing_from_repository_is_error() {
        let script = ScriptedRunner::default();
        script.respond("installed Local.Only", 0, "1.0.0");

        let mut installer = CommandInstaller::with_runner(templates(), script.runner());
        let err = installer.ensure_installed("Local.Only").unwrap_err();

        assert!(err.to_string().contains("not found in the package repository"));
    }

    #[test]
    fn failed_install_is_install_error() {
        let script = ScriptedRunner::default();
        script.respond("installed Nope", 1, "");

        let mut installer = CommandInstaller::with_runner(templates(), script.runner());
        let err = installer.ensure_installed("Nope").unwrap_err();

        match err {
            ModstrapError::UnitOperationError {
                unit,
                operation,
                message,
            } => {
                assert_eq!(unit, "Nope");
                assert_eq!(operation, UnitOperation::Install);
                assert!(message.contains("install failed"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn unknown_template_variable_is_install_error() {
        let mut config = templates();
        config.installed_version = "installed ${module}".into();
        let script = ScriptedRunner::default();

        let mut installer = CommandInstaller::with_runner(config, script.runner());
        let err = installer.ensure_installed("Pester").unwrap_err();

        assert!(matches!(err, ModstrapError::UnitOperationError { .. }));
        assert!(script.calls().is_empty());
    }

    #[test]
    fn passes_unit_name_to_runner() {
        let script = ScriptedRunner::default();
        script.respond("installed", 0, "2.0.0");
        script.respond("available", 0, "2.0.0");

        let pm = PackageManagerConfig {
            installed_version: "installed".into(),
            available_version: "available".into(),
            ..templates()
        };
        let mut installer = CommandInstaller::with_runner(pm, script.runner());
        installer.ensure_installed("PSReadLine").unwrap();

        assert_eq!(script.units(), vec!["PSReadLine", "PSReadLine"]);
    }

    #[test]
    fn rejects_invalid_name_before_running_anything() {
        let script = ScriptedRunner::default();

        let mut installer = CommandInstaller::with_runner(templates(), script.runner());
        let err = installer.ensure_installed("x`whoami`").unwrap_err();

        assert!(err.to_string().contains("not a valid unit name"));
        assert!(script.calls().is_empty());
    }
}
