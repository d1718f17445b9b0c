//! Unit loading through a package manager command template.

use chrono::{DateTime, Utc};

use crate::config::{resolve_string, InterpolationContext};
use crate::error::{ModstrapError, Result, UnitOperation};
use crate::units::{check_unit_name, shell_runner, CommandRunner, UnitLoader};

/// A unit that loaded successfully during this run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedUnit {
    /// Unit name as first loaded.
    pub name: String,
    /// Number of times the unit has been loaded.
    pub loads: u32,
    /// When the unit was first loaded.
    pub first_loaded_at: DateTime<Utc>,
    /// When the unit was most recently (re)loaded.
    pub last_loaded_at: DateTime<Utc>,
}

/// Table of successful loads, in first-load order.
///
/// Each `load` command runs in its own short-lived process, so an entry
/// records that the unit imported cleanly, not that it stays loaded anywhere.
/// Unit names compare case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct LoadedUnits {
    units: Vec<LoadedUnit>,
}

impl LoadedUnits {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a loaded unit.
    pub fn get(&self, name: &str) -> Option<&LoadedUnit> {
        self.units.iter().find(|u| u.name.eq_ignore_ascii_case(name))
    }

    /// Whether the unit has been loaded.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Record a (re)load, replacing any previous entry's timestamp.
    pub fn record(&mut self, name: &str) {
        let now = Utc::now();
        match self
            .units
            .iter_mut()
            .find(|u| u.name.eq_ignore_ascii_case(name))
        {
            Some(existing) => {
                existing.loads += 1;
                existing.last_loaded_at = now;
            }
            None => self.units.push(LoadedUnit {
                name: name.to_string(),
                loads: 1,
                first_loaded_at: now,
                last_loaded_at: now,
            }),
        }
    }

    /// All loaded units.
    pub fn iter(&self) -> impl Iterator<Item = &LoadedUnit> {
        self.units.iter()
    }

    /// Number of distinct loaded units.
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// True if nothing has been loaded.
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

/// [`UnitLoader`] that runs the `load` template and tracks loaded units.
pub struct CommandLoader {
    template: String,
    run: CommandRunner,
    loaded: LoadedUnits,
}

impl CommandLoader {
    /// Loader that runs commands through the platform shell.
    pub fn new(template: impl Into<String>) -> Self {
        Self::with_runner(template, shell_runner())
    }

    /// Loader with a custom command runner.
    pub fn with_runner(template: impl Into<String>, run: CommandRunner) -> Self {
        Self {
            template: template.into(),
            run,
            loaded: LoadedUnits::new(),
        }
    }

    /// Units loaded so far.
    pub fn loaded(&self) -> &LoadedUnits {
        &self.loaded
    }
}

impl UnitLoader for CommandLoader {
    fn load(&mut self, unit: &str, force: bool) -> Result<()> {
        check_unit_name(unit, UnitOperation::Load)?;
        if !force && self.loaded.contains(unit) {
            tracing::debug!("{} already loaded, skipping", unit);
            return Ok(());
        }

        let ctx = InterpolationContext::for_unit(unit).with("force", if force { "-Force" } else { "" });
        let command =
            resolve_string(&self.template, &ctx).map_err(|e| ModstrapError::load(unit, e.to_string()))?;

        let result = (self.run)(command.trim(), unit)?;
        if !result.success {
            return Err(ModstrapError::load(unit, result.failure_message()));
        }

        self.loaded.record(unit);
        Ok(())
    }
}
