//! Settings file discovery, loading, and validation.

use crate::config::interpolation::{extract_variables, KNOWN_VARIABLES};
use crate::config::schema::ModstrapConfig;
use crate::error::{ModstrapError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Location of the project settings file relative to the project root.
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".modstrap").join("config.yml")
}

/// Load a single settings file.
///
/// # Errors
///
/// Returns `ConfigNotFound` if the file doesn't exist.
/// Returns `ConfigParseError` if the YAML is invalid.
pub fn load_config_file(path: &Path) -> Result<ModstrapConfig> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ModstrapError::ConfigNotFound {
                path: path.to_path_buf(),
            }
        } else {
            ModstrapError::Io(e)
        }
    })?;

    parse_config(&content, path)
}

/// Parse YAML content into a `ModstrapConfig`.
pub fn parse_config(content: &str, source_path: &Path) -> Result<ModstrapConfig> {
    if content.trim().is_empty() {
        return Ok(ModstrapConfig::default());
    }
    serde_yaml::from_str(content).map_err(|e| ModstrapError::ConfigParseError {
        path: source_path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Load settings with optional path override.
///
/// An explicit override must exist. Otherwise the project settings file is
/// used when present, and built-in defaults when not.
pub fn load_config(project_root: &Path, config_override: Option<&Path>) -> Result<ModstrapConfig> {
    let config = if let Some(override_path) = config_override {
        load_config_file(override_path)?
    } else {
        let path = project_config_path(project_root);
        if path.is_file() {
            load_config_file(&path)?
        } else {
            tracing::debug!("No settings at {}, using defaults", path.display());
            ModstrapConfig::default()
        }
    };

    validate(&config)?;
    Ok(config)
}

/// Check every command template is usable.
///
/// # Errors
///
/// Returns `ConfigValidationError` for an empty template or a template
/// referencing an unknown variable.
pub fn validate(config: &ModstrapConfig) -> Result<()> {
    for (name, template) in config.package_manager.templates() {
        if template.trim().is_empty() {
            return Err(ModstrapError::ConfigValidationError {
                message: format!("package_manager.{} must not be empty", name),
            });
        }

        let mut unknown: Vec<String> = extract_variables(template)
            .into_iter()
            .filter(|v| !KNOWN_VARIABLES.contains(&v.as_str()))
            .collect();
        unknown.sort();

        if !unknown.is_empty() {
            return Err(ModstrapError::ConfigValidationError {
                message: format!(
                    "package_manager.{} references unknown variable(s): {}",
                    name,
                    unknown.join(", ")
                ),
            });
        }
    }
    Ok(())
}
