//! Error types for modstrap operations.
//!
//! This module defines [`ModstrapError`], the primary error type used throughout
//! the application, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Manifest problems surface as `ManifestNotFound` or `ManifestParseError`
//! - Any failure installing or loading a single unit is a `UnitOperationError`
//! - Use `anyhow::Error` (via `ModstrapError::Other`) for unexpected errors

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// The collaborator operation that failed for a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitOperation {
    /// Ensuring the unit is installed at a current version.
    Install,
    /// Loading the unit into the session.
    Load,
}

impl fmt::Display for UnitOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitOperation::Install => write!(f, "install"),
            UnitOperation::Load => write!(f, "load"),
        }
    }
}

/// Core error type for modstrap operations.
#[derive(Debug, Error)]
pub enum ModstrapError {
    /// Manifest file does not exist.
    #[error("Manifest not found: {path}")]
    ManifestNotFound { path: PathBuf },

    /// Manifest exists but could not be decoded.
    #[error("Failed to parse manifest at {path}: {message}")]
    ManifestParseError { path: PathBuf, message: String },

    /// Installing or loading a unit failed.
    #[error("Failed to {operation} '{unit}': {message}")]
    UnitOperationError {
        unit: String,
        operation: UnitOperation,
        message: String,
    },

    /// Settings file given explicitly but missing.
    #[error("Configuration not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Failed to parse the settings file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// Invalid settings values.
    #[error("Invalid configuration: {message}")]
    ConfigValidationError { message: String },

    /// Shell command could not be run.
    #[error("Command failed with exit code {code:?}: {command}")]
    CommandFailed { command: String, code: Option<i32> },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ModstrapError {
    /// Stable category name, used in failure reports.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ManifestNotFound { .. } => "manifest_not_found",
            Self::ManifestParseError { .. } => "manifest_parse_error",
            Self::UnitOperationError { .. } => "unit_operation_error",
            Self::ConfigNotFound { .. } => "config_not_found",
            Self::ConfigParseError { .. } => "config_parse_error",
            Self::ConfigValidationError { .. } => "config_validation_error",
            Self::CommandFailed { .. } => "command_failed",
            Self::Io(_) => "io",
            Self::Other(_) => "other",
        }
    }

    /// The unit this error concerns, if any.
    pub fn unit(&self) -> Option<&str> {
        match self {
            Self::UnitOperationError { unit, .. } => Some(unit),
            _ => None,
        }
    }

    /// Shorthand for an install failure.
    pub fn install(unit: &str, message: impl Into<String>) -> Self {
        Self::UnitOperationError {
            unit: unit.to_string(),
            operation: UnitOperation::Install,
            message: message.into(),
        }
    }

    /// Shorthand for a load failure.
    pub fn load(unit: &str, message: impl Into<String>) -> Self {
        Self::UnitOperationError {
            unit: unit.to_string(),
            operation: UnitOperation::Load,
            message: message.into(),
        }
    }
}

/// Result type alias for modstrap operations.
pub type Result<T> = std::result::Result<T, ModstrapError>;
