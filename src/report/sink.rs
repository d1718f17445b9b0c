//! Failure reporting: structured log events and local report files.
//!
//! Reports are stored as YAML files under the configured reports directory
//! (`.modstrap/reports/` by default), with user home paths scrubbed.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{ModstrapError, Result};
use crate::shell::{home_dir, platform};

/// Regex for user home prefixes on common platforms.
static HOME_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:/home/|/Users/|[A-Za-z]:\\Users\\)[^/\\\s:'\x22]+")
        .expect("HOME_REGEX must compile")
});

/// Receives failures for centralized reporting. Never fails outward.
pub trait ErrorSink {
    /// Report a failure.
    fn report(&mut self, error: &ModstrapError);
}

/// [`ErrorSink`] that emits one structured `tracing` event per failure.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl ErrorSink for TracingSink {
    fn report(&mut self, error: &ModstrapError) {
        tracing::error!(
            kind = error.kind(),
            unit = error.unit().unwrap_or("-"),
            "{}",
            error
        );
    }
}

/// A scrubbed failure report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureReport {
    /// Error category (e.g., "unit_operation_error").
    pub kind: String,
    /// Scrubbed error message.
    pub message: String,
    /// Unit that failed, when the failure concerns one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    /// Scrubbed manifest path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifest: Option<String>,
    /// When the failure was reported.
    pub occurred_at: DateTime<Utc>,
    /// modstrap version.
    pub modstrap_version: String,
    /// Platform string (e.g., "linux-x86_64").
    pub platform: String,
}

impl FailureReport {
    /// Build a report from an error.
    pub fn from_error(error: &ModstrapError, manifest: Option<&Path>) -> Self {
        Self {
            kind: error.kind().to_string(),
            message: scrub(&error.to_string()),
            unit: error.unit().map(String::from),
            manifest: manifest.map(|p| scrub(&p.display().to_string())),
            occurred_at: Utc::now(),
            modstrap_version: env!("CARGO_PKG_VERSION").to_string(),
            platform: platform(),
        }
    }
}

/// Replace user home directories with `~`.
pub fn scrub(input: &str) -> String {
    let mut out = input.to_string();
    if let Some(home) = home_dir() {
        if home.len() > 1 {
            out = out.replace(&home, "~");
        }
    }
    HOME_REGEX.replace_all(&out, "~").into_owned()
}

/// Write a report into `dir`, returning the file path.
pub fn save_report_to(report: &FailureReport, dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;

    let timestamp = report.occurred_at.format("%Y%m%d-%H%M%S%.3f");
    let path = dir.join(format!("{}-{}.yml", timestamp, report.kind));

    let content = serde_yaml::to_string(report).map_err(|e| ModstrapError::ConfigValidationError {
        message: format!("Failed to serialize failure report: {}", e),
    })?;

    std::fs::write(&path, content)?;
    Ok(path)
}

/// [`ErrorSink`] that persists a [`FailureReport`] per failure.
#[derive(Debug, Clone)]
pub struct FileSink {
    dir: PathBuf,
    manifest: Option<PathBuf>,
    written: Vec<PathBuf>,
}

impl FileSink {
    /// Sink writing into `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            manifest: None,
            written: Vec::new(),
        }
    }

    /// Attach the manifest path to every report.
    pub fn with_manifest(mut self, manifest: &Path) -> Self {
        self.manifest = Some(manifest.to_path_buf());
        self
    }

    /// Report files written so far.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl ErrorSink for FileSink {
    fn report(&mut self, error: &ModstrapError) {
        let report = FailureReport::from_error(error, self.manifest.as_deref());
        match save_report_to(&report, &self.dir) {
            Ok(path) => {
                tracing::debug!("Failure report written to {}", path.display());
                self.written.push(path);
            }
            Err(e) => tracing::warn!("Could not write failure report: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn scrub_removes_home_paths() {
        let scrubbed = scrub("Manifest not found: /home/alex/setup/modules.psd1");
        assert!(!scrubbed.contains("alex"));
        assert!(scrubbed.contains("~/setup/modules.psd1"));
    }

    #[test]
    fn scrub_removes_windows_profiles() {
        let scrubbed = scrub(r"C:\Users\sam\Documents\modules.psd1");
        assert_eq!(scrubbed, r"~\Documents\modules.psd1");
    }

    #[test]
    fn scrub_preserves_safe_text() {
        assert_eq!(
            scrub("Failed to install 'Az.Storage': exit 1"),
            "Failed to install 'Az.Storage': exit 1"
        );
    }

    #[test]
    fn report_captures_unit_and_kind() {
        let err = ModstrapError::install("Az.Storage", "exit 1");
        let report = FailureReport::from_error(&err, Some(Path::new("/srv/modules.psd1")));

        assert_eq!(report.kind, "unit_operation_error");
        assert_eq!(report.unit.as_deref(), Some("Az.Storage"));
        assert_eq!(report.manifest.as_deref(), Some("/srv/modules.psd1"));
        assert_eq!(report.modstrap_version, env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn file_sink_writes_yaml_report() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("reports");
        let mut sink = FileSink::new(&dir).with_manifest(Path::new("modules.psd1"));

        sink.report(&ModstrapError::load("MyCompany.Tools", "module not found"));

        assert_eq!(sink.written().len(), 1);
        let content = std::fs::read_to_string(&sink.written()[0]).unwrap();
        let report: FailureReport = serde_yaml::from_str(&content).unwrap();
        assert_eq!(report.kind, "unit_operation_error");
        assert_eq!(report.unit.as_deref(), Some("MyCompany.Tools"));
        assert_eq!(report.manifest.as_deref(), Some("modules.psd1"));
        assert!(report.message.contains("module not found"));
    }

    #[test]
    fn file_sink_swallows_write_failures() {
        let temp = TempDir::new().unwrap();
        let blocker = temp.path().join("not-a-dir");
        std::fs::write(&blocker, "").unwrap();

        let mut sink = FileSink::new(&blocker);
        sink.report(&ModstrapError::install("A", "boom"));

        assert!(sink.written().is_empty());
    }

    #[test]
    fn tracing_sink_does_not_panic() {
        TracingSink.report(&ModstrapError::install("A", "boom"));
    }
}
