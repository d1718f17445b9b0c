//! The dependency bootstrapper.
//!
//! Given a manifest path, [`Bootstrapper::bootstrap`] validates the path,
//! decodes the manifest, then runs three passes in order:
//!
//! 1. Install: ensure each `RequiredModules` unit is installed and current
//! 2. Import: force-load each `ImportedModules` unit
//! 3. Custom import: force-load each `MyModules` unit
//!
//! The first failure aborts everything after it. A missing manifest is
//! logged and returned. Any later failure is logged, handed to the
//! [`ErrorSink`], and returned.
//!
//! # Example
//!
//! ```
//! use modstrap::bootstrap::{Bootstrapper, Phase};
//! use modstrap::report::{MemoryLog, TracingSink};
//! use modstrap::units::{InstallOutcome, UnitInstaller, UnitLoader};
//! use std::path::Path;
//!
//! struct Noop;
//! impl UnitInstaller for Noop {
//!     fn ensure_installed(&mut self, _: &str) -> modstrap::Result<InstallOutcome> {
//!         Ok(InstallOutcome::Current { version: "1.0".into() })
//!     }
//! }
//! impl UnitLoader for Noop {
//!     fn load(&mut self, _: &str, _: bool) -> modstrap::Result<()> {
//!         Ok(())
//!     }
//! }
//!
//! let (mut installer, mut loader) = (Noop, Noop);
//! let (mut log, mut sink) = (MemoryLog::new(), TracingSink);
//! let mut bootstrapper = Bootstrapper::new(&mut installer, &mut loader, &mut log, &mut sink);
//!
//! assert!(bootstrapper.bootstrap(Path::new("/no/such/manifest.psd1")).is_err());
//! assert_eq!(bootstrapper.phase(), Phase::Failed);
//! ```

use std::path::Path;

use crate::error::Result;
use crate::manifest::{load_manifest, validate_manifest_path, Manifest, Pass};
use crate::report::{log_params, ErrorSink, EventLog, LogLevel};
use crate::units::{UnitInstaller, UnitLoader};

/// Progress through a single bootstrap call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Start,
    Validated,
    Parsed,
    InstallDone,
    ImportDone,
    CustomImportDone,
    Complete,
    Failed,
}

impl Phase {
    fn after(pass: Pass) -> Self {
        match pass {
            Pass::Install => Phase::InstallDone,
            Pass::Import => Phase::ImportDone,
            Pass::CustomImport => Phase::CustomImportDone,
        }
    }

    /// Whether no further transitions can happen.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Complete | Phase::Failed)
    }
}

/// Ensures the units a manifest names are installed and loaded.
///
/// Collaborators are borrowed so callers can inspect them afterwards.
pub struct Bootstrapper<'a> {
    installer: &'a mut dyn UnitInstaller,
    loader: &'a mut dyn UnitLoader,
    log: &'a mut dyn EventLog,
    sink: &'a mut dyn ErrorSink,
    phase: Phase,
}

impl<'a> Bootstrapper<'a> {
    /// Create a bootstrapper over the given collaborators.
    pub fn new(
        installer: &'a mut dyn UnitInstaller,
        loader: &'a mut dyn UnitLoader,
        log: &'a mut dyn EventLog,
        sink: &'a mut dyn ErrorSink,
    ) -> Self {
        Self {
            installer,
            loader,
            log,
            sink,
            phase: Phase::Start,
        }
    }

    /// Where the most recent call stopped.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Validate, read, install, and load everything the manifest names.
    ///
    /// # Errors
    ///
    /// - `ManifestNotFound` if `manifest_path` is not an existing file; the
    ///   error sink is not notified
    /// - `ManifestParseError` if the manifest can't be decoded
    /// - `UnitOperationError` for the first unit that fails to install or load
    pub fn bootstrap(&mut self, manifest_path: &Path) -> Result<()> {
        self.phase = Phase::Start;
        log_params(
            &mut *self.log,
            "bootstrap",
            &[("manifest_path", manifest_path.display().to_string())],
        );

        if let Err(e) = validate_manifest_path(manifest_path) {
            self.phase = Phase::Failed;
            self.log.log(
                &format!("Manifest file not found at path: {}", manifest_path.display()),
                LogLevel::Error,
            );
            return Err(e);
        }
        self.phase = Phase::Validated;

        match self.run_passes(manifest_path) {
            Ok(()) => {
                self.phase = Phase::Complete;
                self.log
                    .log("All modules installed and imported successfully", LogLevel::Info);
                Ok(())
            }
            Err(e) => {
                self.phase = Phase::Failed;
                self.log.log(
                    &format!("Failed to install or import modules: {}", e),
                    LogLevel::Error,
                );
                self.sink.report(&e);
                Err(e)
            }
        }
    }

    fn run_passes(&mut self, manifest_path: &Path) -> Result<()> {
        let manifest = load_manifest(manifest_path)?;
        self.phase = Phase::Parsed;
        tracing::debug!(
            "Manifest {} names {} unit(s)",
            manifest_path.display(),
            manifest.unit_count()
        );

        self.run_manifest(&manifest)
    }

    fn run_manifest(&mut self, manifest: &Manifest) -> Result<()> {
        for (pass, units) in manifest.passes() {
            if !units.is_empty() {
                self.log.log(
                    &format!("Processing {} modules: {}", pass.label(), units.join(", ")),
                    LogLevel::Info,
                );
                for unit in units {
                    self.run_unit(pass, unit)?;
                }
            }
            self.phase = Phase::after(pass);
        }
        Ok(())
    }

    fn run_unit(&mut self, pass: Pass, unit: &str) -> Result<()> {
        match pass {
            Pass::Install => {
                let outcome = self.installer.ensure_installed(unit)?;
                self.log
                    .log(&format!("Module {}: {}", unit, outcome), LogLevel::Info);
            }
            Pass::Import | Pass::CustomImport => {
                self.loader.load(unit, true)?;
                self.log.log(&format!("Imported {}", unit), LogLevel::Info);
            }
        }
        Ok(())
    }
}

/// Decode a manifest without installing or loading anything.
///
/// Runs the same validation and parsing steps as [`Bootstrapper::bootstrap`].
pub fn inspect(manifest_path: &Path) -> Result<Manifest> {
    validate_manifest_path(manifest_path)?;
    load_manifest(manifest_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ModstrapError, UnitOperation};
    use crate::report::MemoryLog;
    use crate::units::InstallOutcome;
    use std::fs;
    use tempfile::TempDir;

    #[derive(Default)]
    struct Recorder {
        calls: Vec<String>,
        fail_install: Option<String>,
    }

    impl UnitInstaller for Recorder {
        fn ensure_installed(&mut self, unit: &str) -> Result<InstallOutcome> {
            self.calls.push(format!("install {}", unit));
            if self.fail_install.as_deref() == Some(unit) {
                return Err(ModstrapError::install(unit, "gallery unreachable"));
            }
            Ok(InstallOutcome::Current {
                version: "1.0.0".into(),
            })
        }
    }

    #[derive(Default)]
    struct LoadRecorder {
        calls: Vec<(String, bool)>,
    }

    impl UnitLoader for LoadRecorder {
        fn load(&mut self, unit: &str, force: bool) -> Result<()> {
            self.calls.push((unit.to_string(), force));
            Ok(())
        }
    }

    #[derive(Default)]
    struct CollectingSink {
        kinds: Vec<&'static str>,
    }

    impl ErrorSink for CollectingSink {
        fn report(&mut self, error: &ModstrapError) {
            self.kinds.push(error.kind());
        }
    }

    fn write_manifest(content: &str) -> (TempDir, std::path::PathBuf) {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("modules.psd1");
        fs::write(&path, content).unwrap();
        (temp, path)
    }

    #[test]
    fn phases_advance_to_complete() {
        let (_temp, path) = write_manifest("@{ RequiredModules = 'A'; MyModules = 'B' }");
        let mut installer = Recorder::default();
        let mut loader = LoadRecorder::default();
        let mut log = MemoryLog::new();
        let mut sink = CollectingSink::default();

        let mut b = Bootstrapper::new(&mut installer, &mut loader, &mut log, &mut sink);
        assert_eq!(b.phase(), Phase::Start);
        b.bootstrap(&path).unwrap();
        assert_eq!(b.phase(), Phase::Complete);
        assert!(b.phase().is_terminal());
    }

    #[test]
    fn missing_manifest_is_logged_but_not_reported() {
        let mut installer = Recorder::default();
        let mut loader = LoadRecorder::default();
        let mut log = MemoryLog::new();
        let mut sink = CollectingSink::default();

        let result = Bootstrapper::new(&mut installer, &mut loader, &mut log, &mut sink)
            .bootstrap(Path::new("/definitely/not/here.psd1"));

        assert!(matches!(result, Err(ModstrapError::ManifestNotFound { .. })));
        assert!(sink.kinds.is_empty());
        assert_eq!(log.at(LogLevel::Error).len(), 1);
        assert!(log.at(LogLevel::Error)[0].contains("/definitely/not/here.psd1"));
    }

    #[test]
    fn parse_error_is_reported_once() {
        let (_temp, path) = write_manifest("@{ RequiredModules = ");
        let mut installer = Recorder::default();
        let mut loader = LoadRecorder::default();
        let mut log = MemoryLog::new();
        let mut sink = CollectingSink::default();

        let mut b = Bootstrapper::new(&mut installer, &mut loader, &mut log, &mut sink);
        let result = b.bootstrap(&path);

        assert!(matches!(result, Err(ModstrapError::ManifestParseError { .. })));
        assert_eq!(b.phase(), Phase::Failed);
        assert_eq!(sink.kinds, vec!["manifest_parse_error"]);
        assert!(installer.calls.is_empty());
        assert!(loader.calls.is_empty());
    }

    #[test]
    fn install_failure_stops_in_install_pass() {
        let (_temp, path) =
            write_manifest("@{ RequiredModules = 'A', 'B', 'C'; ImportedModules = 'D' }");
        let mut installer = Recorder {
            fail_install: Some("B".into()),
            ..Default::default()
        };
        let mut loader = LoadRecorder::default();
        let mut log = MemoryLog::new();
        let mut sink = CollectingSink::default();

        let result = Bootstrapper::new(&mut installer, &mut loader, &mut log, &mut sink)
            .bootstrap(&path);

        match result {
            Err(ModstrapError::UnitOperationError {
                unit, operation, ..
            }) => {
                assert_eq!(unit, "B");
                assert_eq!(operation, UnitOperation::Install);
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(installer.calls, vec!["install A", "install B"]);
        assert!(loader.calls.is_empty());
        assert_eq!(sink.kinds, vec!["unit_operation_error"]);
    }

    #[test]
    fn logs_each_non_empty_pass() {
        let (_temp, path) =
            write_manifest("@{ RequiredModules = 'A', 'B'; MyModules = @('Tools') }");
        let mut installer = Recorder::default();
        let mut loader = LoadRecorder::default();
        let mut log = MemoryLog::new();
        let mut sink = CollectingSink::default();

        Bootstrapper::new(&mut installer, &mut loader, &mut log, &mut sink)
            .bootstrap(&path)
            .unwrap();

        let info = log.at(LogLevel::Info);
        assert!(info.contains(&"Processing required modules: A, B"));
        assert!(info.contains(&"Processing custom modules: Tools"));
        assert!(!info.iter().any(|m| m.contains("imported modules")));
        assert_eq!(
            info.last().copied(),
            Some("All modules installed and imported successfully")
        );
    }

    #[test]
    fn inspect_decodes_without_side_effects() {
        let (_temp, path) = write_manifest("@{ ImportedModules = 'Pester' }");
        let manifest = inspect(&path).unwrap();
        assert_eq!(manifest.imported_modules, vec!["Pester"]);
    }

    #[test]
    fn inspect_missing_manifest() {
        let result = inspect(Path::new("/nope/modules.psd1"));
        assert!(matches!(result, Err(ModstrapError::ManifestNotFound { .. })));
    }
}
