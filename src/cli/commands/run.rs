//! Run command implementation.
//!
//! `modstrap run` builds the production collaborators from settings and
//! hands the manifest to the [`Bootstrapper`].

use std::path::{Path, PathBuf};

use crate::bootstrap::Bootstrapper;
use crate::cli::args::RunArgs;
use crate::config::ModstrapConfig;
use crate::error::Result;
use crate::report::{ErrorSink, FileSink, TracingSink};
use crate::ui::{UiLog, UserInterface};
use crate::units::{CommandInstaller, CommandLoader};

use super::dispatcher::{exit_code_for, Command, CommandResult};

/// The run command implementation.
pub struct RunCommand {
    project_root: PathBuf,
    config: ModstrapConfig,
    args: RunArgs,
}

impl RunCommand {
    /// Create a new run command over already loaded settings.
    pub fn new(project_root: &Path, config: ModstrapConfig, args: RunArgs) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            config,
            args,
        }
    }

    /// Get the run arguments.
    pub fn args(&self) -> &RunArgs {
        &self.args
    }

    fn report_sink(&self) -> Option<FileSink> {
        let reports = &self.config.settings.reports;
        if self.args.no_report || !reports.enabled {
            return None;
        }
        let dir = &reports.dir;
        let dir = if dir.is_absolute() {
            dir.clone()
        } else {
            self.project_root.join(dir)
        };
        Some(FileSink::new(dir).with_manifest(&self.args.manifest))
    }
}

impl Command for RunCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        ui.show_header(&self.args.manifest.display().to_string());

        let package_manager = &self.config.package_manager;
        let mut installer = CommandInstaller::new(package_manager.clone());
        let mut loader = CommandLoader::new(package_manager.load.clone());
        let mut file_sink = self.report_sink();
        let mut tracing_sink = TracingSink;

        let result = {
            let mut log = UiLog::new(&mut *ui);
            let sink: &mut dyn ErrorSink = match file_sink.as_mut() {
                Some(sink) => sink,
                None => &mut tracing_sink,
            };
            Bootstrapper::new(&mut installer, &mut loader, &mut log, sink)
                .bootstrap(&self.args.manifest)
        };

        match result {
            Ok(()) => {
                ui.success(&format!(
                    "{} module(s) imported successfully",
                    loader.loaded().len()
                ));
                Ok(CommandResult::success())
            }
            Err(e) => {
                if let Some(path) = file_sink.as_ref().and_then(|s| s.written().last()) {
                    ui.message(&format!("Failure report: {}", path.display()));
                }
                Ok(CommandResult::failure(exit_code_for(&e)))
            }
        }
    }
}
