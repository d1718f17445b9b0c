//! Command dispatching.
//!
//! This module provides the core command infrastructure:
//! - [`Command`] trait for implementing commands
//! - [`CommandResult`] for uniform result reporting
//! - [`CommandDispatcher`] for routing CLI subcommands

use std::path::{Path, PathBuf};

use crate::cli::args::{Cli, Commands};
use crate::config::ModstrapConfig;
use crate::error::{ModstrapError, Result};
use crate::ui::UserInterface;

/// Trait for command implementations.
///
/// Each CLI subcommand implements this trait to provide its execution logic.
pub trait Command {
    /// Execute the command.
    ///
    /// # Arguments
    ///
    /// * `ui` - User interface for displaying output
    ///
    /// # Returns
    ///
    /// A [`CommandResult`] indicating success/failure and exit code.
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    /// Whether the command succeeded.
    pub success: bool,

    /// Exit code to use (0 for success, non-zero for failure).
    pub exit_code: i32,
}

impl CommandResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }

    /// Create a failure result.
    pub fn failure(exit_code: i32) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }
}

/// Exit code for a failed bootstrap: 2 when the manifest is missing, else 1.
pub fn exit_code_for(error: &ModstrapError) -> i32 {
    match error {
        ModstrapError::ManifestNotFound { .. } => 2,
        _ => 1,
    }
}

/// Dispatches CLI commands to their implementations.
///
/// Settings are loaded once by the caller. A settings error only fails the
/// commands that need settings.
pub struct CommandDispatcher {
    project_root: PathBuf,
    config: Result<ModstrapConfig>,
}

impl CommandDispatcher {
    /// Create a new dispatcher for the given project root, using default settings.
    pub fn new(project_root: PathBuf) -> Self {
        Self {
            project_root,
            config: Ok(ModstrapConfig::default()),
        }
    }

    /// Use the outcome of loading the settings file.
    pub fn with_config(mut self, config: Result<ModstrapConfig>) -> Self {
        self.config = config;
        self
    }

    /// Get the project root path.
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Dispatch and execute a command.
    pub fn dispatch(&self, cli: &Cli, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        match &cli.command {
            Commands::Run(args) => {
                let config = match &self.config {
                    Ok(config) => config.clone(),
                    Err(e) => {
                        ui.error(&format!("Error: {}", e));
                        return Ok(CommandResult::failure(1));
                    }
                };
                let cmd = super::run::RunCommand::new(&self.project_root, config, args.clone());
                cmd.execute(ui)
            }
            Commands::Check(args) => {
                let cmd = super::check::CheckCommand::new(args.clone());
                cmd.execute(ui)
            }
            Commands::Completions(args) => {
                let cmd = super::completions::CompletionsCommand::new(args.clone());
                cmd.execute(ui)
            }
        }
    }
}
