//! Check command implementation.
//!
//! `modstrap check` validates and decodes a manifest and lists what it
//! declares, without touching the package manager.

use std::path::PathBuf;

use crate::bootstrap::inspect;
use crate::cli::args::CheckArgs;
use crate::error::Result;
use crate::manifest::KNOWN_KEYS;
use crate::ui::UserInterface;

use super::dispatcher::{exit_code_for, Command, CommandResult};

/// The check command implementation.
pub struct CheckCommand {
    args: CheckArgs,
}

impl CheckCommand {
    /// Create a new check command.
    pub fn new(args: CheckArgs) -> Self {
        Self { args }
    }

    fn manifest(&self) -> &PathBuf {
        &self.args.manifest
    }
}

impl Command for CheckCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let manifest = match inspect(self.manifest()) {
            Ok(manifest) => manifest,
            Err(e) => {
                ui.error(&e.to_string());
                return Ok(CommandResult::failure(exit_code_for(&e)));
            }
        };

        ui.show_header(&self.manifest().display().to_string());
        for ((pass, units), key) in manifest.passes().into_iter().zip(KNOWN_KEYS) {
            if units.is_empty() {
                ui.message(&format!("{} ({}): none", key, pass.label()));
            } else {
                ui.message(&format!("{} ({}): {}", key, pass.label(), units.join(", ")));
            }
        }

        ui.success(&format!("Manifest declares {} module(s)", manifest.unit_count()));
        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::MockUI;
    use tempfile::TempDir;

    fn check(path: PathBuf) -> (CommandResult, MockUI) {
        let mut ui = MockUI::new();
        let result = CheckCommand::new(CheckArgs { manifest: path })
            .execute(&mut ui)
            .unwrap();
        (result, ui)
    }

    #[test]
    fn lists_each_key() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("modules.psd1");
        std::fs::write(
            &path,
            "@{ RequiredModules = @('Az.Storage', 'Pester'); MyModules = 'MyCompany.Tools' }",
        )
        .unwrap();

        let (result, ui) = check(path);

        assert!(result.success);
        assert!(ui.has_message("RequiredModules (required): Az.Storage, Pester"));
        assert!(ui.has_message("ImportedModules (imported): none"));
        assert!(ui.has_message("MyModules (custom): MyCompany.Tools"));
        assert!(ui.has_success("3 module(s)"));
    }

    #[test]
    fn missing_manifest_fails_with_two() {
        let temp = TempDir::new().unwrap();
        let (result, ui) = check(temp.path().join("absent.psd1"));

        assert_eq!(result.exit_code, 2);
        assert!(ui.has_error("not found"));
    }

    #[test]
    fn malformed_manifest_fails_with_one() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("modules.json");
        std::fs::write(&path, "{ \"RequiredModules\": [1] }").unwrap();

        let (result, ui) = check(path);

        assert_eq!(result.exit_code, 1);
        assert_eq!(ui.errors().len(), 1);
    }
}
