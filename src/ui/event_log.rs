//! [`EventLog`] adapter that renders bootstrapper log lines on a UI.

use crate::report::{EventLog, LogLevel};

use super::UserInterface;

/// Routes log lines to a [`UserInterface`] by severity.
///
/// Debug lines also go to `tracing` so `--debug` captures them even when the
/// UI hides detail.
pub struct UiLog<'a> {
    ui: &'a mut dyn UserInterface,
}

impl<'a> UiLog<'a> {
    pub fn new(ui: &'a mut dyn UserInterface) -> Self {
        Self { ui }
    }
}

impl EventLog for UiLog<'_> {
    fn log(&mut self, message: &str, level: LogLevel) {
        match level {
            LogLevel::Debug => {
                tracing::debug!("{}", message);
                self.ui.detail(message);
            }
            LogLevel::Info => self.ui.message(message),
            LogLevel::Warning => self.ui.warning(message),
            LogLevel::Error => self.ui.error(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::MockUI;

    #[test]
    fn routes_by_level() {
        let mut ui = MockUI::new();
        {
            let mut log = UiLog::new(&mut ui);
            log.log("params", LogLevel::Debug);
            log.log("Processing required modules: Pester", LogLevel::Info);
            log.log("slow mirror", LogLevel::Warning);
            log.log("Failed to install or import modules", LogLevel::Error);
        }

        assert_eq!(ui.details(), ["params"]);
        assert!(ui.has_message("Pester"));
        assert!(ui.has_warning("slow mirror"));
        assert!(ui.has_error("Failed to install"));
    }
}
