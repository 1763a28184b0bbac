use catalog_sync_core::SyncState;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::IsTerminal;
use std::time::Duration;

/// Spinner that follows the orchestrator's state while a cycle runs
pub struct SyncUI {
    spinner: ProgressBar,
    interactive: bool,
    last_state: Option<SyncState>,
}

impl SyncUI {
    pub fn new(show: bool) -> Self {
        let interactive = show && is_interactive();

        let spinner = if interactive {
            let spinner = ProgressBar::new_spinner();
            if let Ok(style) = ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
            {
                spinner.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
            }
            spinner.enable_steady_tick(Duration::from_millis(100));
            spinner
        } else {
            tracing::debug!(
                operation = "ui_init",
                mode = "non_interactive",
                "Running in non-interactive mode - spinner disabled, using structured logging"
            );
            ProgressBar::hidden()
        };

        Self {
            spinner,
            interactive,
            last_state: None,
        }
    }

    pub fn show_state(&mut self, state: SyncState) {
        if self.last_state == Some(state) {
            return;
        }
        self.last_state = Some(state);

        let message = match state {
            SyncState::Idle => "Waiting for result...",
            SyncState::Fetching => "Fetching feed...",
            SyncState::Parsing => "Parsing movies...",
            SyncState::Merging => "Merging into catalog...",
            SyncState::Publishing => "Publishing result...",
            SyncState::Failed => "Sync failed",
        };
        if self.interactive {
            self.spinner.set_message(message);
        } else {
            tracing::debug!(operation = "progress", state = %state, "Sync progress update");
        }
    }

    pub fn finish(&self) {
        if self.interactive {
            self.spinner.finish_and_clear();
        }
    }
}

pub fn is_interactive() -> bool {
    std::io::stdout().is_terminal() && std::io::stderr().is_terminal()
}
