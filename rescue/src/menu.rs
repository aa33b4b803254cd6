//! Post-recovery outcome menu.
//!
//! ## State machine
//!
//! ```text
//!            ┌──────────── non-terminal (view logs) ───────────┐
//!            ▼                                                  │
//!       Displayed ──valid choice──→ ActionPerformed ────────────┘
//!        │     ▲                          │
//!        │     └──── unknown input        └── terminal (shell, reboot) ──→ exit
//!        └── end of input ──→ Closed ──→ exit
//! ```
//!
//! "Reboot" is only offered after a successful recovery in plain automatic
//! mode. Unattended boots never see it: on success they reboot on their own
//! after [`countdown_and_reboot`], on failure the operator has to look first.

use crate::console::Console;
use crate::layout::RescueLayout;
use crate::params::ModeDecision;
use crate::recovery::RecoveryOutcome;
use crate::system::SystemControl;
use rescue_shared::errors::RescueResult;
use std::time::Duration;
use walkdir::WalkDir;

const PROMPT: &str = "Select what to do ";

/// A menu entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    ViewLogs,
    Shell,
    Reboot,
}

impl MenuChoice {
    pub fn label(&self) -> &'static str {
        match self {
            MenuChoice::ViewLogs => "View log files",
            MenuChoice::Shell => "Go to shell",
            MenuChoice::Reboot => "Reboot",
        }
    }
}

/// Menu state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuState {
    /// Choices shown, waiting for input.
    Displayed,
    /// A choice ran; terminal choices end the loop.
    ActionPerformed { choice: MenuChoice, terminal: bool },
    /// Input ended; nothing more can be chosen.
    Closed,
}

/// How the menu loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuExit {
    Shell,
    Reboot,
    InputClosed,
}

/// The bounded list of actions offered after recovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutcomeMenu {
    choices: Vec<MenuChoice>,
}

impl OutcomeMenu {
    pub fn new(mode: &ModeDecision, outcome: RecoveryOutcome) -> Self {
        let mut choices = vec![MenuChoice::ViewLogs, MenuChoice::Shell];
        if outcome.is_success() && mode.automatic && !mode.unattended {
            choices.push(MenuChoice::Reboot);
        }
        Self { choices }
    }

    pub fn choices(&self) -> &[MenuChoice] {
        &self.choices
    }

    /// Numbered lines, `1) View log files`.
    pub fn render(&self) -> Vec<String> {
        self.choices
            .iter()
            .enumerate()
            .map(|(i, choice)| format!("{}) {}", i + 1, choice.label()))
            .collect()
    }

    /// Map a reply (1-based number) to a choice.
    pub fn select(&self, reply: &str) -> Option<MenuChoice> {
        let index = reply.trim().parse::<usize>().ok()?;
        index
            .checked_sub(1)
            .and_then(|i| self.choices.get(i))
            .copied()
    }

    /// Loop until a terminal choice is made or input ends.
    pub async fn run(&self, actions: &MenuActions<'_>) -> RescueResult<MenuExit> {
        let mut state = MenuState::Displayed;

        loop {
            state = match state {
                MenuState::Displayed => {
                    for line in self.render() {
                        actions.console.write_line(&line)?;
                    }
                    match actions.console.read_line(PROMPT).await? {
                        None => MenuState::Closed,
                        Some(reply) => match self.select(&reply) {
                            Some(choice) => actions.perform(choice).await?,
                            None => {
                                tracing::debug!(reply = %reply, "Ignoring unknown menu input");
                                MenuState::Displayed
                            }
                        },
                    }
                }
                MenuState::ActionPerformed {
                    terminal: false, ..
                } => MenuState::Displayed,
                MenuState::ActionPerformed {
                    choice,
                    terminal: true,
                } => {
                    return Ok(match choice {
                        MenuChoice::Reboot => MenuExit::Reboot,
                        _ => MenuExit::Shell,
                    });
                }
                MenuState::Closed => {
                    tracing::info!("Console input closed, leaving menu");
                    return Ok(MenuExit::InputClosed);
                }
            };
        }
    }
}

/// Side effects of menu choices.
pub struct MenuActions<'a> {
    console: &'a dyn Console,
    system: &'a dyn SystemControl,
    layout: &'a RescueLayout,
}

impl<'a> MenuActions<'a> {
    pub fn new(
        console: &'a dyn Console,
        system: &'a dyn SystemControl,
        layout: &'a RescueLayout,
    ) -> Self {
        Self {
            console,
            system,
            layout,
        }
    }

    pub async fn perform(&self, choice: MenuChoice) -> RescueResult<MenuState> {
        tracing::info!(choice = choice.label(), "Menu choice");

        let terminal = match choice {
            MenuChoice::ViewLogs => {
                self.view_logs()?;
                false
            }
            MenuChoice::Shell => {
                self.clear_banners();
                true
            }
            MenuChoice::Reboot => {
                self.system.reboot().await?;
                true
            }
        };

        Ok(MenuState::ActionPerformed { choice, terminal })
    }

    /// Print every file under the log directory.
    pub fn view_logs(&self) -> RescueResult<()> {
        let log_dir = self.layout.log_dir();
        let mut shown = 0usize;

        for entry in WalkDir::new(&log_dir).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::debug!(error = %e, "Skipping unreadable log entry");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            let content = match std::fs::read(entry.path()) {
                Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
                Err(e) => {
                    tracing::warn!(path = %entry.path().display(), error = %e, "Cannot read log file");
                    continue;
                }
            };

            self.console
                .write_line(&format!("==> {} <==", entry.path().display()))?;
            for line in content.lines() {
                self.console.write_line(line)?;
            }
            shown += 1;
        }

        if shown == 0 {
            self.console
                .write_line(&format!("No log files in {}", log_dir.display()))?;
        }
        Ok(())
    }

    /// Empty the greeting files so the shell prompt is not buried under them.
    pub fn clear_banners(&self) {
        for path in self.layout.banner_paths() {
            if !path.parent().is_some_and(|p| p.is_dir()) {
                continue;
            }
            if let Err(e) = std::fs::write(&path, "") {
                tracing::warn!(path = %path.display(), error = %e, "Failed to clear banner file");
            }
        }
    }
}

/// Visible countdown, then an unconditional reboot.
///
/// Only an interrupt signal (which kills the whole orchestrator) stops it.
pub async fn countdown_and_reboot(
    console: &dyn Console,
    system: &dyn SystemControl,
    delay: Duration,
) -> RescueResult<()> {
    let mut remaining = delay.as_secs();
    console.write_line(&format!(
        "Rebooting in {} seconds (Ctrl-C to interrupt)",
        remaining
    ))?;

    while remaining > 0 {
        console.write(&format!("\r{:>3} ", remaining))?;
        tokio::time::sleep(Duration::from_secs(1)).await;
        remaining -= 1;
    }
    console.write_line("")?;

    system.reboot().await
}
