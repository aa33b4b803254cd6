//! Discovery and ordered execution of setup units.

use super::runner::{UnitEnvironment, UnitRunner, UnitStatus};
use super::trace::TraceSwitch;
use crate::console::Console;
use crate::constants::setup;
use rescue_shared::errors::{RescueError, RescueResult};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

/// An executable setup unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupUnit {
    path: PathBuf,
    name: String,
}

impl SetupUnit {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self { path, name }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name, used for ordering and messages.
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Find setup units directly inside `dir`, sorted by file name.
///
/// A unit is a regular, executable file ending in `.sh`. A missing
/// directory yields no units.
pub fn discover_units(dir: &Path) -> RescueResult<Vec<SetupUnit>> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(dir = %dir.display(), "Setup directory does not exist");
            return Ok(Vec::new());
        }
        Err(e) => {
            return Err(RescueError::Storage(format!(
                "Failed to read setup directory {}: {}",
                dir.display(),
                e
            )));
        }
    };

    let mut units = Vec::new();
    for entry in entries {
        let path = match entry {
            Ok(entry) => entry.path(),
            Err(e) => {
                tracing::warn!(dir = %dir.display(), error = %e, "Skipping unreadable directory entry");
                continue;
            }
        };

        let is_unit_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(setup::UNIT_SUFFIX));
        if !is_unit_name {
            continue;
        }

        // Follows symlinks, like the shell glob would
        let metadata = match std::fs::metadata(&path) {
            Ok(metadata) => metadata,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable setup unit");
                continue;
            }
        };
        if !metadata.is_file() {
            continue;
        }
        if metadata.permissions().mode() & 0o111 == 0 {
            tracing::debug!(path = %path.display(), "Skipping non-executable setup unit");
            continue;
        }

        units.push(SetupUnit::new(path));
    }

    units.sort_by(|a, b| a.path.file_name().cmp(&b.path.file_name()));
    Ok(units)
}

/// Which units ran and which failed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetupReport {
    pub ran: Vec<String>,
    pub failed: Vec<String>,
}

impl SetupReport {
    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Runs setup units in order, best effort.
pub struct SetupSequencer<'a> {
    runner: &'a dyn UnitRunner,
    console: &'a dyn Console,
    trace: TraceSwitch,
}

impl<'a> SetupSequencer<'a> {
    pub fn new(runner: &'a dyn UnitRunner, console: &'a dyn Console, trace: TraceSwitch) -> Self {
        Self {
            runner,
            console,
            trace,
        }
    }

    /// Run every unit exactly once.
    ///
    /// In debug mode each unit waits for a keypress first and then runs with
    /// tracing, which is switched off again before the next prompt whatever
    /// the unit's outcome. A failing unit is reported and skipped over.
    pub async fn run(
        &self,
        units: &[SetupUnit],
        debug: bool,
        env: &mut UnitEnvironment,
    ) -> RescueResult<SetupReport> {
        let mut report = SetupReport::default();

        for unit in units {
            let result = if debug {
                self.console
                    .wait_for_key(&format!("Press any key to run '{}' ", unit.name()))
                    .await?;
                let _trace = self.trace.enable();
                self.runner.run(unit, env, self.trace.is_enabled()).await
            } else {
                self.console
                    .write_line(&format!("Running {}...", unit.name()))?;
                self.runner.run(unit, env, false).await
            };

            report.ran.push(unit.name().to_string());

            match result {
                Ok(UnitStatus::Succeeded) => {
                    tracing::debug!(unit = %unit.name(), "Setup unit finished");
                }
                Ok(UnitStatus::Failed(code)) => {
                    tracing::warn!(unit = %unit.name(), exit_code = ?code, "Setup unit failed");
                    report.failed.push(unit.name().to_string());
                }
                Err(e) => {
                    tracing::warn!(unit = %unit.name(), error = %e, "Setup unit could not be run");
                    report.failed.push(unit.name().to_string());
                }
            }
        }

        if !report.all_succeeded() {
            self.console.write_line(&format!(
                "Setup finished with failures: {}",
                report.failed.join(", ")
            ))?;
        }
        tracing::info!(
            ran = report.ran.len(),
            failed = report.failed.len(),
            "Setup sequence finished"
        );

        Ok(report)
    }
}
