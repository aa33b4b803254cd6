//! Recovery tool launcher.
//!
//! The recovery tool restores the target machine's disks, so it is the one
//! operation here that mutates persistent storage. It runs at most once per
//! boot: only automatic or unattended boots may launch it, the two modes are
//! exclusive, and [`RecoveryLauncher::launch`] consumes the launcher.

use crate::constants::recovery;
use crate::params::ModeDecision;
use crate::setup::UnitEnvironment;
use async_trait::async_trait;
use rescue_shared::errors::{RescueError, RescueResult};
use std::path::PathBuf;

/// Process-level result of the recovery tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryOutcome {
    Success,
    Failure,
}

impl RecoveryOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RecoveryOutcome::Success)
    }
}

/// Options derived from the boot mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecoveryOptions {
    pub verbose: bool,
    pub debug_trace: bool,
}

impl RecoveryOptions {
    pub fn for_mode(mode: &ModeDecision) -> Self {
        Self {
            verbose: true,
            debug_trace: mode.debug,
        }
    }

    /// Command line: flags first, then the subcommand.
    pub fn to_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if self.verbose {
            args.push(recovery::VERBOSE_FLAG.to_string());
        }
        if self.debug_trace {
            args.extend(recovery::DEBUG_TRACE_FLAGS.iter().map(|f| f.to_string()));
        }
        args.push(recovery::SUBCOMMAND.to_string());
        args
    }
}

/// The external recovery workflow.
#[async_trait]
pub trait RecoveryTool: Send + Sync {
    /// Run the tool to completion. `Ok(true)` on exit status zero.
    ///
    /// `Err` means the tool could not be run at all.
    async fn run(&self, args: &[String], env: &UnitEnvironment) -> RescueResult<bool>;

    /// Name for messages.
    fn name(&self) -> &str;
}

/// Recovery tool run as a child process, inheriting the console.
#[derive(Debug, Clone)]
pub struct CommandRecoveryTool {
    program: String,
}

impl CommandRecoveryTool {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Resolve the program on the unit environment's `PATH`.
    ///
    /// Names containing a `/` are taken as paths; all candidates must be
    /// executable.
    pub fn locate(&self, env: &UnitEnvironment) -> RescueResult<PathBuf> {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("/"));
        which::which_in(&self.program, env.get("PATH"), cwd).map_err(|e| {
            RescueError::Engine(format!("Recovery tool '{}' not found: {}", self.program, e))
        })
    }
}

#[async_trait]
impl RecoveryTool for CommandRecoveryTool {
    async fn run(&self, args: &[String], env: &UnitEnvironment) -> RescueResult<bool> {
        let binary = self.locate(env)?;

        tracing::info!(binary = %binary.display(), args = ?args, "Starting recovery tool");

        let status = tokio::process::Command::new(&binary)
            .args(args)
            .env_clear()
            .envs(env.iter())
            .status()
            .await
            .map_err(|e| {
                RescueError::Engine(format!(
                    "Failed to run recovery tool {}: {}",
                    binary.display(),
                    e
                ))
            })?;

        tracing::info!(status = %status, "Recovery tool exited");
        Ok(status.success())
    }

    fn name(&self) -> &str {
        &self.program
    }
}

/// Launches the recovery tool once and classifies the outcome.
pub struct RecoveryLauncher<'a> {
    tool: &'a dyn RecoveryTool,
}

impl<'a> RecoveryLauncher<'a> {
    pub fn new(tool: &'a dyn RecoveryTool) -> Self {
        Self { tool }
    }

    /// Single blocking attempt, no retries.
    ///
    /// Refuses to run unless the mode is automatic or unattended.
    pub async fn launch(
        self,
        mode: &ModeDecision,
        env: &UnitEnvironment,
    ) -> RescueResult<RecoveryOutcome> {
        if !mode.launches_recovery() {
            return Err(RescueError::InvalidState(format!(
                "recovery is not launched in {} mode",
                mode.boot_mode()
            )));
        }

        let args = RecoveryOptions::for_mode(mode).to_args();
        tracing::info!(tool = %self.tool.name(), mode = %mode.boot_mode(), "Launching recovery");

        let outcome = if self.tool.run(&args, env).await? {
            RecoveryOutcome::Success
        } else {
            RecoveryOutcome::Failure
        };

        tracing::info!(outcome = ?outcome, "Recovery finished");
        Ok(outcome)
    }
}
