//! Running a single setup unit.

use super::sequencer::SetupUnit;
use crate::constants::setup;
use async_trait::async_trait;
use rescue_shared::errors::{RescueError, RescueResult};
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::PathBuf;

/// Sources the unit, then dumps the resulting environment so the next unit
/// starts where this one left off. `$0` is the unit, `$1` the dump file.
const SOURCE_AND_EXPORT: &str = r#". "$0"; rc=$?; env -0 > "$1"; exit $rc"#;

/// Variables the shell maintains itself and that must not leak between units.
const SHELL_MANAGED: &[&str] = &["_", "SHLVL", "OLDPWD"];

/// Environment shared by all setup units and handed to the recovery tool.
///
/// Replaces the ambient shell environment: units see every variable earlier
/// units exported, plus the loaded configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnitEnvironment {
    vars: BTreeMap<String, String>,
}

impl UnitEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed from the orchestrator's own environment.
    pub fn from_process() -> Self {
        Self::from_os_vars(std::env::vars_os())
    }

    /// Non-UTF-8 names and values are converted lossily.
    pub fn from_os_vars<I>(vars: I) -> Self
    where
        I: IntoIterator<Item = (OsString, OsString)>,
    {
        Self {
            vars: vars
                .into_iter()
                .map(|(key, value)| {
                    (
                        key.to_string_lossy().into_owned(),
                        value.to_string_lossy().into_owned(),
                    )
                })
                .collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(key.into(), value.into());
    }

    /// Overlay variables, replacing existing values.
    pub fn extend<I, K, V>(&mut self, vars: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (key, value) in vars {
            self.set(key, value);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.vars.iter()
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Parse the NUL-separated output of `env -0`.
    pub fn from_env_dump(bytes: &[u8]) -> Self {
        let mut env = Self::new();
        for record in bytes.split(|b| *b == 0) {
            if record.is_empty() {
                continue;
            }
            let record = String::from_utf8_lossy(record);
            if let Some((key, value)) = record.split_once('=')
                && !key.is_empty()
                && !SHELL_MANAGED.contains(&key)
            {
                env.set(key, value);
            }
        }
        env
    }
}

/// Exit status of a setup unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitStatus {
    Succeeded,
    /// Non-zero exit; `None` when killed by a signal.
    Failed(Option<i32>),
}

impl UnitStatus {
    pub fn success(&self) -> bool {
        matches!(self, UnitStatus::Succeeded)
    }
}

/// Executes one setup unit within the shared environment.
#[async_trait]
pub trait UnitRunner: Send + Sync {
    /// Run `unit`, updating `env` with whatever the unit exported.
    ///
    /// `trace` asks for command tracing for this unit only.
    /// Returns `Err` only when the unit could not be started at all.
    async fn run(
        &self,
        unit: &SetupUnit,
        env: &mut UnitEnvironment,
        trace: bool,
    ) -> RescueResult<UnitStatus>;
}

/// Sources units with bash, carrying the environment from unit to unit.
#[derive(Debug, Clone)]
pub struct ShellUnitRunner {
    shell: PathBuf,
}

impl Default for ShellUnitRunner {
    fn default() -> Self {
        Self::new(setup::UNIT_SHELL)
    }
}

impl ShellUnitRunner {
    pub fn new(shell: impl Into<PathBuf>) -> Self {
        Self {
            shell: shell.into(),
        }
    }
}

#[async_trait]
impl UnitRunner for ShellUnitRunner {
    async fn run(
        &self,
        unit: &SetupUnit,
        env: &mut UnitEnvironment,
        trace: bool,
    ) -> RescueResult<UnitStatus> {
        let env_dump = tempfile::NamedTempFile::new().map_err(|e| {
            RescueError::Storage(format!("Failed to create environment dump file: {}", e))
        })?;

        let mut cmd = tokio::process::Command::new(&self.shell);
        if trace {
            cmd.arg("-x");
        }
        cmd.arg("-c")
            .arg(SOURCE_AND_EXPORT)
            .arg(unit.path())
            .arg(env_dump.path())
            .env_clear()
            .envs(env.iter());

        let status = cmd.status().await.map_err(|e| {
            RescueError::Engine(format!(
                "Failed to run setup unit {} with {}: {}",
                unit.name(),
                self.shell.display(),
                e
            ))
        })?;

        // A unit that calls `exit` never reaches the dump; keep the old env then
        match std::fs::read(env_dump.path()) {
            Ok(bytes) if !bytes.is_empty() => *env = UnitEnvironment::from_env_dump(&bytes),
            Ok(_) => {
                tracing::debug!(unit = %unit.name(), "Unit exited before exporting its environment")
            }
            Err(e) => {
                tracing::warn!(unit = %unit.name(), error = %e, "Failed to read unit environment")
            }
        }

        Ok(if status.success() {
            UnitStatus::Succeeded
        } else {
            UnitStatus::Failed(status.code())
        })
    }
}
