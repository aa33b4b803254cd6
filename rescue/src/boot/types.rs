//! Type definitions for the boot pipeline.

use crate::config::RescueConfig;
use crate::console::{Console, TerminalConsole};
use crate::constants::timing;
use crate::integrity::VerificationVerdict;
use crate::layout::RescueLayout;
use crate::menu::MenuExit;
use crate::params::ModeDecision;
use crate::pipeline::PipelineMetrics;
use crate::recovery::{CommandRecoveryTool, RecoveryOutcome, RecoveryTool};
use crate::setup::{SetupReport, ShellUnitRunner, TraceSwitch, UnitEnvironment, UnitRunner};
use crate::system::{HostSystem, SystemControl};
use std::sync::Arc;
use std::time::Duration;

/// Collaborators the pipeline talks to.
#[derive(Clone)]
pub struct BootServices {
    pub console: Arc<dyn Console>,
    pub unit_runner: Arc<dyn UnitRunner>,
    pub recovery_tool: Arc<dyn RecoveryTool>,
    pub system: Arc<dyn SystemControl>,
}

impl BootServices {
    /// Real terminal, bash, the configured recovery tool and `reboot`.
    pub fn host(config: &RescueConfig) -> Self {
        Self {
            console: Arc::new(TerminalConsole::new()),
            unit_runner: Arc::new(ShellUnitRunner::default()),
            recovery_tool: Arc::new(CommandRecoveryTool::new(config.recovery_tool.clone())),
            system: Arc::new(HostSystem::new()),
        }
    }
}

/// Waits shown to the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BootTimings {
    pub integrity_failure_pause: Duration,
    pub ready_pause: Duration,
    pub unattended_reboot_delay: Duration,
}

impl Default for BootTimings {
    fn default() -> Self {
        Self {
            integrity_failure_pause: Duration::from_secs(timing::INTEGRITY_FAILURE_PAUSE_SECS),
            ready_pause: Duration::from_secs(timing::READY_PAUSE_SECS),
            unattended_reboot_delay: Duration::from_secs(timing::UNATTENDED_REBOOT_DELAY_SECS),
        }
    }
}

impl BootTimings {
    /// No waiting at all.
    pub fn immediate() -> Self {
        Self {
            integrity_failure_pause: Duration::ZERO,
            ready_pause: Duration::ZERO,
            unattended_reboot_delay: Duration::ZERO,
        }
    }
}

/// How the post-recovery phase ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostRecoveryExit {
    /// The operator left the outcome menu.
    Menu(MenuExit),
    /// Unattended success: rebooted after the countdown.
    Rebooted,
}

/// Shared context for pipeline tasks.
///
/// Inputs are set up front; each task fills in its own output field.
pub struct BootContext {
    pub config: Arc<RescueConfig>,
    pub layout: RescueLayout,
    pub mode: ModeDecision,
    pub services: BootServices,
    pub timings: BootTimings,
    pub trace: TraceSwitch,
    pub env: UnitEnvironment,

    pub verdict: Option<VerificationVerdict>,
    pub setup_report: Option<SetupReport>,
    pub outcome: Option<RecoveryOutcome>,
    pub exit: Option<PostRecoveryExit>,
}

impl BootContext {
    pub fn new(
        config: Arc<RescueConfig>,
        layout: RescueLayout,
        mode: ModeDecision,
        services: BootServices,
        timings: BootTimings,
        env: UnitEnvironment,
    ) -> Self {
        Self {
            config,
            layout,
            mode,
            services,
            timings,
            trace: TraceSwitch::new(),
            env,
            verdict: None,
            setup_report: None,
            outcome: None,
            exit: None,
        }
    }
}

/// What happened during one boot.
#[derive(Debug, Clone)]
pub struct BootSummary {
    pub mode: ModeDecision,
    pub verdict: Option<VerificationVerdict>,
    pub setup_report: Option<SetupReport>,
    pub outcome: Option<RecoveryOutcome>,
    pub exit: Option<PostRecoveryExit>,
    /// Environment left behind by the setup units.
    pub env: UnitEnvironment,
    pub metrics: PipelineMetrics,
}
