//! Boot orchestration.
//!
//! ## Architecture
//!
//! The boot runs a table-driven plan chosen from the boot parameters:
//!
//! ```text
//! Manual (no mode parameter):
//!   1. Integrity           (verify manifest, advisory)
//!   2. DebugShell          (debug only, detached shell on a spare tty)
//!   3. Setup               (run setup units in order)
//!   4. Ready               (announce, short pause)
//!
//! Automatic (auto_recover / automatic):
//!   1-4 as above
//!   5. Recover             (launch recovery tool once)
//!   6. OutcomeMenu         (view logs / shell / reboot on success)
//!
//! Unattended:
//!   1-4 as above
//!   5. Recover             (launch recovery tool once)
//!   6. UnattendedExit      (success: countdown + reboot, failure: menu)
//! ```
//!
//! Automatic and unattended are exclusive, so at most one plan contains
//! `Recover`, and it contains it once.

mod tasks;
mod types;

pub use tasks::BootCtx;
pub use types::{BootContext, BootServices, BootSummary, BootTimings, PostRecoveryExit};

use crate::config::RescueConfig;
use crate::layout::RescueLayout;
use crate::params::{BootMode, BootParameterSet, ModeDecision, classify};
use crate::pipeline::{BoxedTask, ExecutionPlan, PipelineExecutor, Stage};
use crate::setup::UnitEnvironment;
use rescue_shared::errors::RescueResult;
use std::sync::Arc;
use tokio::sync::Mutex;

use tasks::{
    DebugShellTask, IntegrityTask, OutcomeMenuTask, ReadyTask, RecoverTask, SetupTask,
    UnattendedExitTask,
};

// ============================================================================
// EXECUTION PLAN
// ============================================================================

/// Get execution plan for a boot mode.
pub fn get_execution_plan(mode: &ModeDecision) -> ExecutionPlan<BootCtx> {
    // Phase 1: bring the rescue system up, the same for every mode
    let mut system: Vec<BoxedTask<BootCtx>> = vec![Box::new(IntegrityTask)];
    if mode.debug {
        system.push(Box::new(DebugShellTask));
    }
    system.push(Box::new(SetupTask));
    system.push(Box::new(ReadyTask));

    let mut stages = vec![Stage::new("system", system)];

    // Phase 2: recover and handle the outcome
    match mode.boot_mode() {
        BootMode::Manual => {}
        BootMode::Automatic => stages.push(Stage::new(
            "recovery",
            vec![Box::new(RecoverTask), Box::new(OutcomeMenuTask)],
        )),
        BootMode::Unattended => stages.push(Stage::new(
            "recovery",
            vec![Box::new(RecoverTask), Box::new(UnattendedExitTask)],
        )),
    }

    ExecutionPlan::new(stages)
}

/// Runs one boot of the rescue system.
///
/// # Example
///
/// ```ignore
/// let summary = BootOrchestrator::new(config, layout, params, services)
///     .run()
///     .await?;
/// ```
pub struct BootOrchestrator {
    config: Arc<RescueConfig>,
    layout: RescueLayout,
    params: BootParameterSet,
    services: BootServices,
    timings: BootTimings,
    env: Option<UnitEnvironment>,
}

impl BootOrchestrator {
    pub fn new(
        config: Arc<RescueConfig>,
        layout: RescueLayout,
        params: BootParameterSet,
        services: BootServices,
    ) -> Self {
        Self {
            config,
            layout,
            params,
            services,
            timings: BootTimings::default(),
            env: None,
        }
    }

    pub fn with_timings(mut self, timings: BootTimings) -> Self {
        self.timings = timings;
        self
    }

    /// Base environment for setup units instead of the process environment.
    pub fn with_environment(mut self, env: UnitEnvironment) -> Self {
        self.env = Some(env);
        self
    }

    pub fn mode(&self) -> ModeDecision {
        classify(&self.params)
    }

    /// Execute the plan for the classified mode.
    ///
    /// Advisory problems (integrity mismatch, failing setup units, failed
    /// recovery) are part of the summary. `Err` means something the boot
    /// cannot model went wrong, such as a missing recovery tool.
    pub async fn run(self) -> RescueResult<BootSummary> {
        let BootOrchestrator {
            config,
            layout,
            params,
            services,
            timings,
            env,
        } = self;

        let mode = classify(&params);
        tracing::info!(
            mode = %mode.boot_mode(),
            debug = mode.debug,
            root = %layout.root().display(),
            "Starting rescue boot"
        );

        let mut env = env.unwrap_or_else(UnitEnvironment::from_process);
        env.extend(config.variables.clone());

        let ctx = BootContext::new(config, layout, mode, services, timings, env);
        let ctx = Arc::new(Mutex::new(ctx));

        let plan = get_execution_plan(&mode);
        tracing::debug!(stages = ?plan.stage_names(), "Execution plan");

        let metrics = PipelineExecutor::execute(plan, Arc::clone(&ctx)).await?;
        metrics.log_summary();

        let mut ctx = ctx.lock().await;
        Ok(BootSummary {
            mode,
            verdict: ctx.verdict.take(),
            setup_report: ctx.setup_report.take(),
            outcome: ctx.outcome.take(),
            exit: ctx.exit.take(),
            env: std::mem::take(&mut ctx.env),
            metrics,
        })
    }
}
