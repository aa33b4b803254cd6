//! Tasks: Post-recovery handling.
//!
//! Automatic boots always end in the outcome menu. Unattended boots reboot on
//! their own after a successful recovery and fall back to the menu otherwise.

use super::{BootCtx, log_task_error, task_start};
use crate::boot::types::PostRecoveryExit;
use crate::menu::{MenuActions, OutcomeMenu, countdown_and_reboot};
use crate::params::ModeDecision;
use crate::pipeline::PipelineTask;
use crate::recovery::RecoveryOutcome;
use async_trait::async_trait;
use rescue_shared::errors::{RescueError, RescueResult};

pub struct OutcomeMenuTask;

#[async_trait]
impl PipelineTask<BootCtx> for OutcomeMenuTask {
    async fn run(self: Box<Self>, ctx: BootCtx) -> RescueResult<()> {
        let task_name = self.name();
        let mode = task_start(&ctx, task_name).await;

        let outcome = recorded_outcome(&ctx).await?;
        let exit = run_menu(&ctx, &mode, outcome)
            .await
            .inspect_err(|e| log_task_error(task_name, e))?;

        ctx.lock().await.exit = Some(exit);
        Ok(())
    }

    fn name(&self) -> &str {
        "outcome_menu"
    }
}

pub struct UnattendedExitTask;

#[async_trait]
impl PipelineTask<BootCtx> for UnattendedExitTask {
    async fn run(self: Box<Self>, ctx: BootCtx) -> RescueResult<()> {
        let task_name = self.name();
        let mode = task_start(&ctx, task_name).await;

        let exit = match recorded_outcome(&ctx).await? {
            RecoveryOutcome::Success => {
                let (console, system, delay) = {
                    let ctx = ctx.lock().await;
                    (
                        ctx.services.console.clone(),
                        ctx.services.system.clone(),
                        ctx.timings.unattended_reboot_delay,
                    )
                };
                countdown_and_reboot(console.as_ref(), system.as_ref(), delay)
                    .await
                    .inspect_err(|e| log_task_error(task_name, e))?;
                PostRecoveryExit::Rebooted
            }
            RecoveryOutcome::Failure => run_menu(&ctx, &mode, RecoveryOutcome::Failure)
                .await
                .inspect_err(|e| log_task_error(task_name, e))?,
        };

        ctx.lock().await.exit = Some(exit);
        Ok(())
    }

    fn name(&self) -> &str {
        "unattended_exit"
    }
}

async fn recorded_outcome(ctx: &BootCtx) -> RescueResult<RecoveryOutcome> {
    ctx.lock()
        .await
        .outcome
        .ok_or_else(|| RescueError::Internal("recover task must run first".into()))
}

async fn run_menu(
    ctx: &BootCtx,
    mode: &ModeDecision,
    outcome: RecoveryOutcome,
) -> RescueResult<PostRecoveryExit> {
    let (console, system, layout) = {
        let ctx = ctx.lock().await;
        (
            ctx.services.console.clone(),
            ctx.services.system.clone(),
            ctx.layout.clone(),
        )
    };

    let actions = MenuActions::new(console.as_ref(), system.as_ref(), &layout);
    let exit = OutcomeMenu::new(mode, outcome).run(&actions).await?;
    tracing::info!(exit = ?exit, "Left outcome menu");

    Ok(PostRecoveryExit::Menu(exit))
}
