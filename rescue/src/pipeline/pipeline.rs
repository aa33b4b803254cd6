//! Plan execution.

use super::metrics::{PipelineMetrics, StageMetrics, TaskMetrics};
use super::stage::Stage;
use super::task::BoxedTask;
use rescue_shared::errors::RescueResult;
use std::time::Instant;

pub struct ExecutionPlan<Ctx> {
    stages: Vec<Stage<BoxedTask<Ctx>>>,
}

impl<Ctx> ExecutionPlan<Ctx> {
    pub fn new(stages: Vec<Stage<BoxedTask<Ctx>>>) -> Self {
        Self { stages }
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|stage| stage.name).collect()
    }

    pub fn task_names(&self) -> Vec<&str> {
        self.stages
            .iter()
            .flat_map(|stage| stage.tasks.iter().map(|task| task.name()))
            .collect()
    }

    pub fn stages(self) -> Vec<Stage<BoxedTask<Ctx>>> {
        self.stages
    }
}

/// Runs an [`ExecutionPlan`] against a shared context.
pub struct PipelineExecutor;

impl PipelineExecutor {
    /// Execute every stage in order, stopping at the first task error.
    pub async fn execute<Ctx>(plan: ExecutionPlan<Ctx>, ctx: Ctx) -> RescueResult<PipelineMetrics>
    where
        Ctx: Clone,
    {
        let total_start = Instant::now();
        let mut stage_metrics = Vec::new();

        for stage in plan.stages() {
            let stage_start = Instant::now();
            tracing::debug!(stage = stage.name, "Entering stage");

            let mut task_metrics = Vec::with_capacity(stage.tasks.len());
            for task in stage.tasks {
                let name = task.name().to_string();
                let task_start = Instant::now();
                task.run(ctx.clone()).await?;
                task_metrics.push(TaskMetrics {
                    name,
                    duration_ms: task_start.elapsed().as_millis(),
                });
            }

            stage_metrics.push(StageMetrics {
                name: stage.name,
                duration_ms: stage_start.elapsed().as_millis(),
                tasks: task_metrics,
            });
        }

        Ok(PipelineMetrics {
            total_duration_ms: total_start.elapsed().as_millis(),
            stages: stage_metrics,
        })
    }
}
