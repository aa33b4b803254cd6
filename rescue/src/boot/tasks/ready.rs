//! Task: Ready notice.

use super::{BootCtx, task_start};
use crate::pipeline::PipelineTask;
use async_trait::async_trait;
use rescue_shared::errors::RescueResult;

pub struct ReadyTask;

#[async_trait]
impl PipelineTask<BootCtx> for ReadyTask {
    async fn run(self: Box<Self>, ctx: BootCtx) -> RescueResult<()> {
        task_start(&ctx, self.name()).await;

        let (console, pause) = {
            let ctx = ctx.lock().await;
            (ctx.services.console.clone(), ctx.timings.ready_pause)
        };

        console.write_line("Rescue system is ready")?;
        tracing::info!("Rescue system is ready");
        tokio::time::sleep(pause).await;

        Ok(())
    }

    fn name(&self) -> &str {
        "ready"
    }
}
