//! Task trait for pipeline execution.

use async_trait::async_trait;
use rescue_shared::errors::RescueResult;

/// A unit of work in a boot plan.
///
/// Tasks run with a shared context, cloned per task; use interior
/// mutability for writes.
#[async_trait]
pub trait PipelineTask<Ctx>: Send + Sync {
    async fn run(self: Box<Self>, ctx: Ctx) -> RescueResult<()>;

    /// Name for logs and metrics.
    fn name(&self) -> &str;
}

pub type BoxedTask<Ctx> = Box<dyn PipelineTask<Ctx>>;
