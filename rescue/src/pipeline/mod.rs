//! Table-driven boot pipeline.
//!
//! ## Architecture
//!
//! ```text
//! ExecutionPlan → Stages → Tasks
//!
//! - ExecutionPlan: ordered stages chosen up front from the boot mode
//! - Stage: named group of tasks, run one after another
//! - Task: atomic unit of work against a shared context
//! ```
//!
//! The first task error stops the plan; later stages never run.

mod metrics;
#[allow(clippy::module_inception)]
mod pipeline;
mod stage;
mod task;

pub use metrics::{PipelineMetrics, StageMetrics, TaskMetrics};
pub use pipeline::{ExecutionPlan, PipelineExecutor};
pub use stage::Stage;
pub use task::{BoxedTask, PipelineTask};
