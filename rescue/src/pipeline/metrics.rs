#[derive(Debug, Clone)]
pub struct TaskMetrics {
    pub name: String,
    pub duration_ms: u128,
}

#[derive(Debug, Clone)]
pub struct StageMetrics {
    pub name: &'static str,
    pub duration_ms: u128,
    pub tasks: Vec<TaskMetrics>,
}

#[derive(Debug, Clone, Default)]
pub struct PipelineMetrics {
    pub total_duration_ms: u128,
    pub stages: Vec<StageMetrics>,
}

impl PipelineMetrics {
    pub fn task_duration_ms(&self, name: &str) -> Option<u128> {
        self.tasks()
            .find(|task| task.name == name)
            .map(|task| task.duration_ms)
    }

    /// Task names in the order they ran.
    pub fn task_names(&self) -> Vec<&str> {
        self.tasks().map(|task| task.name.as_str()).collect()
    }

    pub fn log_summary(&self) {
        for stage in &self.stages {
            tracing::debug!(
                stage = stage.name,
                duration_ms = stage.duration_ms as u64,
                tasks = stage.tasks.len(),
                "Stage finished"
            );
        }
        tracing::info!(
            total_duration_ms = self.total_duration_ms as u64,
            stages = self.stages.len(),
            "Boot pipeline finished"
        );
    }

    fn tasks(&self) -> impl Iterator<Item = &TaskMetrics> {
        self.stages.iter().flat_map(|stage| stage.tasks.iter())
    }
}
