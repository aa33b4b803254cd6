//! Stage definition.

/// A named group of tasks executed in order.
///
/// Generic over task type T so tests can build plans of plain values.
#[derive(Debug, Clone)]
pub struct Stage<T> {
    pub name: &'static str,
    pub tasks: Vec<T>,
}

impl<T> Stage<T> {
    pub fn new(name: &'static str, tasks: Vec<T>) -> Self {
        Self { name, tasks }
    }

    /// Stage holding a single task.
    pub fn single(name: &'static str, task: T) -> Self {
        Self::new(name, vec![task])
    }
}
