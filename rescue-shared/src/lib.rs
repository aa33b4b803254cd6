//! Types shared between the rescue orchestrator crates.

pub mod errors;

pub use errors::{RescueError, RescueResult};
