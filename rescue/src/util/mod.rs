//! Process helpers.

mod process;

pub use process::spawn_detached_shell;
