//! Process utilities: the detached debug shell.

use rescue_shared::errors::{RescueError, RescueResult};
use std::fs::OpenOptions;
use std::os::unix::process::CommandExt;
use std::path::Path;
use std::process::{Command, Stdio};

/// Start `shell` in its own session on terminal `tty` and forget about it.
///
/// The child is never waited for and no handle is kept: the shell lives
/// independently of the orchestrator for as long as the operator uses it.
/// Returns the child's PID for logging.
pub fn spawn_detached_shell(shell: &Path, tty: &Path) -> RescueResult<u32> {
    let open_tty = || {
        OpenOptions::new()
            .read(true)
            .write(true)
            .open(tty)
            .map_err(|e| {
                RescueError::Engine(format!("Failed to open terminal {}: {}", tty.display(), e))
            })
    };

    let mut cmd = Command::new(shell);
    cmd.stdin(Stdio::from(open_tty()?))
        .stdout(Stdio::from(open_tty()?))
        .stderr(Stdio::from(open_tty()?));

    // SAFETY: setsid is async-signal-safe and touches no parent state.
    unsafe {
        cmd.pre_exec(|| {
            nix::unistd::setsid()
                .map(|_| ())
                .map_err(std::io::Error::from)
        });
    }

    let child = cmd.spawn().map_err(|e| {
        RescueError::Engine(format!(
            "Failed to spawn debug shell {} on {}: {}",
            shell.display(),
            tty.display(),
            e
        ))
    })?;

    Ok(child.id())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_detached_shell_missing_tty() {
        let err = spawn_detached_shell(Path::new("/bin/sh"), Path::new("/nonexistent/tty"))
            .unwrap_err();
        assert!(matches!(err, RescueError::Engine(_)));
    }
}
