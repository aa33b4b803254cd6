//! Operator console.
//!
//! Everything the operator sees or types goes through [`Console`], so the
//! orchestration logic can be driven by a scripted console in tests.
//!
//! Writes are flushed immediately: output printed before a prompt must be on
//! screen before the prompt blocks.

use async_trait::async_trait;
use rescue_shared::errors::{RescueError, RescueResult};
use std::io::{IsTerminal, Read, Write};

#[async_trait]
pub trait Console: Send + Sync {
    /// Print a line and flush.
    fn write_line(&self, line: &str) -> RescueResult<()>;

    /// Print without a newline and flush.
    fn write(&self, text: &str) -> RescueResult<()>;

    /// Show `prompt` and read one line. `None` on end of input.
    async fn read_line(&self, prompt: &str) -> RescueResult<Option<String>>;

    /// Show `prompt` and block until a single key is pressed. No timeout.
    async fn wait_for_key(&self, prompt: &str) -> RescueResult<()>;
}

/// Console on the process's stdin/stdout.
#[derive(Debug, Default)]
pub struct TerminalConsole;

impl TerminalConsole {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Console for TerminalConsole {
    fn write_line(&self, line: &str) -> RescueResult<()> {
        let mut out = std::io::stdout().lock();
        writeln!(out, "{}", line)?;
        out.flush()?;
        Ok(())
    }

    fn write(&self, text: &str) -> RescueResult<()> {
        let mut out = std::io::stdout().lock();
        write!(out, "{}", text)?;
        out.flush()?;
        Ok(())
    }

    async fn read_line(&self, prompt: &str) -> RescueResult<Option<String>> {
        self.write(prompt)?;
        blocking(|| {
            let mut line = String::new();
            let read = std::io::stdin().read_line(&mut line)?;
            if read == 0 {
                return Ok(None);
            }
            Ok(Some(line.trim_end_matches(['\n', '\r']).to_string()))
        })
        .await
    }

    async fn wait_for_key(&self, prompt: &str) -> RescueResult<()> {
        self.write(prompt)?;
        blocking(|| {
            let stdin = std::io::stdin();
            if stdin.is_terminal() {
                let _raw = RawModeGuard::enter()?;
                let mut key = [0u8; 1];
                stdin.lock().read(&mut key)?;
            } else {
                let mut line = String::new();
                stdin.read_line(&mut line)?;
            }
            Ok(())
        })
        .await?;
        self.write_line("")
    }
}

async fn blocking<T, F>(f: F) -> RescueResult<T>
where
    F: FnOnce() -> RescueResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| RescueError::Internal(format!("console read task failed: {}", e)))?
}

/// Puts stdin into non-canonical, no-echo mode so a single key can be read.
/// Restores the previous settings on drop.
struct RawModeGuard {
    original: nix::sys::termios::Termios,
}

impl RawModeGuard {
    fn enter() -> RescueResult<Self> {
        use nix::sys::termios::{LocalFlags, SetArg, SpecialCharacterIndices, tcgetattr, tcsetattr};

        let stdin = std::io::stdin();
        let original = tcgetattr(&stdin)
            .map_err(|e| RescueError::Internal(format!("Failed to read terminal mode: {}", e)))?;

        let mut raw = original.clone();
        raw.local_flags.remove(LocalFlags::ICANON | LocalFlags::ECHO);
        raw.control_chars[SpecialCharacterIndices::VMIN as usize] = 1;
        raw.control_chars[SpecialCharacterIndices::VTIME as usize] = 0;

        tcsetattr(&stdin, SetArg::TCSANOW, &raw)
            .map_err(|e| RescueError::Internal(format!("Failed to set terminal mode: {}", e)))?;

        Ok(Self { original })
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        use nix::sys::termios::{SetArg, tcsetattr};

        if let Err(e) = tcsetattr(std::io::stdin(), SetArg::TCSANOW, &self.original) {
            tracing::warn!(error = %e, "Failed to restore terminal mode");
        }
    }
}
