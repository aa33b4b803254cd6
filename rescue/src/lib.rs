//! Boot-time orchestrator for a disaster-recovery rescue system.
//!
//! On boot the orchestrator classifies the kernel boot parameters, checks
//! the rescue image against its checksum manifest, runs the setup units and,
//! when asked to, launches the recovery tool and handles its outcome.
//!
//! ```ignore
//! let layout = RescueLayout::system();
//! let config = Arc::new(RescueConfig::load(&layout)?);
//! let params = BootParameterSet::read(Path::new("/proc/cmdline"))?;
//! let services = BootServices::host(&config);
//! BootOrchestrator::new(config, layout, params, services).run().await?;
//! ```

pub mod boot;
pub mod config;
pub mod console;
pub mod constants;
pub mod integrity;
pub mod layout;
pub mod menu;
pub mod params;
pub mod pipeline;
pub mod recovery;
pub mod setup;
pub mod system;
pub mod util;

pub use boot::{BootOrchestrator, BootServices, BootSummary, BootTimings, PostRecoveryExit};
pub use config::RescueConfig;
pub use layout::RescueLayout;
pub use params::{BootMode, BootParameterSet, ModeDecision, classify};
pub use rescue_shared::errors::{RescueError, RescueResult};

use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber, writing to `rescue-setup.log` in `log_dir`.
///
/// `RUST_LOG` wins when set; otherwise `info`, or `debug` for debug boots.
/// Keep the returned guard alive until exit or buffered lines are lost.
pub fn init_logging(log_dir: &Path, debug: bool) -> RescueResult<WorkerGuard> {
    std::fs::create_dir_all(log_dir).map_err(|e| {
        RescueError::Storage(format!(
            "Failed to create log directory {}: {}",
            log_dir.display(),
            e
        ))
    })?;

    let appender = tracing_appender::rolling::never(log_dir, constants::LOG_FILE_NAME);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let default_level = if debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(|e| RescueError::Internal(format!("Failed to install logger: {}", e)))?;

    Ok(guard)
}
