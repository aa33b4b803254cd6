//! rescue-setup: runs once at boot of the rescue system.

use anyhow::Context;
use clap::Parser;
use rescue::constants::paths;
use rescue::{BootOrchestrator, BootParameterSet, BootServices, RescueConfig, RescueLayout};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Parser)]
#[command(name = "rescue-setup")]
#[command(about = "Set up the rescue system and optionally start recovery")]
struct Args {
    /// Root of the rescue filesystem.
    #[arg(long, default_value = "/")]
    root: PathBuf,

    /// File holding the kernel boot parameters.
    #[arg(long, default_value = paths::CMDLINE)]
    cmdline: PathBuf,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let params = BootParameterSet::read(&args.cmdline)
        .with_context(|| format!("reading {}", args.cmdline.display()))?;

    let layout = RescueLayout::new(&args.root);
    layout.prepare()?;
    let _log_guard = rescue::init_logging(&layout.log_dir(), params.is_debug())?;

    let config = Arc::new(RescueConfig::load(&layout).context("loading rescue configuration")?);
    let services = BootServices::host(&config);

    let summary = BootOrchestrator::new(config, layout, params, services)
        .run()
        .await
        .inspect_err(|e| tracing::error!(error = %e, "Rescue boot failed"))?;

    tracing::info!(
        mode = %summary.mode.boot_mode(),
        outcome = ?summary.outcome,
        exit = ?summary.exit,
        "Rescue boot finished"
    );
    Ok(())
}
