//! Task: Integrity check.
//!
//! Compares the rescue image against its checksum manifest. A mismatch is
//! shown to the operator but never stops the boot.

use super::{BootCtx, task_start};
use crate::integrity::{ExclusionPattern, IntegrityVerifier, VerificationVerdict};
use crate::pipeline::PipelineTask;
use async_trait::async_trait;
use rescue_shared::errors::RescueResult;

pub struct IntegrityTask;

#[async_trait]
impl PipelineTask<BootCtx> for IntegrityTask {
    async fn run(self: Box<Self>, ctx: BootCtx) -> RescueResult<()> {
        let mode = task_start(&ctx, self.name()).await;

        let (layout, config, console, pause) = {
            let ctx = ctx.lock().await;
            (
                ctx.layout.clone(),
                ctx.config.clone(),
                ctx.services.console.clone(),
                ctx.timings.integrity_failure_pause,
            )
        };

        let exclusion = match ExclusionPattern::new(config.exclude_checksum_verification.as_deref()) {
            Ok(exclusion) => exclusion,
            Err(e) => {
                tracing::warn!(error = %e, "Falling back to the default exclusion");
                ExclusionPattern::new(None)?
            }
        };

        let verdict = IntegrityVerifier::new(layout.clone())
            .verify(&layout.manifest_path(), &exclusion);

        match &verdict {
            VerificationVerdict::Skipped => {
                tracing::info!(manifest = %layout.manifest_path().display(), "No checksum manifest, integrity check skipped");
            }
            VerificationVerdict::Passed => tracing::info!("Integrity check passed"),
            VerificationVerdict::Failed(paths) => {
                tracing::warn!(count = paths.len(), failures = ?paths, "Integrity check failed");

                console.write_line("Possibly corrupted rescue system, checksum mismatch for:")?;
                for path in paths {
                    console.write_line(&format!("  {}", path))?;
                }

                if mode.debug {
                    console.wait_for_key("Press any key to continue ").await?;
                } else {
                    console.write_line(&format!(
                        "Continuing in {} seconds...",
                        pause.as_secs()
                    ))?;
                    tokio::time::sleep(pause).await;
                }
            }
        }

        ctx.lock().await.verdict = Some(verdict);
        Ok(())
    }

    fn name(&self) -> &str {
        "integrity_check"
    }
}
