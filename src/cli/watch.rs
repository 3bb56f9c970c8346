//! `livetex watch`: live preview until Ctrl+C.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};

use crate::actor::Coordinator;
use crate::config::LiveConfig;
use crate::log;

/// Run the actor system on the current thread until shutdown.
pub fn watch_source(config: LiveConfig, source: &Path) -> Result<()> {
    if !source.is_file() {
        bail!("source file not found: {}", source.display());
    }

    let (shutdown_tx, shutdown_rx) = crossbeam::channel::unbounded();
    crate::core::register_shutdown(shutdown_tx);

    log!(
        "watch";
        "quiet period {}ms, press Ctrl+C to stop",
        config.preview.quiet_period_ms
    );

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to create tokio runtime")?;

    rt.block_on(
        Coordinator::new(Arc::new(config), source.to_path_buf())
            .with_shutdown_signal(shutdown_rx)
            .run(),
    )
}
