use std::time::Duration;

use anyhow::Result;
use crossbeam::channel::Receiver;

use crate::actor::fs::FsActor;
use crate::actor::preview::{PreviewActor, PreviewHandle};

/// Run all actors concurrently.
pub(super) async fn run_actors(
    fs: FsActor,
    preview: PreviewActor,
    handle: PreviewHandle,
    shutdown_rx: Option<Receiver<()>>,
) -> Result<()> {
    let mut preview_handle = tokio::spawn(preview.run());
    let fs_handle = tokio::spawn(fs.run());

    if let Some(rx) = shutdown_rx {
        loop {
            if rx.try_recv().is_ok() || crate::core::is_shutdown() {
                crate::debug!("actor"; "shutdown signal received");
                break;
            }
            if preview_handle.is_finished() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    } else {
        tokio::select! {
            _ = fs_handle => {}
            _ = &mut preview_handle => return Ok(()),
        }
    }

    crate::debug!("actor"; "sending shutdown to preview");
    handle.shutdown().await;

    let _ = tokio::time::timeout(Duration::from_millis(500), preview_handle).await;

    Ok(())
}
