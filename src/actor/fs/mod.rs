//! FileSystem Actor
//!
//! Edit surface for watch mode: reports the full text of the source file
//! whenever it changes on disk. Implements the "Watcher-First" pattern: the
//! watcher is attached in `new`, so edits made before `run` are buffered.
//!
//! ```text
//! notify --> FsActor (read file) --TextChanged--> PreviewActor
//! ```
//!
//! No debouncing here. Coalescing is the preview core's job.

#[cfg(test)]
mod tests;

use std::path::{Path, PathBuf};

use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use super::messages::EditMsg;

/// FileSystem Actor - watches one source file
pub struct FsActor {
    /// Channel to receive notify events (sync -> async bridge)
    notify_rx: std::sync::mpsc::Receiver<notify::Result<notify::Event>>,
    /// Watcher handle (must be kept alive)
    watcher: RecommendedWatcher,
    /// Watched file and its last reported contents
    source: SourceFile,
    /// Channel to send edits to PreviewActor
    preview_tx: mpsc::Sender<EditMsg>,
}

struct SourceFile {
    /// Canonical path of the watched file
    target: PathBuf,
    /// One save usually emits several events; only report real changes.
    last_sent: Option<String>,
}

impl FsActor {
    /// Start watching `source` immediately.
    ///
    /// The parent directory is watched rather than the file itself, since
    /// editors that save via rename would otherwise detach the watch.
    pub fn new(source: &Path, preview_tx: mpsc::Sender<EditMsg>) -> notify::Result<Self> {
        let target = canonical_target(source)?;
        let parent = target
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        let (notify_tx, notify_rx) = std::sync::mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = notify_tx.send(res);
        })?;
        watcher.watch(&parent, RecursiveMode::NonRecursive)?;

        Ok(Self {
            notify_rx,
            watcher,
            source: SourceFile {
                target,
                last_sent: None,
            },
            preview_tx,
        })
    }

    pub fn target(&self) -> &Path {
        &self.source.target
    }

    /// Run the actor event loop
    pub async fn run(self) {
        // Extract fields before consuming self
        let notify_rx = self.notify_rx;
        let preview_tx = self.preview_tx;
        let mut source = self.source;
        let _watcher = self.watcher;

        // Initial contents, so the first preview does not wait for an edit
        if source.report(&preview_tx).await.is_err() {
            return;
        }

        let (async_tx, mut async_rx) = mpsc::channel::<notify::Event>(64);

        // Spawn a thread to poll notify events and send to async channel
        std::thread::spawn(move || {
            while let Ok(result) = notify_rx.recv() {
                match result {
                    Ok(event) => {
                        if async_tx.blocking_send(event).is_err() {
                            break; // Receiver dropped
                        }
                    }
                    Err(e) => crate::log!("watch"; "notify error: {}", e),
                }
            }
        });

        while let Some(event) = async_rx.recv().await {
            if !touches_target(&event, &source.target) {
                continue;
            }
            crate::debug!("watch"; "raw notify: {:?}", event.kind);
            if source.report(&preview_tx).await.is_err() {
                break;
            }
        }
    }
}

impl SourceFile {
    /// Read the file and forward it if it differs from the last report.
    ///
    /// Returns `Err(())` if PreviewActor shut down.
    async fn report(&mut self, preview_tx: &mpsc::Sender<EditMsg>) -> Result<(), ()> {
        let text = match std::fs::read_to_string(&self.target) {
            Ok(text) => text,
            Err(e) => {
                // Mid-save (truncated or renamed away); the next event retries.
                crate::debug!("watch"; "read {} failed: {}", self.target.display(), e);
                return Ok(());
            }
        };

        if self.last_sent.as_deref() == Some(text.as_str()) {
            return Ok(());
        }

        crate::debug!("watch"; "changed: {} ({} bytes)", self.target.display(), text.len());
        self.last_sent = Some(text.clone());
        preview_tx
            .send(EditMsg::TextChanged(text))
            .await
            .map_err(|_| ())
    }
}

/// Absolute path of `source` with a canonical parent directory.
fn canonical_target(source: &Path) -> notify::Result<PathBuf> {
    let name = source.file_name().ok_or_else(|| {
        notify::Error::generic(&format!("not a file path: {}", source.display()))
    })?;
    let parent = match source.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let parent = std::fs::canonicalize(parent).map_err(notify::Error::io)?;
    Ok(parent.join(name))
}

/// Whether a notify event may have changed the contents of `target`.
fn touches_target(event: &notify::Event, target: &Path) -> bool {
    let kind_matches = match event.kind {
        EventKind::Create(_) | EventKind::Any => true,
        // Ignore metadata-only changes (mtime/atime/chmod noise)
        EventKind::Modify(modify) => !matches!(modify, notify::event::ModifyKind::Metadata(_)),
        _ => false,
    };

    kind_matches && event.paths.iter().any(|p| p == target)
}
