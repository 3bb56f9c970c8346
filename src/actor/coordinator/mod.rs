//! Actor Coordinator - Wires up the Live Preview Actor System
//!
//! The Coordinator is a thin orchestrator that:
//! - Builds the compiler and renderer backends
//! - Creates communication channels
//! - Runs the actors until shutdown

mod runtime;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use crossbeam::channel::Receiver;

use super::fs::FsActor;
use super::preview::PreviewActor;
use crate::backend::{LatexmkCompiler, PdfFileRenderer};
use crate::config::LiveConfig;

const CHANNEL_BUFFER: usize = 32;

/// Coordinator - wires up and runs the actor system.
pub struct Coordinator {
    config: Arc<LiveConfig>,
    source: PathBuf,
    shutdown_rx: Option<Receiver<()>>,
}

impl Coordinator {
    pub fn new(config: Arc<LiveConfig>, source: PathBuf) -> Self {
        Self {
            config,
            source,
            shutdown_rx: None,
        }
    }

    /// Set shutdown signal receiver.
    pub fn with_shutdown_signal(mut self, rx: Receiver<()>) -> Self {
        self.shutdown_rx = Some(rx);
        self
    }

    /// Run the actor system.
    pub async fn run(mut self) -> Result<()> {
        let compiler = LatexmkCompiler::from_config(&self.config.compiler)?;
        let renderer = PdfFileRenderer::new(self.config.output.path.clone());

        let (preview_actor, handle) = PreviewActor::channel(
            CHANNEL_BUFFER,
            &self.config.preview,
            Arc::new(compiler),
            Box::new(renderer),
        );

        let fs_actor = FsActor::new(&self.source, handle.sender())
            .with_context(|| format!("failed to watch {}", self.source.display()))?;

        crate::log!(
            "watch";
            "{} -> {}",
            fs_actor.target().display(),
            self.config.output.path.display()
        );

        crate::debug!("actor"; "start");
        let shutdown_rx = self.shutdown_rx.take();
        runtime::run_actors(fs_actor, preview_actor, handle, shutdown_rx).await?;

        crate::debug!("actor"; "stopped");
        Ok(())
    }
}
