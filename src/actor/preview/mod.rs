//! Preview Actor - drives the orchestration core
//!
//! Owns the [`Orchestrator`] and runs it on a single task. Suspends only on
//! three things: the next edit message, the next compile response, and the
//! quiet-period deadline. Compile calls run as detached tasks that post back
//! over a channel.

#[cfg(test)]
mod tests;

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::time::Instant;

use super::messages::EditMsg;
use crate::config::PreviewConfig;
use crate::preview::{
    CompileRequest, CompileResponse, Compiler, Orchestrator, PREVIEW_PAGE, PreviewSnapshot,
    Renderer, ResourceId, SeqId, Update, spawn_compile,
};

const RESPONSE_BUFFER: usize = 16;

/// Cloneable sender side used by edit surfaces.
#[derive(Debug, Clone)]
pub struct PreviewHandle {
    tx: mpsc::Sender<EditMsg>,
}

impl PreviewHandle {
    /// Returns `false` if the actor has stopped.
    pub async fn text_changed(&self, text: impl Into<String>) -> bool {
        self.tx.send(EditMsg::TextChanged(text.into())).await.is_ok()
    }

    pub async fn compile_now(&self) -> bool {
        self.tx.send(EditMsg::CompileNow).await.is_ok()
    }

    pub async fn shutdown(&self) {
        let _ = self.tx.send(EditMsg::Shutdown).await;
    }

    pub fn sender(&self) -> mpsc::Sender<EditMsg> {
        self.tx.clone()
    }
}

pub struct PreviewActor {
    rx: mpsc::Receiver<EditMsg>,
    core: Orchestrator,
    compiler: Arc<dyn Compiler>,
    renderer: Box<dyn Renderer>,
    snapshot_tx: watch::Sender<PreviewSnapshot>,
}

impl PreviewActor {
    pub fn new(
        rx: mpsc::Receiver<EditMsg>,
        config: &PreviewConfig,
        compiler: Arc<dyn Compiler>,
        renderer: Box<dyn Renderer>,
    ) -> Self {
        let (snapshot_tx, _) = watch::channel(PreviewSnapshot::default());
        Self {
            rx,
            core: Orchestrator::new(config.quiet_period(), config.skip_unchanged),
            compiler,
            renderer,
            snapshot_tx,
        }
    }

    /// Create an actor together with its handle.
    pub fn channel(
        buffer: usize,
        config: &PreviewConfig,
        compiler: Arc<dyn Compiler>,
        renderer: Box<dyn Renderer>,
    ) -> (Self, PreviewHandle) {
        let (tx, rx) = mpsc::channel(buffer);
        (
            Self::new(rx, config, compiler, renderer),
            PreviewHandle { tx },
        )
    }

    /// Observe state transitions.
    pub fn subscribe(&self) -> watch::Receiver<PreviewSnapshot> {
        self.snapshot_tx.subscribe()
    }

    /// Main event loop
    pub async fn run(mut self) {
        let (response_tx, mut response_rx) = mpsc::channel::<CompileResponse>(RESPONSE_BUFFER);

        loop {
            tokio::select! {
                biased;

                msg = self.rx.recv() => match msg {
                    Some(EditMsg::TextChanged(text)) => {
                        self.core.text_changed(text, Instant::now());
                    }
                    Some(EditMsg::CompileNow) => {
                        if let Some(request) = self.core.compile_now() {
                            self.dispatch(request, &response_tx);
                        }
                    }
                    Some(EditMsg::Shutdown) | None => break,
                },

                Some(response) = response_rx.recv() => self.on_response(response),

                _ = tokio::time::sleep(self.core.sleep_duration(Instant::now())) => {
                    if let Some(request) = self.core.poll_timer(Instant::now()) {
                        self.dispatch(request, &response_tx);
                    }
                }
            }

            self.snapshot_tx.send_replace(self.core.snapshot());
        }

        crate::debug!("preview"; "shutting down");
    }

    fn dispatch(&self, request: CompileRequest, response_tx: &mpsc::Sender<CompileResponse>) {
        crate::log!("compile"; "compiling {}", request.seq);
        // Detached: superseded requests resolve and get filtered by sequence.
        drop(spawn_compile(
            Arc::clone(&self.compiler),
            request,
            response_tx.clone(),
        ));
    }

    fn on_response(&mut self, response: CompileResponse) {
        let update = match self.core.complete(response) {
            Update::Rendered { seq, resource } => self.show(seq, resource),
            other => other,
        };

        match update {
            Update::Rendered { seq, resource } => {
                crate::debug!("preview"; "{} shown as {}", seq, resource);
            }
            Update::Failed { seq, cause } => {
                crate::logger::status_error(&format!("{seq} failed"), &cause.to_string());
            }
            Update::Stale { .. } => {}
        }
    }

    /// Hand the live resource to the renderer. A renderer error fails `seq`.
    fn show(&mut self, seq: SeqId, resource: ResourceId) -> Update {
        let shown = match self.core.live() {
            Some(live) => self.renderer.show(live, PREVIEW_PAGE),
            None => Ok(()),
        };

        match shown {
            Ok(()) => Update::Rendered { seq, resource },
            Err(e) => self.core.render_failed(seq, format!("{e:#}")),
        }
    }
}
