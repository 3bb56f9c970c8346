//! `livetex compile`: one-shot build through the preview pipeline.
//!
//! The source is fed to a preview actor as a single edit followed by a
//! manual compile, so the result goes through the same decode/install/render
//! path as watch mode.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};

use crate::actor::PreviewActor;
use crate::backend::{LatexmkCompiler, PdfFileRenderer};
use crate::config::LiveConfig;
use crate::preview::{Phase, PreviewError};

pub fn compile_source(config: &LiveConfig, source: &Path) -> Result<()> {
    let text = std::fs::read_to_string(source)
        .with_context(|| format!("failed to read {}", source.display()))?;
    if text.is_empty() {
        bail!("{} is empty, nothing to compile", source.display());
    }

    let compiler = LatexmkCompiler::from_config(&config.compiler)?;
    let renderer = PdfFileRenderer::new(config.output.path.clone());

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to create tokio runtime")?;

    let phase = rt.block_on(async {
        let (actor, handle) =
            PreviewActor::channel(4, &config.preview, Arc::new(compiler), Box::new(renderer));
        let mut snapshots = actor.subscribe();
        let task = tokio::spawn(actor.run());

        handle.text_changed(text).await;
        handle.compile_now().await;

        let phase = snapshots
            .wait_for(|s| s.phase.is_settled())
            .await
            .map(|s| s.phase.clone())
            .context("preview stopped before the compile finished")?;

        handle.shutdown().await;
        let _ = task.await;
        anyhow::Ok(phase)
    })?;

    match phase {
        Phase::Failed {
            cause: PreviewError::RenderFailure(_),
            ..
        } => bail!("failed to write {}", config.output.path.display()),
        Phase::Failed { seq, .. } => bail!("compile {seq} failed"),
        _ => Ok(()),
    }
}
