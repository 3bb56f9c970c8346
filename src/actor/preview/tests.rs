use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::{PreviewActor, PreviewHandle};
use crate::config::PreviewConfig;
use crate::preview::{
    CompileError, Compiler, DisplayResource, Phase, PreviewError, PreviewSnapshot, Renderer,
    ResourceId, SeqId,
};

const Q: Duration = Duration::from_millis(500);

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

/// Encodes the source as the "document". Sources containing `\error` fail.
#[derive(Default)]
struct ScriptedCompiler {
    calls: Arc<Mutex<Vec<String>>>,
    delays: Vec<(&'static str, Duration)>,
}

impl ScriptedCompiler {
    fn with_delay(mut self, source: &'static str, delay: Duration) -> Self {
        self.delays.push((source, delay));
        self
    }
}

#[async_trait]
impl Compiler for ScriptedCompiler {
    async fn compile(&self, source: &str) -> Result<String, CompileError> {
        self.calls.lock().push(source.to_owned());

        let delay = self
            .delays
            .iter()
            .find(|(s, _)| *s == source)
            .map_or(Duration::ZERO, |(_, d)| *d);
        tokio::time::sleep(delay).await;

        if source.contains("\\error") {
            return Err(CompileError::new("syntax error"));
        }
        Ok(STANDARD.encode(source))
    }
}

type Shown = Arc<Mutex<Vec<(ResourceId, Vec<u8>, NonZeroU32)>>>;

#[derive(Default)]
struct RecordingRenderer {
    shown: Shown,
}

impl Renderer for RecordingRenderer {
    fn show(&mut self, resource: &DisplayResource, page: NonZeroU32) -> anyhow::Result<()> {
        self.shown
            .lock()
            .push((resource.id(), resource.bytes().to_vec(), page));
        Ok(())
    }
}

struct Harness {
    handle: PreviewHandle,
    snapshots: watch::Receiver<PreviewSnapshot>,
    calls: Arc<Mutex<Vec<String>>>,
    shown: Shown,
    task: JoinHandle<()>,
}

impl Harness {
    fn start(compiler: ScriptedCompiler) -> Self {
        let calls = Arc::clone(&compiler.calls);
        let renderer = RecordingRenderer::default();
        let shown = Arc::clone(&renderer.shown);

        let (actor, handle) = PreviewActor::channel(
            8,
            &PreviewConfig::default(),
            Arc::new(compiler),
            Box::new(renderer),
        );
        let snapshots = actor.subscribe();
        let task = tokio::spawn(actor.run());

        Self {
            handle,
            snapshots,
            calls,
            shown,
            task,
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    fn shown_bytes(&self) -> Vec<Vec<u8>> {
        self.shown.lock().iter().map(|(_, b, _)| b.clone()).collect()
    }

    fn snapshot(&self) -> PreviewSnapshot {
        self.snapshots.borrow().clone()
    }
}

#[tokio::test(start_paused = true)]
async fn test_burst_sends_one_request_with_last_text() {
    let h = Harness::start(ScriptedCompiler::default());

    h.handle.text_changed("a").await;
    tokio::time::sleep(ms(100)).await;
    h.handle.text_changed("ab").await;
    tokio::time::sleep(ms(100)).await;
    h.handle.text_changed("abc").await;

    tokio::time::sleep(Q - ms(1)).await;
    assert!(h.calls().is_empty());

    tokio::time::sleep(ms(2)).await;
    assert_eq!(h.calls(), vec!["abc"]);

    tokio::time::sleep(ms(2000)).await;
    assert_eq!(h.calls().len(), 1);
    assert_eq!(h.shown_bytes(), vec![b"abc".to_vec()]);
}

#[tokio::test(start_paused = true)]
async fn test_single_edit_renders_first_page() {
    let mut h = Harness::start(ScriptedCompiler::default());

    h.handle.text_changed("\\section{A}").await;
    let snapshot = h
        .snapshots
        .wait_for(|s| s.phase.is_settled())
        .await
        .unwrap()
        .clone();

    assert_eq!(snapshot.phase, Phase::Rendered(SeqId::new(1)));
    assert_eq!(h.calls(), vec!["\\section{A}"]);

    let shown = h.shown.lock().clone();
    assert_eq!(shown.len(), 1);
    assert_eq!(Some(shown[0].0), snapshot.live);
    assert_eq!(shown[0].2.get(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_late_older_response_is_discarded() {
    let h = Harness::start(ScriptedCompiler::default().with_delay("\\section{A}", ms(2000)));

    h.handle.text_changed("\\section{A}").await;
    tokio::time::sleep(ms(600)).await;
    h.handle.text_changed("\\section{B}").await;

    // B answers at ~1110ms, A at ~2500ms
    tokio::time::sleep(ms(3000)).await;

    assert_eq!(h.calls(), vec!["\\section{A}", "\\section{B}"]);
    assert_eq!(h.shown_bytes(), vec![b"\\section{B}".to_vec()]);

    let snapshot = h.snapshot();
    assert_eq!(snapshot.phase, Phase::Rendered(SeqId::new(2)));
    assert_eq!(snapshot.stats.installed, 1);
    assert_eq!(snapshot.in_flight, 0);
}

#[tokio::test(start_paused = true)]
async fn test_compile_error_keeps_previous_resource() {
    let h = Harness::start(ScriptedCompiler::default());

    h.handle.text_changed("\\section{ok}").await;
    tokio::time::sleep(ms(1000)).await;
    let rendered = h.snapshot().live;
    assert!(rendered.is_some());

    h.handle.text_changed("\\error").await;
    tokio::time::sleep(ms(1000)).await;

    let snapshot = h.snapshot();
    assert_eq!(
        snapshot.phase,
        Phase::Failed {
            seq: SeqId::new(2),
            cause: PreviewError::CompileFailure(CompileError::new("syntax error")),
        }
    );
    assert_eq!(snapshot.live, rendered);
    assert_eq!(h.shown_bytes().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_empty_text_never_compiles() {
    let h = Harness::start(ScriptedCompiler::default());

    h.handle.text_changed("").await;
    tokio::time::sleep(ms(2000)).await;
    h.handle.compile_now().await;
    tokio::time::sleep(ms(10)).await;

    assert!(h.calls().is_empty());
    assert_eq!(h.snapshot().phase, Phase::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_compile_now_skips_quiet_period() {
    let h = Harness::start(ScriptedCompiler::default());

    h.handle.text_changed("x").await;
    h.handle.compile_now().await;
    tokio::time::sleep(ms(1)).await;
    assert_eq!(h.calls(), vec!["x"]);

    // Pending timer was cancelled, no duplicate request
    tokio::time::sleep(ms(2000)).await;
    assert_eq!(h.calls().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_stops_actor() {
    let h = Harness::start(ScriptedCompiler::default());

    h.handle.shutdown().await;
    h.task.await.unwrap();
    assert!(!h.handle.text_changed("late").await);
}

struct FailingRenderer;

impl Renderer for FailingRenderer {
    fn show(&mut self, _resource: &DisplayResource, _page: NonZeroU32) -> anyhow::Result<()> {
        anyhow::bail!("disk full")
    }
}

#[tokio::test(start_paused = true)]
async fn test_render_error_settles_as_failed() {
    let (actor, handle) = PreviewActor::channel(
        8,
        &PreviewConfig::default(),
        Arc::new(ScriptedCompiler::default()),
        Box::new(FailingRenderer),
    );
    let mut snapshots = actor.subscribe();
    let task = tokio::spawn(actor.run());

    handle.text_changed("x").await;
    handle.compile_now().await;
    let phase = snapshots
        .wait_for(|s| s.phase.is_settled())
        .await
        .unwrap()
        .phase
        .clone();

    assert_eq!(
        phase,
        Phase::Failed {
            seq: SeqId::new(1),
            cause: PreviewError::RenderFailure("disk full".into()),
        }
    );

    handle.shutdown().await;
    task.await.unwrap();
}
