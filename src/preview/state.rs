//! Orchestration state machine.
//!
//! ```text
//!            edit               elapse              accepted Ok
//! Idle ─────────────► Awaiting ────────► Compiling ─────────────► Rendered
//!   ▲                  ▲  │ (empty text)     │ accepted Err / bad payload
//!   └──────────────────┼──┘                  └──────────────────► Failed
//!                      └──────── edit (from any phase) ─────────────┘
//! ```
//!
//! Edits never cancel dispatched requests. While a new quiet period is
//! pending the phase stays `AwaitingQuietPeriod`, even if an older response
//! is accepted and rendered in the meantime.

use std::time::Duration;

use tokio::time::Instant;

use super::{
    CompileDispatcher, CompileRequest, CompileResponse, Debouncer, DisplayResource, PreviewError,
    ResourceId, ResourceManager, ResourceStats, Resolution, SeqId, decode,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    /// Nothing scheduled and nothing outstanding
    Idle,
    /// Quiet period running
    AwaitingQuietPeriod,
    /// Latest issued request, still awaiting its response
    Compiling(SeqId),
    /// Resource from this request is live
    Rendered(SeqId),
    /// Latest accepted response was an error; the previous resource stays live
    Failed { seq: SeqId, cause: PreviewError },
}

impl Phase {
    /// Rendered or Failed.
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Rendered(_) | Self::Failed { .. })
    }
}

/// Effect of feeding a compile response into the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Update {
    /// New resource installed; the renderer should show it
    Rendered { seq: SeqId, resource: ResourceId },
    /// Accepted failure; the renderer keeps the old resource
    Failed { seq: SeqId, cause: PreviewError },
    /// Superseded response, dropped
    Stale { seq: SeqId },
}

/// Observable state published after every transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewSnapshot {
    pub phase: Phase,
    pub live: Option<ResourceId>,
    pub stats: ResourceStats,
    pub in_flight: usize,
}

impl Default for PreviewSnapshot {
    fn default() -> Self {
        Self {
            phase: Phase::Idle,
            live: None,
            stats: ResourceStats::default(),
            in_flight: 0,
        }
    }
}

/// Owns the source text, the quiet-period deadline, the dispatcher and the
/// live resource. Time is passed in so the machine stays synchronous.
#[derive(Debug)]
pub struct Orchestrator {
    source: String,
    debouncer: Debouncer,
    dispatcher: CompileDispatcher,
    resources: ResourceManager,
    phase: Phase,
    /// Last Idle/Rendered/Failed, restored when a fire issues nothing
    outcome: Phase,
}

impl Orchestrator {
    pub fn new(quiet_period: Duration, skip_unchanged: bool) -> Self {
        Self {
            source: String::new(),
            debouncer: Debouncer::new(quiet_period),
            dispatcher: CompileDispatcher::new(skip_unchanged),
            resources: ResourceManager::new(),
            phase: Phase::Idle,
            outcome: Phase::Idle,
        }
    }

    /// Record new source text and restart the quiet period.
    pub fn text_changed(&mut self, text: String, now: Instant) {
        self.source = text;
        self.debouncer.notify_changed(now);
        self.phase = Phase::AwaitingQuietPeriod;
    }

    /// Fire a request if the quiet period has elapsed.
    pub fn poll_timer(&mut self, now: Instant) -> Option<CompileRequest> {
        if !self.debouncer.take_if_elapsed(now) {
            return None;
        }
        self.fire()
    }

    /// Skip the quiet period and fire immediately.
    pub fn compile_now(&mut self) -> Option<CompileRequest> {
        self.debouncer.cancel();
        self.fire()
    }

    /// Feed a compiler response through filtering, decoding and installation.
    pub fn complete(&mut self, response: CompileResponse) -> Update {
        let (seq, decoded) = match self.dispatcher.resolve(response) {
            Resolution::Stale { seq } => {
                crate::debug!("preview"; "discarding stale response {}", seq);
                return Update::Stale { seq };
            }
            Resolution::Accepted { seq, payload } => (seq, decode(&payload)),
            Resolution::Failed { seq, error } => (seq, Err(PreviewError::CompileFailure(error))),
        };

        match decoded {
            Ok(bytes) => {
                let resource = self.resources.install(bytes).id();
                self.settle(Phase::Rendered(seq));
                Update::Rendered { seq, resource }
            }
            Err(cause) => {
                self.settle(Phase::Failed {
                    seq,
                    cause: cause.clone(),
                });
                Update::Failed { seq, cause }
            }
        }
    }

    /// The renderer could not show the resource accepted for `seq`.
    ///
    /// The resource stays installed; only the phase reports the failure.
    pub fn render_failed(&mut self, seq: SeqId, message: String) -> Update {
        let cause = PreviewError::RenderFailure(message);
        self.settle(Phase::Failed {
            seq,
            cause: cause.clone(),
        });
        Update::Failed { seq, cause }
    }

    fn fire(&mut self) -> Option<CompileRequest> {
        match self.dispatcher.issue(&self.source) {
            Some(request) => {
                crate::debug!("preview"; "dispatching {} ({} bytes)", request.seq, request.text.len());
                self.phase = Phase::Compiling(request.seq);
                Some(request)
            }
            None => {
                self.phase = match self.dispatcher.latest_issued() {
                    Some(seq) if self.dispatcher.in_flight() > 0 => Phase::Compiling(seq),
                    _ => self.outcome.clone(),
                };
                None
            }
        }
    }

    fn settle(&mut self, outcome: Phase) {
        self.outcome = outcome.clone();
        if !self.debouncer.is_pending() {
            self.phase = outcome;
        }
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    /// Resource currently exposed to the renderer.
    pub fn live(&self) -> Option<&DisplayResource> {
        self.resources.live()
    }

    pub fn sleep_duration(&self, now: Instant) -> Duration {
        self.debouncer.sleep_duration(now)
    }

    pub fn snapshot(&self) -> PreviewSnapshot {
        PreviewSnapshot {
            phase: self.phase.clone(),
            live: self.resources.live().map(DisplayResource::id),
            stats: self.resources.stats(),
            in_flight: self.dispatcher.in_flight(),
        }
    }
}
