use std::sync::Arc;

use rustc_hash::FxHashSet;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::{CompileError, CompileRequest, CompileResponse, Compiler, SeqId};

/// What to do with a compiler response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Newer than anything accepted so far; payload should be decoded
    Accepted { seq: SeqId, payload: String },
    /// Compiler failure for the latest request
    Failed { seq: SeqId, error: CompileError },
    /// Superseded by a newer result or request; drop silently
    Stale { seq: SeqId },
}

/// Issues sequence-numbered compile requests and filters their responses.
///
/// Requests may overlap freely. Ordering is resolved on the way back:
/// a success is accepted only if its sequence id beats every previously
/// accepted one, and a failure only if it also belongs to the latest request.
#[derive(Debug, Default)]
pub struct CompileDispatcher {
    latest_issued: Option<SeqId>,
    highest_accepted: Option<SeqId>,
    in_flight: FxHashSet<SeqId>,
    /// Text of the latest request (for `skip_unchanged`)
    last_text: Option<String>,
    skip_unchanged: bool,
}

impl CompileDispatcher {
    pub fn new(skip_unchanged: bool) -> Self {
        Self {
            skip_unchanged,
            ..Self::default()
        }
    }

    /// Create the next request for `text`, or `None` if nothing should be sent.
    pub fn issue(&mut self, text: &str) -> Option<CompileRequest> {
        if text.is_empty() {
            crate::debug!("dispatch"; "source is empty, skipping");
            return None;
        }

        if self.skip_unchanged && self.last_text.as_deref() == Some(text) {
            crate::debug!("dispatch"; "source unchanged, skipping");
            return None;
        }

        let seq = self.latest_issued.map_or(SeqId::new(1), SeqId::next);
        self.latest_issued = Some(seq);
        self.in_flight.insert(seq);
        if self.skip_unchanged {
            self.last_text = Some(text.to_owned());
        }

        Some(CompileRequest {
            seq,
            text: text.to_owned(),
        })
    }

    /// Classify a response and advance the acceptance watermark.
    pub fn resolve(&mut self, response: CompileResponse) -> Resolution {
        let CompileResponse { seq, result } = response;
        self.in_flight.remove(&seq);

        if self.highest_accepted.is_some_and(|accepted| seq <= accepted) {
            return Resolution::Stale { seq };
        }

        match result {
            Ok(payload) => {
                self.highest_accepted = Some(seq);
                Resolution::Accepted { seq, payload }
            }
            Err(error) if Some(seq) == self.latest_issued => {
                self.highest_accepted = Some(seq);
                Resolution::Failed { seq, error }
            }
            Err(error) => {
                crate::debug!("dispatch"; "{} failed but was superseded: {}", seq, error);
                Resolution::Stale { seq }
            }
        }
    }

    pub fn latest_issued(&self) -> Option<SeqId> {
        self.latest_issued
    }

    pub fn highest_accepted(&self) -> Option<SeqId> {
        self.highest_accepted
    }

    /// Number of requests still awaiting a response.
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }
}

/// Run `request` on the compiler in the background and post the response.
///
/// The task is detached: nothing cancels a dispatched compile. Superseded
/// responses are filtered by [`CompileDispatcher::resolve`] instead.
pub fn spawn_compile(
    compiler: Arc<dyn Compiler>,
    request: CompileRequest,
    tx: mpsc::Sender<CompileResponse>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let CompileRequest { seq, text } = request;
        let result = compiler.compile(&text).await;
        // Receiver gone means the session ended; the result is moot.
        let _ = tx.send(CompileResponse { seq, result }).await;
    })
}
