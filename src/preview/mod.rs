//! Live-Compilation Orchestration Core
//!
//! Decides when edited text is compiled, filters out-of-order responses,
//! and owns the displayable resource shown by the renderer.
//!
//! ```text
//! TextChanged --> Debouncer --> CompileDispatcher --request--> Compiler
//!                                      ^                          |
//!                                      +-------- response --------+
//!                                      |
//!                              ResultDecoder --> ResourceManager --> Renderer
//! ```
//!
//! # Module Structure
//!
//! - `debouncer` - Single quiet-period deadline
//! - `dispatcher` - Sequence numbering and stale-response filtering
//! - `decoder` - Base64 payload decoding
//! - `resource` - Display resource lifetime (one live at a time)
//! - `state` - `Orchestrator` state machine gluing the above together
//!
//! Nothing in here spawns or sleeps on its own except [`spawn_compile`];
//! the runtime loop lives in `actor::preview`.

mod debouncer;
mod decoder;
mod dispatcher;
mod resource;
mod state;


use std::fmt;
use std::num::NonZeroU32;

use async_trait::async_trait;
use thiserror::Error;

pub use debouncer::{DEFAULT_QUIET_PERIOD, Debouncer};
pub use decoder::decode;
pub use dispatcher::{CompileDispatcher, Resolution, spawn_compile};
pub use resource::{DisplayResource, ResourceId, ResourceManager, ResourceStats};
pub use state::{Orchestrator, Phase, PreviewSnapshot, Update};

/// The renderer is only ever asked for the first page.
pub const PREVIEW_PAGE: NonZeroU32 = NonZeroU32::MIN;

// =============================================================================
// Requests
// =============================================================================

/// Monotonic compile request identifier, unique for the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SeqId(u64);

impl SeqId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for SeqId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Snapshot of the source text taken when the quiet period elapsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileRequest {
    pub seq: SeqId,
    pub text: String,
}

/// Compiler answer correlated back to the request that produced it.
#[derive(Debug, Clone)]
pub struct CompileResponse {
    pub seq: SeqId,
    /// Base64-encoded document on success
    pub result: Result<String, CompileError>,
}

// =============================================================================
// Errors
// =============================================================================

/// Error reported by the compiler itself (syntax errors, missing packages...).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct CompileError {
    message: String,
}

impl CompileError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Failure causes surfaced through [`Phase::Failed`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreviewError {
    /// Compiler output could not be decoded into bytes
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    /// Compiler reported an error for the source
    #[error(transparent)]
    CompileFailure(#[from] CompileError),

    /// Renderer could not present the installed resource
    #[error("render failed: {0}")]
    RenderFailure(String),
}

// =============================================================================
// Collaborators
// =============================================================================

/// Maps document source to a base64-encoded binary document.
#[async_trait]
pub trait Compiler: Send + Sync + 'static {
    async fn compile(&self, source: &str) -> Result<String, CompileError>;
}

/// Presents a display resource. Only borrows it for the duration of the call.
pub trait Renderer: Send {
    fn show(&mut self, resource: &DisplayResource, page: NonZeroU32) -> anyhow::Result<()>;
}
