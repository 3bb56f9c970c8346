//! Actor System for Live Preview
//!
//! Message-passing concurrency for watch mode:
//!
//! ```text
//! FsActor --> PreviewActor --> Compiler (detached tasks)
//! (watch)     (orchestrate)  \-> Renderer
//! ```
//!
//! # Module Structure
//!
//! - `messages` - Message types for inter-actor communication
//! - `fs` - Source file watcher (edit surface)
//! - `preview` - Runs the orchestration core
//! - `coordinator` - Wires up and runs actors

pub mod coordinator;
pub mod fs;
pub mod messages;
pub mod preview;

pub use coordinator::Coordinator;
pub use preview::{PreviewActor, PreviewHandle};
