//! Actor Message Definitions
//!
//! ```text
//! FsActor --TextChanged--> PreviewActor --show--> Renderer
//! ```

/// Messages to the Preview Actor (edit surface events and control).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditMsg {
    /// Full source text after an edit
    TextChanged(String),
    /// Compile immediately, skipping the quiet period
    CompileNow,
    /// Shutdown
    Shutdown,
}
