//! Configuration section definitions.

mod compiler;
mod output;
mod preview;

pub use compiler::CompilerConfig;
pub use output::OutputConfig;
pub use preview::PreviewConfig;
