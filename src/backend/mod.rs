//! Concrete collaborators wired into the preview core.
//!
//! - `latexmk` - [`Compiler`](crate::preview::Compiler) backed by `latexmk -pdf`
//! - `pdf_file` - [`Renderer`](crate::preview::Renderer) that publishes the PDF to disk

mod latexmk;
mod pdf_file;

pub use latexmk::LatexmkCompiler;
pub use pdf_file::PdfFileRenderer;
