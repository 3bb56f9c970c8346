//! Renderer that publishes the live document to a file.
//!
//! A PDF viewer with auto-reload pointed at the output path acts as the
//! actual page painter. The file is replaced atomically so the viewer never
//! sees a half-written document.

use std::io::Write;
use std::num::NonZeroU32;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tempfile::NamedTempFile;

use crate::preview::{DisplayResource, Renderer};

#[derive(Debug)]
pub struct PdfFileRenderer {
    path: PathBuf,
}

impl PdfFileRenderer {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn write_atomic(&self, bytes: &[u8]) -> Result<()> {
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;

        let mut file = NamedTempFile::new_in(dir)
            .with_context(|| format!("failed to create temp file in {}", dir.display()))?;
        file.write_all(bytes)?;
        file.flush()?;
        file.persist(&self.path)
            .with_context(|| format!("failed to write {}", self.path.display()))?;
        Ok(())
    }
}

impl Renderer for PdfFileRenderer {
    fn show(&mut self, resource: &DisplayResource, page: NonZeroU32) -> Result<()> {
        self.write_atomic(resource.bytes())?;
        crate::logger::status_success(&format!(
            "page {} of {} -> {} ({} bytes)",
            page,
            resource.id(),
            self.path.display(),
            resource.len()
        ));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preview::{PREVIEW_PAGE, ResourceManager};
    use tempfile::TempDir;

    #[test]
    fn test_show_writes_live_bytes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out").join("preview.pdf");
        let mut renderer = PdfFileRenderer::new(path.clone());
        let mut resources = ResourceManager::new();

        renderer
            .show(resources.install(b"%PDF-1".to_vec()), PREVIEW_PAGE)
            .unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"%PDF-1");

        renderer
            .show(resources.install(b"%PDF-2".to_vec()), PREVIEW_PAGE)
            .unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"%PDF-2");

        // No temp files left behind
        let entries = std::fs::read_dir(path.parent().unwrap()).unwrap().count();
        assert_eq!(entries, 1);
    }
}
