//! Saving generated artifacts to disk (the terminal's "download").

use std::path::{Path, PathBuf};

use blueprint_core::Result;
use blueprint_core::artifact::GeneratedArtifact;

pub const DIAGRAM_PNG_FILE: &str = "architecture.png";

/// Writes artifacts into an output directory, creating it if needed.
#[derive(Debug, Clone)]
pub struct ArtifactExporter {
    output_dir: PathBuf,
}

impl ArtifactExporter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Writes the artifact as UTF-8 under its kind's file name and returns
    /// the written path. An existing file is overwritten.
    pub async fn export(&self, artifact: &GeneratedArtifact) -> Result<PathBuf> {
        let path = self.output_dir.join(artifact.kind.file_name());
        self.write(&path, artifact.content.as_bytes()).await?;
        tracing::info!("[Export] Wrote {} to {}", artifact.kind, path.display());
        Ok(path)
    }

    /// Saves a rendered diagram image.
    pub async fn save_png(&self, bytes: &[u8]) -> Result<PathBuf> {
        let path = self.output_dir.join(DIAGRAM_PNG_FILE);
        self.write(&path, bytes).await?;
        tracing::info!("[Export] Wrote diagram image to {}", path.display());
        Ok(path)
    }

    async fn write(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        tokio::fs::create_dir_all(&self.output_dir).await?;
        tokio::fs::write(path, bytes).await?;
        Ok(())
    }
}
