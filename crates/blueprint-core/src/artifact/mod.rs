//! Generated artifacts and the helpers that turn assistant output into
//! something displayable.

mod extract;
mod renderer;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use extract::{DIAGRAM_CLOSE, DIAGRAM_OPEN, extract_diagram, strip_code_fence};
pub use renderer::{ArtifactRenderer, DEFAULT_VIEWER_BASE, decode_diagram_url, png_url};

/// Which document an artifact holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    Prd,
    Diagram,
    Sdd,
}

impl ArtifactKind {
    /// File name used when the artifact is saved locally.
    pub fn file_name(&self) -> &'static str {
        match self {
            ArtifactKind::Prd => "PRD.md",
            ArtifactKind::Diagram => "architecture.puml",
            ArtifactKind::Sdd => "SDD.md",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ArtifactKind::Prd => "PRD",
            ArtifactKind::Diagram => "Diagram",
            ArtifactKind::Sdd => "SDD",
        };
        f.write_str(s)
    }
}

/// A generated document or diagram source.
///
/// Regeneration replaces the whole value; nothing updates it in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedArtifact {
    pub kind: ArtifactKind,
    pub content: String,
}

impl GeneratedArtifact {
    pub fn new(kind: ArtifactKind, content: impl Into<String>) -> Self {
        Self {
            kind,
            content: content.into(),
        }
    }
}
