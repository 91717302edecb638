//! Image files on the local disk as attachment sources.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use blueprint_core::Result;
use blueprint_core::attachment::AttachmentSource;

/// A file picked by the user. The MIME type is guessed from the extension.
#[derive(Debug, Clone)]
pub struct LocalImageFile {
    path: PathBuf,
    name: String,
    mime_type: String,
}

impl LocalImageFile {
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let mime_type = mime_guess::from_path(&path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        Self {
            path,
            name,
            mime_type,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl AttachmentSource for LocalImageFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn mime_type(&self) -> &str {
        &self.mime_type
    }

    async fn read_bytes(&self) -> Result<Vec<u8>> {
        Ok(tokio::fs::read(&self.path).await?)
    }
}

/// Reads a text file supplied as SDD input.
pub async fn read_text_file(path: &Path) -> Result<String> {
    Ok(tokio::fs::read_to_string(path).await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_is_guessed_from_extension() {
        assert_eq!(LocalImageFile::new("/tmp/shot.PNG").mime_type(), "image/png");
        assert_eq!(LocalImageFile::new("photo.jpeg").mime_type(), "image/jpeg");
        assert_eq!(LocalImageFile::new("notes.txt").mime_type(), "text/plain");
        assert_eq!(
            LocalImageFile::new("no_extension").mime_type(),
            "application/octet-stream"
        );
    }

    #[test]
    fn test_name_is_file_name() {
        assert_eq!(LocalImageFile::new("/a/b/mock.gif").name(), "mock.gif");
    }
}
