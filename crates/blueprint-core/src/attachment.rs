//! Image attachments and the pending-attachment collector.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use futures::stream::{FuturesUnordered, StreamExt};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// An image ready to be sent inline with a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageAttachment {
    /// MIME type, e.g. `image/png`.
    pub mime_type: String,
    /// Base64-encoded payload (no data URL prefix).
    pub data: String,
    /// `data:` URL usable as a preview.
    pub preview_url: String,
}

impl ImageAttachment {
    pub fn from_bytes(mime_type: impl Into<String>, bytes: &[u8]) -> Self {
        let mime_type = mime_type.into();
        let data = BASE64_STANDARD.encode(bytes);
        let preview_url = format!("data:{mime_type};base64,{data}");
        Self {
            mime_type,
            data,
            preview_url,
        }
    }
}

/// A file-like object the collector can decode.
///
/// Implemented for local files by the infrastructure layer and for pasted
/// clipboard data by [`InMemoryImage`].
#[async_trait]
pub trait AttachmentSource: Send + Sync {
    fn name(&self) -> &str;
    fn mime_type(&self) -> &str;
    async fn read_bytes(&self) -> Result<Vec<u8>>;
}

/// Image data already held in memory (e.g. pasted from the clipboard).
#[derive(Debug, Clone)]
pub struct InMemoryImage {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl InMemoryImage {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }
}

#[async_trait]
impl AttachmentSource for InMemoryImage {
    fn name(&self) -> &str {
        &self.name
    }

    fn mime_type(&self) -> &str {
        &self.mime_type
    }

    async fn read_bytes(&self) -> Result<Vec<u8>> {
        Ok(self.bytes.clone())
    }
}

fn is_image(mime_type: &str) -> bool {
    mime_type.to_ascii_lowercase().starts_with("image/")
}

/// Pending attachments for the next outgoing message.
///
/// Files are decoded concurrently and appended as each one finishes, so the
/// list is in completion order, not selection order.
#[derive(Debug, Default)]
pub struct AttachmentCollector {
    pending: Vec<ImageAttachment>,
}

impl AttachmentCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes every image source and appends it to the pending list.
    ///
    /// Non-image sources and sources that fail to read are dropped without
    /// an error. Returns how many attachments were added.
    pub async fn add_files<S, I>(&mut self, files: I) -> usize
    where
        S: AttachmentSource,
        I: IntoIterator<Item = S>,
    {
        let mut decoding: FuturesUnordered<_> = files
            .into_iter()
            .filter(|file| {
                let keep = is_image(file.mime_type());
                if !keep {
                    tracing::debug!(
                        "[Attachments] Skipping non-image file '{}' ({})",
                        file.name(),
                        file.mime_type()
                    );
                }
                keep
            })
            .map(|file| async move {
                let bytes = file.read_bytes().await;
                (file, bytes)
            })
            .collect();

        let mut added = 0;
        while let Some((file, bytes)) = decoding.next().await {
            match bytes {
                Ok(bytes) => {
                    self.pending
                        .push(ImageAttachment::from_bytes(file.mime_type(), &bytes));
                    added += 1;
                }
                Err(e) => {
                    tracing::warn!("[Attachments] Failed to read '{}': {}", file.name(), e);
                }
            }
        }
        added
    }

    /// Removes the attachment at `index`. Out-of-range indices are ignored.
    pub fn remove(&mut self, index: usize) -> Option<ImageAttachment> {
        if index < self.pending.len() {
            Some(self.pending.remove(index))
        } else {
            None
        }
    }

    /// Hands the whole pending list over and leaves the collector empty.
    pub fn take(&mut self) -> Vec<ImageAttachment> {
        std::mem::take(&mut self.pending)
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn pending(&self) -> &[ImageAttachment] {
        &self.pending
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::error::BlueprintError;

    struct FailingSource;

    #[async_trait]
    impl AttachmentSource for FailingSource {
        fn name(&self) -> &str {
            "broken.png"
        }

        fn mime_type(&self) -> &str {
            "image/png"
        }

        async fn read_bytes(&self) -> Result<Vec<u8>> {
            Err(BlueprintError::io("unreadable"))
        }
    }

    /// Finishes reading after a fixed delay.
    struct DelayedImage {
        mime_type: &'static str,
        delay_ms: u64,
    }

    #[async_trait]
    impl AttachmentSource for DelayedImage {
        fn name(&self) -> &str {
            "delayed"
        }

        fn mime_type(&self) -> &str {
            self.mime_type
        }

        async fn read_bytes(&self) -> Result<Vec<u8>> {
            tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
            Ok(vec![0])
        }
    }

    #[test]
    fn test_preview_url_is_data_url() {
        let attachment = ImageAttachment::from_bytes("image/png", b"abc");
        assert_eq!(attachment.data, "YWJj");
        assert_eq!(attachment.preview_url, "data:image/png;base64,YWJj");
    }

    #[tokio::test]
    async fn test_non_images_are_discarded() {
        let mut collector = AttachmentCollector::new();
        let added = collector
            .add_files(vec![
                InMemoryImage::new("a.png", "image/png", vec![1]),
                InMemoryImage::new("notes.txt", "text/plain", vec![2]),
                InMemoryImage::new("b.jpg", "IMAGE/JPEG", vec![3]),
            ])
            .await;

        assert_eq!(added, 2);
        assert_eq!(collector.len(), 2);
        assert!(collector.pending().iter().all(|a| a.mime_type != "text/plain"));
    }

    #[tokio::test]
    async fn test_read_failures_are_discarded() {
        let mut collector = AttachmentCollector::new();
        let added = collector.add_files(vec![FailingSource]).await;
        assert_eq!(added, 0);
        assert!(collector.is_empty());
    }

    #[tokio::test]
    async fn test_remove_keeps_other_attachments_intact() {
        let mut collector = AttachmentCollector::new();
        collector
            .add_files(vec![
                InMemoryImage::new("a.png", "image/png", vec![1]),
                InMemoryImage::new("b.png", "image/png", vec![2]),
                InMemoryImage::new("c.gif", "image/gif", vec![3]),
            ])
            .await;
        let before = collector.pending().to_vec();

        let removed = collector.remove(1);

        assert_eq!(removed.as_ref(), Some(&before[1]));
        assert_eq!(collector.pending(), &[before[0].clone(), before[2].clone()]);
    }

    #[test]
    fn test_remove_out_of_range_is_ignored() {
        let mut collector = AttachmentCollector::new();
        assert!(collector.remove(3).is_none());
    }

    #[tokio::test]
    async fn test_take_clears_pending() {
        let mut collector = AttachmentCollector::new();
        collector
            .add_files(vec![InMemoryImage::new("a.png", "image/png", vec![1])])
            .await;

        let taken = collector.take();
        assert_eq!(taken.len(), 1);
        assert!(collector.is_empty());
    }

    #[tokio::test]
    async fn test_attachments_are_appended_as_reads_complete() {
        let mut collector = AttachmentCollector::new();
        let added = collector
            .add_files(vec![
                DelayedImage {
                    mime_type: "image/png",
                    delay_ms: 60,
                },
                DelayedImage {
                    mime_type: "image/gif",
                    delay_ms: 0,
                },
                DelayedImage {
                    mime_type: "image/jpeg",
                    delay_ms: 20,
                },
            ])
            .await;

        assert_eq!(added, 3);
        let order: Vec<&str> = collector
            .pending()
            .iter()
            .map(|a| a.mime_type.as_str())
            .collect();
        assert_eq!(order, vec!["image/gif", "image/jpeg", "image/png"]);
    }
}
