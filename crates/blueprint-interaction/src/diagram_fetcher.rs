//! Downloads rendered diagrams from the PlantUML server.

use reqwest::Client;

use blueprint_core::artifact::png_url;
use blueprint_core::{BlueprintError, Result};

/// Fetches the PNG variant of a diagram viewer URL.
#[derive(Clone, Default)]
pub struct DiagramFetcher {
    client: Client,
}

impl DiagramFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Downloads the PNG for an SVG viewer URL.
    pub async fn fetch_png(&self, svg_url: &str) -> Result<Vec<u8>> {
        if svg_url.is_empty() {
            return Err(BlueprintError::invalid_input("no diagram to fetch"));
        }
        let url = png_url(svg_url);
        tracing::debug!("[Diagram] Fetching {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| BlueprintError::delivery(None, format!("Diagram request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BlueprintError::delivery(
                Some(status.as_u16()),
                format!("Diagram server returned {status}"),
            ));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| BlueprintError::delivery(None, format!("Failed to read diagram: {e}")))?;
        Ok(bytes.to_vec())
    }
}
