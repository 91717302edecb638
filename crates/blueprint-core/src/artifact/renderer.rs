use std::io::{Read, Write};

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE;
use flate2::Compression;
use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;
use pulldown_cmark::{Event, Options, Parser, html};

/// Public PlantUML server.
pub const DEFAULT_VIEWER_BASE: &str = "https://www.plantuml.com";

/// Marks the payload as base64 (rather than PlantUML's own alphabet).
const BASE64_MARKER: &str = "~1";

/// Turns Markdown into HTML and diagram source into viewer URLs.
#[derive(Debug, Clone)]
pub struct ArtifactRenderer {
    viewer_base: String,
}

impl Default for ArtifactRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_VIEWER_BASE)
    }
}

impl ArtifactRenderer {
    pub fn new(viewer_base: impl Into<String>) -> Self {
        Self {
            viewer_base: viewer_base.into().trim_end_matches('/').to_string(),
        }
    }

    /// Renders Markdown to HTML.
    ///
    /// Raw HTML in the input is emitted as escaped text. If rendering panics
    /// the escaped source is returned inside a `<pre>` block instead.
    pub fn to_html(markdown: &str) -> String {
        std::panic::catch_unwind(|| render_markdown(markdown)).unwrap_or_else(|_| {
            tracing::warn!("[Renderer] Markdown rendering failed, showing raw text");
            format!("<pre>{}</pre>", escape_html(markdown))
        })
    }

    /// Builds the SVG viewer URL for a diagram source.
    ///
    /// Returns an empty string for blank input or when compression fails.
    pub fn to_diagram_url(&self, source: &str) -> String {
        if source.trim().is_empty() {
            return String::new();
        }
        match compress(source) {
            Ok(bytes) => format!(
                "{}/plantuml/svg/{}{}",
                self.viewer_base,
                BASE64_MARKER,
                URL_SAFE.encode(bytes)
            ),
            Err(e) => {
                tracing::warn!("[Renderer] Failed to encode diagram: {}", e);
                String::new()
            }
        }
    }
}

fn render_markdown(markdown: &str) -> String {
    let options =
        Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS;
    let events = Parser::new_ext(markdown, options).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        other => other,
    });
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, events);
    out
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn compress(source: &str) -> std::io::Result<Vec<u8>> {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(source.as_bytes())?;
    encoder.finish()
}

/// Recovers the diagram source from a URL built by
/// [`ArtifactRenderer::to_diagram_url`] (SVG or PNG variant).
pub fn decode_diagram_url(url: &str) -> Option<String> {
    let (_, payload) = url
        .rsplit_once("/plantuml/svg/")
        .or_else(|| url.rsplit_once("/plantuml/png/"))?;
    let payload = payload.strip_prefix(BASE64_MARKER)?;
    let bytes = URL_SAFE.decode(payload).ok()?;
    let mut source = String::new();
    DeflateDecoder::new(bytes.as_slice())
        .read_to_string(&mut source)
        .ok()?;
    Some(source)
}

/// Rewrites an SVG viewer URL into its PNG counterpart.
pub fn png_url(svg_url: &str) -> String {
    svg_url.replacen("/plantuml/svg/", "/plantuml/png/", 1)
}
