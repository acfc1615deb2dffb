//! Rendering adapter
//!
//! Wraps assembled Mermaid text in a self-contained HTML document that loads
//! the renderer from the CDN and renders client-side. The adapter performs
//! no validation: a parse failure shows up inline in the document, never as
//! an error here. Export buttons (SVG and PNG) act only once the initial
//! render succeeds.

use base64::{engine::general_purpose::URL_SAFE, Engine as _};
use serde::Serialize;

// Fixed, versioned shell asset. The script inside is not generated per call;
// only the diagram text, theme, and height hint are injected.
const RENDER_SHELL: &str = include_str!("render/shell.html");

/// Presentation hints for the rendered document.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Mermaid theme name, e.g. "dark" or "default".
    pub theme: String,
    /// Minimum pixel height of the diagram container.
    pub height_px: u32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            theme: "dark".to_string(),
            height_px: 500,
        }
    }
}

/// Build a standalone HTML document rendering the given Mermaid text.
pub fn render_document(diagram_text: &str, options: &RenderOptions) -> String {
    // JSON string literals are valid JS string literals, so this is safe to
    // splice into the script regardless of quotes or newlines in the text.
    let code_literal = serde_json::Value::String(diagram_text.to_string()).to_string();
    let theme_literal = serde_json::Value::String(options.theme.clone()).to_string();

    RENDER_SHELL
        .replace("__DIAGRAM_CODE__", &code_literal)
        .replace("__THEME__", &theme_literal)
        .replace("__HEIGHT__", &options.height_px.to_string())
}

/// Externally hosted preview links for a diagram.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreviewLinks {
    pub preview_url: String,
    pub edit_url: String,
}

/// Encode the diagram text into mermaid.ink / mermaid.live links.
///
/// No server-side rendering happens; the hosted services decode the text
/// themselves.
pub fn preview_links(diagram_text: &str) -> PreviewLinks {
    let encoded = URL_SAFE.encode(diagram_text.as_bytes());
    PreviewLinks {
        preview_url: format!("https://mermaid.ink/img/{}", encoded),
        edit_url: format!("https://mermaid.live/edit#base64:{}", encoded),
    }
}
