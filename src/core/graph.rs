use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

/// Workflow graph metadata returned by `GET /graph/`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    #[serde(default)]
    pub mermaid: Option<String>,
    #[serde(default)]
    pub png_base64: Option<String>,
}

/// Renderings a graph snapshot can offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphView {
    Diagram,
    Image,
}

impl GraphSnapshot {
    pub fn views(&self) -> Vec<GraphView> {
        let mut views = Vec::new();
        if self.mermaid.as_deref().is_some_and(|m| !m.trim().is_empty()) {
            views.push(GraphView::Diagram);
        }
        if self.png_base64.as_deref().is_some_and(|p| !p.is_empty()) {
            views.push(GraphView::Image);
        }
        views
    }

    /// Decoded PNG bytes, if the backend rendered an image.
    pub fn png_bytes(&self) -> Option<Result<Vec<u8>, base64::DecodeError>> {
        self.png_base64
            .as_deref()
            .filter(|p| !p.is_empty())
            .map(|p| STANDARD.decode(p.trim()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub agent_initialized: bool,
}
