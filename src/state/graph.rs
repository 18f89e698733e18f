use std::sync::Arc;

use crate::client::BackendGateway;
use crate::core::{GraphSnapshot, GraphView};

/// Last fetched workflow graph of the backend agent.
pub struct WorkflowGraph {
    gateway: Arc<dyn BackendGateway>,
    snapshot: Option<GraphSnapshot>,
    loading: bool,
    error: Option<String>,
}

impl WorkflowGraph {
    pub fn new(gateway: Arc<dyn BackendGateway>) -> Self {
        Self {
            gateway,
            snapshot: None,
            loading: false,
            error: None,
        }
    }

    pub fn snapshot(&self) -> Option<&GraphSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn views(&self) -> Vec<GraphView> {
        self.snapshot
            .as_ref()
            .map(GraphSnapshot::views)
            .unwrap_or_default()
    }

    /// Fetch the graph again. A failed fetch keeps the previous snapshot.
    pub async fn load(&mut self) {
        self.loading = true;
        self.error = None;

        match self.gateway.get_graph().await {
            Ok(snapshot) => self.snapshot = Some(snapshot),
            Err(e) => {
                tracing::warn!("Failed to load graph: {}", e);
                self.error = Some(e.to_string());
            }
        }

        self.loading = false;
    }
}
