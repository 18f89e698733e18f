use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use super::gateway::BackendGateway;
use crate::core::{null_as_default, Channel, ChatReply, Config, GraphSnapshot, HealthStatus, Message};
use crate::error::GatewayError;

/// HTTP/JSON implementation of [`BackendGateway`].
#[derive(Debug, Clone)]
pub struct BackendClient {
    base_url: Url,
    client: Client,
}

#[derive(Debug, Serialize)]
pub struct CreateChannelRequest<'a> {
    pub name: &'a str,
}

#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub channel_id: &'a str,
    pub message: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChannelListResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    channels: Vec<Channel>,
}

#[derive(Debug, Deserialize)]
struct HistoryResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    messages: Vec<Message>,
}

impl BackendClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url =
            Url::parse(base_url).map_err(|e| anyhow!("Invalid backend URL '{}': {}", base_url, e))?;
        if base_url.cannot_be_a_base() {
            return Err(anyhow!("Backend URL '{}' cannot carry a path", base_url));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| anyhow!("Failed to create HTTP client: {}", e))?;

        Ok(Self { base_url, client })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            &config.api_base_url(),
            Duration::from_secs(config.server.timeout_secs),
        )
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Check if the backend is up by hitting its health endpoint
    pub async fn is_backend_reachable(&self) -> bool {
        let Ok(url) = self.endpoint(&["health"]) else {
            return false;
        };
        self.client
            .get(url)
            .timeout(Duration::from_secs(2))
            .send()
            .await
            .map(|response| response.status().is_success())
            .unwrap_or(false)
    }

    pub async fn health(&self) -> Result<HealthStatus, GatewayError> {
        let url = self.endpoint(&["health"])?;
        self.fetch(self.client.get(url), "GET /health").await
    }

    /// Build an endpoint URL below the API base. A trailing empty segment
    /// yields a trailing slash, which the collection routes require.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, GatewayError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| GatewayError::Network(format!("invalid base URL {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Send a request and decode its JSON body.
    async fn fetch<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        what: &str,
    ) -> Result<T, GatewayError> {
        let response_text = self.execute(request, what).await?;
        serde_json::from_str(&response_text).map_err(|e| {
            tracing::warn!("{} returned an undecodable payload: {}", what, e);
            GatewayError::Malformed(format!("{}: {}", what, e))
        })
    }

    /// Send a request whose body, if any, is irrelevant.
    async fn execute_unit(&self, request: RequestBuilder, what: &str) -> Result<(), GatewayError> {
        self.execute(request, what).await.map(|_| ())
    }

    async fn execute(&self, request: RequestBuilder, what: &str) -> Result<String, GatewayError> {
        tracing::debug!("Making request: {}", what);

        let response = request.send().await.map_err(|e| {
            tracing::warn!("{} failed: {}", what, e);
            GatewayError::from(e)
        })?;

        let status = response.status();
        tracing::debug!("{} response status: {}", what, status);

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            let message = extract_error_detail(&error_text);
            tracing::error!("{} failed with status {}: {}", what, status, message);
            return Err(GatewayError::rejected(status.as_u16(), message));
        }

        Ok(response.text().await?)
    }
}

/// Pull the human-readable part out of an error body. The backend reports
/// errors as `{"detail": "..."}`; validation errors carry a structured detail.
fn extract_error_detail(body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        return "Unknown error".to_string();
    }
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(serde_json::Value::Object(map)) => match map.get("detail") {
            Some(serde_json::Value::String(detail)) => detail.clone(),
            Some(detail) => detail.to_string(),
            None => body.to_string(),
        },
        _ => body.to_string(),
    }
}

#[async_trait]
impl BackendGateway for BackendClient {
    async fn list_channels(&self) -> Result<Vec<Channel>, GatewayError> {
        let url = self.endpoint(&["channels", ""])?;
        let list: ChannelListResponse = self.fetch(self.client.get(url), "GET /channels/").await?;
        Ok(list.channels)
    }

    async fn create_channel(&self, name: &str) -> Result<Channel, GatewayError> {
        let url = self.endpoint(&["channels", ""])?;
        let request = CreateChannelRequest { name };
        tracing::debug!("POST /channels/ request body: {:?}", request);

        let channel: Channel = self
            .fetch(self.client.post(url).json(&request), "POST /channels/")
            .await?;
        tracing::debug!("Created channel: {:?}", channel);
        Ok(channel)
    }

    async fn get_channel(&self, channel_id: &str) -> Result<Channel, GatewayError> {
        let url = self.endpoint(&["channels", channel_id])?;
        self.fetch(self.client.get(url), "GET /channels/{id}").await
    }

    async fn delete_channel(&self, channel_id: &str) -> Result<(), GatewayError> {
        let url = self.endpoint(&["channels", channel_id])?;
        self.execute_unit(self.client.delete(url), "DELETE /channels/{id}")
            .await
    }

    async fn send_chat_message(
        &self,
        channel_id: &str,
        content: &str,
    ) -> Result<ChatReply, GatewayError> {
        let url = self.endpoint(&["chat", "message"])?;
        let request = ChatRequest {
            channel_id,
            message: content,
        };
        tracing::debug!(
            "POST /chat/message for channel {} ({} chars)",
            channel_id,
            content.len()
        );

        self.fetch(self.client.post(url).json(&request), "POST /chat/message")
            .await
    }

    async fn get_history(&self, channel_id: &str) -> Result<Vec<Message>, GatewayError> {
        let url = self.endpoint(&["chat", "history", channel_id])?;
        let history: HistoryResponse = self
            .fetch(self.client.get(url), "GET /chat/history/{id}")
            .await?;
        Ok(history.messages)
    }

    async fn clear_history(&self, channel_id: &str) -> Result<(), GatewayError> {
        let url = self.endpoint(&["chat", "history", channel_id])?;
        self.execute_unit(self.client.delete(url), "DELETE /chat/history/{id}")
            .await
    }

    async fn get_graph(&self) -> Result<GraphSnapshot, GatewayError> {
        let url = self.endpoint(&["graph", ""])?;
        self.fetch(self.client.get(url), "GET /graph/").await
    }
}
