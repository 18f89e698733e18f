use async_trait::async_trait;

use crate::core::{Channel, ChatReply, GraphSnapshot, Message};
use crate::error::GatewayError;

/// Request/response contract of the backend agent service.
///
/// Implementations fold every transport-level failure into a
/// [`GatewayError`]; callers only see a decoded payload or a failure.
/// Absent or null collections in a payload decode as empty.
#[async_trait]
pub trait BackendGateway: Send + Sync {
    async fn list_channels(&self) -> Result<Vec<Channel>, GatewayError>;

    async fn create_channel(&self, name: &str) -> Result<Channel, GatewayError>;

    async fn get_channel(&self, channel_id: &str) -> Result<Channel, GatewayError>;

    async fn delete_channel(&self, channel_id: &str) -> Result<(), GatewayError>;

    async fn send_chat_message(
        &self,
        channel_id: &str,
        content: &str,
    ) -> Result<ChatReply, GatewayError>;

    async fn get_history(&self, channel_id: &str) -> Result<Vec<Message>, GatewayError>;

    async fn clear_history(&self, channel_id: &str) -> Result<(), GatewayError>;

    async fn get_graph(&self) -> Result<GraphSnapshot, GatewayError>;
}
