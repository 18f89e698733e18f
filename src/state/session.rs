use std::sync::Arc;
use uuid::Uuid;

use crate::client::BackendGateway;
use crate::core::{ChatReply, Message};
use crate::error::GatewayError;

/// Hands out ids for unconfirmed messages. The per-session uuid keeps ids
/// from two sessions apart; the counter keeps them apart within one.
#[derive(Debug)]
struct TempIdGenerator {
    scope: Uuid,
    next: u64,
}

impl TempIdGenerator {
    fn new() -> Self {
        Self {
            scope: Uuid::new_v4(),
            next: 0,
        }
    }

    fn next_id(&mut self) -> String {
        self.next += 1;
        format!("local-{}-{}", self.scope.simple(), self.next)
    }
}

/// Ticket for a send whose optimistic message is already in the history.
/// Hand it back to [`ChatSession::finish_send`] with the backend's answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSend {
    pub channel_id: String,
    pub temp_id: String,
    pub content: String,
}

/// Message history of one channel at a time.
///
/// The channel id is passed in on every call. When it differs from the one
/// seen last, the in-memory history is dropped before anything else happens.
pub struct ChatSession {
    gateway: Arc<dyn BackendGateway>,
    channel_id: Option<String>,
    messages: Vec<Message>,
    loading: bool,
    error: Option<String>,
    in_flight: Option<String>,
    temp_ids: TempIdGenerator,
}

impl ChatSession {
    pub fn new(gateway: Arc<dyn BackendGateway>) -> Self {
        Self {
            gateway,
            channel_id: None,
            messages: Vec::new(),
            loading: false,
            error: None,
            in_flight: None,
            temp_ids: TempIdGenerator::new(),
        }
    }

    pub fn channel_id(&self) -> Option<&str> {
        self.channel_id.as_deref()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Whether a send is waiting on the backend.
    pub fn is_sending(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Point the session at `channel_id`, discarding state that belonged
    /// to a different channel.
    pub fn rescope(&mut self, channel_id: Option<&str>) {
        if self.channel_id.as_deref() == channel_id {
            return;
        }
        tracing::debug!(
            "Chat session moving from {:?} to {:?}",
            self.channel_id,
            channel_id
        );
        self.channel_id = channel_id.map(str::to_string);
        self.messages.clear();
        self.loading = false;
        self.error = None;
        self.in_flight = None;
    }

    /// First half of a send: append the user's message right away and
    /// return the ticket for the request.
    ///
    /// Returns `None` without touching state when the content is blank,
    /// there is no channel, or another send is still in flight.
    pub fn begin_send(&mut self, channel_id: Option<&str>, content: &str) -> Option<PendingSend> {
        self.rescope(channel_id);
        let channel_id = self.channel_id.clone()?;
        if content.trim().is_empty() {
            return None;
        }
        if let Some(temp_id) = &self.in_flight {
            tracing::debug!("Send rejected, {} is still in flight", temp_id);
            return None;
        }

        let temp_id = self.temp_ids.next_id();
        self.messages
            .push(Message::pending_user(temp_id.clone(), content));
        self.loading = true;
        self.error = None;
        self.in_flight = Some(temp_id.clone());

        Some(PendingSend {
            channel_id,
            temp_id,
            content: content.to_string(),
        })
    }

    /// Second half of a send. On success the assistant reply is appended
    /// after the user's message; on failure exactly that message is removed.
    ///
    /// Only the send currently in flight is applied. Tickets from a channel
    /// the session has since left, or from before a rescope, are dropped.
    /// Returns whether the result was applied.
    pub fn finish_send(
        &mut self,
        pending: PendingSend,
        result: Result<ChatReply, GatewayError>,
    ) -> bool {
        let current = self.channel_id.as_deref() == Some(pending.channel_id.as_str())
            && self.in_flight.as_deref() == Some(pending.temp_id.as_str());
        if !current {
            tracing::debug!(
                "Ignoring stale reply for {} on channel {}, session is on {:?}",
                pending.temp_id,
                pending.channel_id,
                self.channel_id
            );
            return false;
        }

        self.in_flight = None;
        self.loading = false;

        match result {
            Ok(reply) => {
                self.messages.push(reply.into_message());
            }
            Err(e) => {
                tracing::warn!("Failed to send message: {}", e);
                self.messages.retain(|message| message.id != pending.temp_id);
                self.error = Some(e.to_string());
            }
        }
        true
    }

    /// Send `content` to `channel_id` and wait for the reply.
    /// Returns `true` when an assistant reply was appended.
    pub async fn send_message(&mut self, channel_id: Option<&str>, content: &str) -> bool {
        let Some(pending) = self.begin_send(channel_id, content) else {
            return false;
        };

        let result = self
            .gateway
            .send_chat_message(&pending.channel_id, &pending.content)
            .await;
        let succeeded = result.is_ok();
        self.finish_send(pending, result) && succeeded
    }

    /// Replace the history with the backend's copy of it. On failure the
    /// current history stays and the error is recorded.
    pub async fn load_history(&mut self, channel_id: Option<&str>) {
        self.rescope(channel_id);
        let Some(channel_id) = self.channel_id.clone() else {
            return;
        };

        self.loading = true;
        self.error = None;

        match self.gateway.get_history(&channel_id).await {
            Ok(messages) => {
                tracing::debug!(
                    "Loaded {} messages for channel {}",
                    messages.len(),
                    channel_id
                );
                self.messages = messages;
            }
            Err(e) => {
                tracing::warn!("Failed to load history for {}: {}", channel_id, e);
                self.error = Some(e.to_string());
            }
        }

        self.loading = false;
    }

    /// Clear the history on the backend, then locally. A failed clear
    /// leaves the visible history alone and reports the error.
    pub async fn clear_history(&mut self, channel_id: Option<&str>) -> Result<(), GatewayError> {
        self.rescope(channel_id);
        let Some(channel_id) = self.channel_id.clone() else {
            return Ok(());
        };

        match self.gateway.clear_history(&channel_id).await {
            Ok(()) => {
                tracing::info!("Cleared history of channel {}", channel_id);
                self.messages.clear();
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Failed to clear history for {}: {}", channel_id, e);
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }
}
