#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use wearchat::{BackendGateway, Channel, ChatReply, GatewayError, GraphSnapshot, Message, Role, ToolCall};

#[derive(Default)]
struct BackendState {
    channels: Vec<Channel>,
    messages: HashMap<String, Vec<Message>>,
    next_id: u64,
    replies: VecDeque<(String, Vec<ToolCall>)>,
    failures: HashMap<&'static str, GatewayError>,
    graph: GraphSnapshot,
    calls: Vec<String>,
}

/// In-memory stand-in for the assistant backend.
///
/// Channel ids count up from "1". Failures are armed per operation name
/// and fire once.
#[derive(Default)]
pub struct FakeBackend {
    state: Mutex<BackendState>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_channels(names: &[&str]) -> Self {
        let backend = Self::new();
        {
            let mut state = backend.state.lock().unwrap();
            for name in names {
                state.next_id += 1;
                let id = state.next_id.to_string();
                state.channels.push(channel(&id, name));
            }
        }
        backend
    }

    /// Make the next call of `operation` fail with `error`.
    pub fn fail_next(&self, operation: &'static str, error: GatewayError) {
        self.state.lock().unwrap().failures.insert(operation, error);
    }

    pub fn queue_reply(&self, content: &str, tool_calls: Vec<ToolCall>) {
        self.state
            .lock()
            .unwrap()
            .replies
            .push_back((content.to_string(), tool_calls));
    }

    pub fn set_graph(&self, graph: GraphSnapshot) {
        self.state.lock().unwrap().graph = graph;
    }

    pub fn set_history(&self, channel_id: &str, messages: Vec<Message>) {
        self.state
            .lock()
            .unwrap()
            .messages
            .insert(channel_id.to_string(), messages);
    }

    /// Remove a channel behind the client's back.
    pub fn drop_channel(&self, channel_id: &str) {
        self.state
            .lock()
            .unwrap()
            .channels
            .retain(|c| c.id != channel_id);
    }

    pub fn history(&self, channel_id: &str) -> Vec<Message> {
        self.state
            .lock()
            .unwrap()
            .messages
            .get(channel_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    fn begin(&self, operation: &'static str) -> Result<std::sync::MutexGuard<'_, BackendState>, GatewayError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(operation.to_string());
        match state.failures.remove(operation) {
            Some(error) => Err(error),
            None => Ok(state),
        }
    }
}

pub fn channel(id: &str, name: &str) -> Channel {
    Channel {
        id: id.to_string(),
        name: name.to_string(),
        message_count: 0,
        created_at: None,
    }
}

pub fn message(id: &str, role: Role, content: &str) -> Message {
    Message {
        id: id.to_string(),
        role,
        content: content.to_string(),
        timestamp: Some("2024-05-01T10:00:00".to_string()),
        tool_calls: None,
    }
}

pub fn network_down() -> GatewayError {
    GatewayError::Network("connection refused".to_string())
}

fn not_found(what: &str) -> GatewayError {
    GatewayError::rejected(404, format!("{} not found", what))
}

#[async_trait]
impl BackendGateway for FakeBackend {
    async fn list_channels(&self) -> Result<Vec<Channel>, GatewayError> {
        let state = self.begin("list_channels")?;
        Ok(state.channels.clone())
    }

    async fn create_channel(&self, name: &str) -> Result<Channel, GatewayError> {
        let mut state = self.begin("create_channel")?;
        state.next_id += 1;
        let created = channel(&state.next_id.to_string(), name);
        state.channels.push(created.clone());
        Ok(created)
    }

    async fn get_channel(&self, channel_id: &str) -> Result<Channel, GatewayError> {
        let state = self.begin("get_channel")?;
        state
            .channels
            .iter()
            .find(|c| c.id == channel_id)
            .cloned()
            .ok_or_else(|| not_found("Channel"))
    }

    async fn delete_channel(&self, channel_id: &str) -> Result<(), GatewayError> {
        let mut state = self.begin("delete_channel")?;
        let before = state.channels.len();
        state.channels.retain(|c| c.id != channel_id);
        if state.channels.len() == before {
            return Err(not_found("Channel"));
        }
        state.messages.remove(channel_id);
        Ok(())
    }

    async fn send_chat_message(
        &self,
        channel_id: &str,
        content: &str,
    ) -> Result<ChatReply, GatewayError> {
        let mut state = self.begin("send_chat_message")?;
        if !state.channels.iter().any(|c| c.id == channel_id) {
            return Err(not_found("Channel"));
        }

        let (reply, tool_calls) = state
            .replies
            .pop_front()
            .unwrap_or_else(|| (format!("echo: {}", content), Vec::new()));

        state.next_id += 1;
        let user = message(&format!("u{}", state.next_id), Role::User, content);
        let assistant = message(&format!("a{}", state.next_id), Role::Assistant, &reply);

        let history = state.messages.entry(channel_id.to_string()).or_default();
        history.push(user);
        history.push(assistant.clone());
        let count = history.len() as u64;
        if let Some(c) = state.channels.iter_mut().find(|c| c.id == channel_id) {
            c.message_count = count;
        }

        Ok(ChatReply {
            message: assistant,
            tool_calls,
        })
    }

    async fn get_history(&self, channel_id: &str) -> Result<Vec<Message>, GatewayError> {
        let state = self.begin("get_history")?;
        Ok(state.messages.get(channel_id).cloned().unwrap_or_default())
    }

    async fn clear_history(&self, channel_id: &str) -> Result<(), GatewayError> {
        let mut state = self.begin("clear_history")?;
        state.messages.remove(channel_id);
        Ok(())
    }

    async fn get_graph(&self) -> Result<GraphSnapshot, GatewayError> {
        let state = self.begin("get_graph")?;
        Ok(state.graph.clone())
    }
}
