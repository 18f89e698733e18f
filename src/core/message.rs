use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::null_as_default;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// Record of an auxiliary action the assistant took while producing a reply.
/// Opaque to the client: carried along, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub tool_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub arguments: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub id: String,
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
}

impl Message {
    /// A locally composed user message that has not been confirmed yet.
    pub fn pending_user(id: String, content: &str) -> Self {
        Self {
            id,
            role: Role::User,
            content: content.to_string(),
            timestamp: Some(chrono::Utc::now().to_rfc3339()),
            tool_calls: None,
        }
    }

    pub fn tool_calls(&self) -> &[ToolCall] {
        self.tool_calls.as_deref().unwrap_or(&[])
    }
}

/// Response to `POST /chat/message`: the assistant reply plus the tools it used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    pub message: Message,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tool_calls: Vec<ToolCall>,
}

impl ChatReply {
    /// Merge the top-level tool calls into the assistant message.
    /// The message keeps its own tool calls when the reply carries none.
    pub fn into_message(self) -> Message {
        let ChatReply {
            mut message,
            tool_calls,
        } = self;
        if !tool_calls.is_empty() {
            message.tool_calls = Some(tool_calls);
        }
        message
    }
}
