// Wearchat Library
// Multi-channel chat client that keeps local channel and message state in sync with the assistant backend

pub mod cli;
pub mod client;
pub mod core;
pub mod error;
pub mod state;

// Re-export commonly used types
pub use client::{BackendClient, BackendGateway};
pub use core::{Channel, ChatReply, Config, GraphSnapshot, Message, Role, ToolCall};
pub use error::GatewayError;
pub use state::{ChannelDirectory, ChatSession, PendingSend, WorkflowGraph};

// Error handling
pub use anyhow::{Error, Result};
