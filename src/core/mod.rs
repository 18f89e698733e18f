pub mod channel;
pub mod config;
pub mod graph;
pub mod message;

pub use channel::Channel;
pub use config::Config;
pub use graph::{GraphSnapshot, GraphView, HealthStatus};
pub use message::{ChatReply, Message, Role, ToolCall};

use serde::{Deserialize, Deserializer};

/// Deserialize a field that the backend may send as `null`, falling back to
/// the type's default. Combine with `#[serde(default)]` to also cover absence.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
