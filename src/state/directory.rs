use std::sync::Arc;

use crate::client::BackendGateway;
use crate::core::Channel;
use crate::error::GatewayError;

/// Owns the channel list and which channel is active.
///
/// Writes wait for backend confirmation before touching local state, since
/// channel ids and message counts are assigned by the backend.
pub struct ChannelDirectory {
    gateway: Arc<dyn BackendGateway>,
    channels: Vec<Channel>,
    active_channel_id: Option<String>,
    loading: bool,
    error: Option<String>,
}

impl ChannelDirectory {
    pub fn new(gateway: Arc<dyn BackendGateway>) -> Self {
        Self {
            gateway,
            channels: Vec::new(),
            active_channel_id: None,
            loading: false,
            error: None,
        }
    }

    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    pub fn active_channel_id(&self) -> Option<&str> {
        self.active_channel_id.as_deref()
    }

    /// The active channel's record, if the active id is in the list.
    pub fn active_channel(&self) -> Option<&Channel> {
        self.active_channel_id
            .as_deref()
            .and_then(|id| self.get(id))
    }

    pub fn get(&self, channel_id: &str) -> Option<&Channel> {
        self.channels.iter().find(|channel| channel.id == channel_id)
    }

    /// Find a channel by id, asking the backend when it is not in the local
    /// list. The list itself is left as is; `refresh` owns its contents.
    pub async fn resolve(&self, channel_id: &str) -> Result<Channel, GatewayError> {
        if let Some(channel) = self.get(channel_id) {
            return Ok(channel.clone());
        }
        tracing::debug!("Channel {} not in the list, asking the backend", channel_id);
        self.gateway.get_channel(channel_id).await
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Replace the channel list with the backend's. Failures are recorded in
    /// [`error`](Self::error) and leave the previous list in place.
    ///
    /// An active channel is only picked when none is set; an active id that
    /// disappeared server-side is left as is.
    pub async fn refresh(&mut self) {
        self.loading = true;
        self.error = None;

        match self.gateway.list_channels().await {
            Ok(channels) => {
                tracing::debug!("Fetched {} channels", channels.len());
                self.channels = channels;
                if self.active_channel_id.is_none() {
                    if let Some(first) = self.channels.first() {
                        tracing::info!("Activating channel {} ({})", first.id, first.name);
                        self.active_channel_id = Some(first.id.clone());
                    }
                }
            }
            Err(e) => {
                tracing::warn!("Failed to load channels: {}", e);
                self.error = Some(e.to_string());
            }
        }

        self.loading = false;
    }

    /// Create a channel and make it active.
    ///
    /// A blank name is a no-op and yields `Ok(None)`. Length limits are the
    /// caller's business; the backend has the final say.
    pub async fn create(&mut self, name: &str) -> Result<Option<Channel>, GatewayError> {
        if name.trim().is_empty() {
            return Ok(None);
        }

        match self.gateway.create_channel(name).await {
            Ok(channel) => {
                tracing::info!("Created channel {} ({})", channel.id, channel.name);
                self.channels.push(channel.clone());
                self.active_channel_id = Some(channel.id.clone());
                Ok(Some(channel))
            }
            Err(e) => {
                tracing::warn!("Failed to create channel '{}': {}", name, e);
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Delete a channel. When it was active, the first remaining channel
    /// becomes active, or none if the list is now empty.
    pub async fn delete(&mut self, channel_id: &str) -> Result<(), GatewayError> {
        if let Err(e) = self.gateway.delete_channel(channel_id).await {
            tracing::warn!("Failed to delete channel {}: {}", channel_id, e);
            self.error = Some(e.to_string());
            return Err(e);
        }

        self.channels.retain(|channel| channel.id != channel_id);
        if self.active_channel_id.as_deref() == Some(channel_id) {
            self.active_channel_id = self.channels.first().map(|channel| channel.id.clone());
            tracing::info!(
                "Deleted active channel {}, now active: {:?}",
                channel_id,
                self.active_channel_id
            );
        } else {
            tracing::info!("Deleted channel {}", channel_id);
        }
        Ok(())
    }

    /// Local switch only. The id is not checked against the list.
    pub fn select(&mut self, channel_id: impl Into<String>) {
        self.active_channel_id = Some(channel_id.into());
    }
}
