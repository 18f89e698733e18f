// Command handlers for the one-shot subcommands

use std::path::PathBuf;
use std::sync::Arc;

use crate::client::{BackendClient, BackendGateway};
use crate::core::{Message, Role};
use crate::state::{ChannelDirectory, ChatSession, WorkflowGraph};
use crate::{Config, Result};

/// Build the HTTP client and make sure the backend answers.
pub async fn connect(config: &Config) -> Result<BackendClient> {
    let client = BackendClient::from_config(config)?;

    if !client.is_backend_reachable().await {
        tracing::error!("Backend at {} is not reachable", client.base_url());
        anyhow::bail!(
            "Backend is not reachable at {}. Start it or pass --server <url>.",
            client.base_url()
        );
    }

    tracing::debug!("Connected to backend at {}", client.base_url());
    Ok(client)
}

fn gateway(client: BackendClient) -> Arc<dyn BackendGateway> {
    Arc::new(client)
}

/// Trim a channel name and enforce the length limit the backend expects.
pub fn validate_channel_name(name: &str, max_len: usize) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        anyhow::bail!("Channel name cannot be empty");
    }
    let len = name.chars().count();
    if len > max_len {
        anyhow::bail!(
            "Channel name is {} characters long, the limit is {}",
            len,
            max_len
        );
    }
    Ok(name.to_string())
}

pub fn validate_message(content: &str, max_len: usize) -> Result<()> {
    if content.trim().is_empty() {
        anyhow::bail!("Message cannot be empty");
    }
    let len = content.chars().count();
    if len > max_len {
        anyhow::bail!("Message is {} characters long, the limit is {}", len, max_len);
    }
    Ok(())
}

pub fn print_message(message: &Message) {
    let speaker = match message.role {
        Role::User => "🧑 You",
        Role::Assistant => "🤖 Assistant",
    };
    println!("{}: {}", speaker, message.content);

    for call in message.tool_calls() {
        let arguments = serde_json::Value::Object(call.arguments.clone());
        println!("   🔧 {}({})", call.tool_name, arguments);
        if let Some(result) = &call.result {
            println!("      └── {}", result);
        }
    }
}

pub fn print_channels(directory: &ChannelDirectory) {
    if directory.channels().is_empty() {
        println!("   No channels yet");
        println!("💡 Create one with: wearchat create <name>");
        return;
    }

    for channel in directory.channels() {
        let marker = if directory.active_channel_id() == Some(channel.id.as_str()) {
            "▶"
        } else {
            "•"
        };
        println!(
            "   {} {} ({} messages) [{}]",
            marker, channel.name, channel.message_count, channel.id
        );
    }
}

pub async fn list_channels(config: Config) -> Result<()> {
    let client = connect(&config).await?;
    let mut directory = ChannelDirectory::new(gateway(client));

    directory.refresh().await;
    if let Some(error) = directory.error() {
        anyhow::bail!("Failed to list channels: {}", error);
    }

    println!("📋 Channels:");
    print_channels(&directory);
    Ok(())
}

pub async fn create_channel(config: Config, name: String) -> Result<()> {
    let name = validate_channel_name(&name, config.chat.max_channel_name_len)?;
    let client = connect(&config).await?;
    let mut directory = ChannelDirectory::new(gateway(client));

    match directory.create(&name).await? {
        Some(channel) => {
            println!("✅ Channel '{}' created", channel.name);
            println!("📋 Channel ID: {}", channel.id);
        }
        None => println!("Nothing to create"),
    }
    Ok(())
}

pub async fn delete_channel(config: Config, channel_id: String) -> Result<()> {
    let client = connect(&config).await?;
    let mut directory = ChannelDirectory::new(gateway(client));

    directory.delete(&channel_id).await?;
    println!("✅ Channel {} deleted", channel_id);
    Ok(())
}

pub async fn show_history(config: Config, channel_id: String) -> Result<()> {
    let client = connect(&config).await?;
    let mut session = ChatSession::new(gateway(client));

    session.load_history(Some(&channel_id)).await;
    if let Some(error) = session.error() {
        anyhow::bail!("Failed to load history: {}", error);
    }

    if session.messages().is_empty() {
        println!("   No messages in this channel");
    }
    for message in session.messages() {
        print_message(message);
    }
    Ok(())
}

pub async fn send_message(config: Config, channel_id: String, words: Vec<String>) -> Result<()> {
    let content = words.join(" ");
    validate_message(&content, config.chat.max_message_len)?;

    let client = connect(&config).await?;
    let mut session = ChatSession::new(gateway(client));

    if !session.send_message(Some(&channel_id), &content).await {
        let error = session.error().unwrap_or("message was not sent");
        anyhow::bail!("Failed to send message: {}", error);
    }

    if let Some(reply) = session.messages().last() {
        print_message(reply);
    }
    Ok(())
}

pub async fn clear_history(config: Config, channel_id: String) -> Result<()> {
    let client = connect(&config).await?;
    let mut session = ChatSession::new(gateway(client));

    session.clear_history(Some(&channel_id)).await?;
    println!("✅ History of channel {} cleared", channel_id);
    Ok(())
}

pub async fn show_graph(config: Config, output: Option<PathBuf>) -> Result<()> {
    let client = connect(&config).await?;
    let mut graph = WorkflowGraph::new(gateway(client));

    graph.load().await;
    if let Some(error) = graph.error() {
        anyhow::bail!("Failed to load graph: {}", error);
    }
    let Some(snapshot) = graph.snapshot() else {
        anyhow::bail!("Backend returned no graph");
    };

    match output {
        Some(path) => {
            let bytes = snapshot
                .png_bytes()
                .ok_or_else(|| anyhow::anyhow!("Backend did not render a PNG for this graph"))?
                .map_err(|e| anyhow::anyhow!("Invalid PNG payload: {}", e))?;
            std::fs::write(&path, &bytes)?;
            println!("✅ Graph image written to {} ({} bytes)", path.display(), bytes.len());
        }
        None => match &snapshot.mermaid {
            Some(mermaid) if !mermaid.trim().is_empty() => println!("{}", mermaid),
            _ => println!("   Backend did not return a Mermaid diagram"),
        },
    }
    Ok(())
}

pub async fn check_health(config: Config) -> Result<()> {
    let client = BackendClient::from_config(&config)?;

    match client.health().await {
        Ok(health) => {
            println!("✅ Backend is {}", health.status);
            if health.agent_initialized {
                println!("🤖 Agent is initialized");
            } else {
                println!("⚠️  Agent is not initialized");
            }
        }
        Err(e) => {
            println!("❌ Backend is not healthy: {}", e);
            println!("💡 Checked {}", client.base_url());
        }
    }
    Ok(())
}
