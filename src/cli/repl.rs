// Interactive chat loop. Acts as the host that wires the directory's active
// channel into the chat session on every call.

use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

use super::handlers::{connect, print_channels, print_message, validate_channel_name, validate_message};
use crate::client::BackendGateway;
use crate::state::{ChannelDirectory, ChatSession, WorkflowGraph};
use crate::{Config, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Empty,
    Message(String),
    Channels,
    Switch(String),
    New(String),
    Delete(Option<String>),
    History,
    Clear,
    Graph,
    Help,
    Quit,
    Unknown(String),
}

impl ReplCommand {
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return ReplCommand::Empty;
        }
        let Some(command) = trimmed.strip_prefix('/') else {
            return ReplCommand::Message(line.trim_end_matches(['\r', '\n']).to_string());
        };

        let (name, argument) = match command.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (command, ""),
        };
        let argument = (!argument.is_empty()).then(|| argument.to_string());

        match (name, argument) {
            ("channels" | "ls", _) => ReplCommand::Channels,
            ("switch" | "sw", Some(id)) => ReplCommand::Switch(id),
            ("new", Some(channel_name)) => ReplCommand::New(channel_name),
            ("delete" | "rm", id) => ReplCommand::Delete(id),
            ("history", _) => ReplCommand::History,
            ("clear", _) => ReplCommand::Clear,
            ("graph", _) => ReplCommand::Graph,
            ("help" | "?", _) => ReplCommand::Help,
            ("quit" | "exit" | "q", _) => ReplCommand::Quit,
            _ => ReplCommand::Unknown(trimmed.to_string()),
        }
    }
}

fn print_help() {
    println!("💡 Commands:");
    println!("  • /channels          - List channels");
    println!("  • /switch <id>       - Switch to another channel");
    println!("  • /new <name>        - Create a channel and switch to it");
    println!("  • /delete [id]       - Delete a channel (default: the active one)");
    println!("  • /history           - Reload the history of this channel");
    println!("  • /clear             - Clear the history of this channel");
    println!("  • /graph             - Show the assistant's workflow graph");
    println!("  • /quit              - Leave");
    println!("  Anything else is sent as a message.");
}

fn prompt(directory: &ChannelDirectory) -> std::io::Result<()> {
    let label = directory
        .active_channel()
        .map(|channel| channel.name.as_str())
        .or(directory.active_channel_id())
        .unwrap_or("no channel");
    print!("[{}] > ", label);
    std::io::stdout().flush()
}

/// Reload the session when the directory's active channel is not the one
/// the session holds.
async fn follow_active_channel(directory: &ChannelDirectory, session: &mut ChatSession) {
    let active = directory.active_channel_id();
    if session.channel_id() == active {
        return;
    }

    session.load_history(active).await;
    match active {
        Some(channel_id) => {
            let name = directory
                .get(channel_id)
                .map(|channel| channel.name.as_str())
                .unwrap_or(channel_id);
            println!("\n💬 {} ({} messages)", name, session.messages().len());
            if let Some(error) = session.error() {
                println!("⚠️  Could not load history: {}", error);
            }
            for message in session.messages() {
                print_message(message);
            }
        }
        None => println!("💡 No channel selected. Create one with /new <name>"),
    }
}

pub async fn run_chat(config: Config, channel: Option<String>) -> Result<()> {
    let client = connect(&config).await?;
    let gateway: Arc<dyn BackendGateway> = Arc::new(client);

    let mut directory = ChannelDirectory::new(gateway.clone());
    let mut session = ChatSession::new(gateway.clone());
    let mut graph = WorkflowGraph::new(gateway);

    if let Some(channel_id) = channel {
        directory.select(channel_id);
    }
    directory.refresh().await;
    if let Some(error) = directory.error() {
        println!("⚠️  Could not load channels: {}", error);
    }

    println!("🚀 Wearchat - ask about steps, sleep, heart rate, activities and more");
    println!("💡 Type /help for commands");
    follow_active_channel(&directory, &mut session).await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        prompt(&directory)?;

        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else {
            break;
        };

        match ReplCommand::parse(&line) {
            ReplCommand::Empty => {}
            ReplCommand::Quit => break,
            ReplCommand::Help => print_help(),
            ReplCommand::Unknown(input) => {
                println!("❓ Unknown command: {}", input);
                print_help();
            }
            ReplCommand::Channels => {
                directory.refresh().await;
                if let Some(error) = directory.error() {
                    println!("❌ Failed to load channels: {}", error);
                }
                print_channels(&directory);
                follow_active_channel(&directory, &mut session).await;
            }
            ReplCommand::Switch(channel_id) => {
                match directory.resolve(&channel_id).await {
                    Ok(channel) => {
                        if directory.get(&channel.id).is_none() {
                            println!("💡 {} is not listed yet, /channels refreshes the list", channel.name);
                        }
                        directory.select(channel.id);
                        follow_active_channel(&directory, &mut session).await;
                    }
                    Err(e) => println!("❌ Cannot switch to {}: {}", channel_id, e),
                }
            }
            ReplCommand::New(name) => {
                let name = match validate_channel_name(&name, config.chat.max_channel_name_len) {
                    Ok(name) => name,
                    Err(e) => {
                        println!("❌ {}", e);
                        continue;
                    }
                };
                match directory.create(&name).await {
                    Ok(Some(channel)) => {
                        println!("✅ Channel '{}' created", channel.name);
                        follow_active_channel(&directory, &mut session).await;
                    }
                    Ok(None) => {}
                    Err(e) => println!("❌ Failed to create channel: {}", e),
                }
            }
            ReplCommand::Delete(channel_id) => {
                let Some(channel_id) =
                    channel_id.or_else(|| directory.active_channel_id().map(str::to_string))
                else {
                    println!("💡 No channel to delete");
                    continue;
                };
                match directory.delete(&channel_id).await {
                    Ok(()) => {
                        println!("✅ Channel {} deleted", channel_id);
                        follow_active_channel(&directory, &mut session).await;
                    }
                    Err(e) => println!("❌ Failed to delete channel: {}", e),
                }
            }
            ReplCommand::History => {
                session.load_history(directory.active_channel_id()).await;
                if let Some(error) = session.error() {
                    println!("❌ Failed to load history: {}", error);
                }
                for message in session.messages() {
                    print_message(message);
                }
            }
            ReplCommand::Clear => {
                if session.messages().is_empty() {
                    println!("💡 Nothing to clear");
                    continue;
                }
                match session.clear_history(directory.active_channel_id()).await {
                    Ok(()) => println!("✅ History cleared"),
                    Err(e) => println!("❌ Failed to clear history: {}", e),
                }
            }
            ReplCommand::Graph => {
                graph.load().await;
                if let Some(error) = graph.error() {
                    println!("❌ Failed to load graph: {}", error);
                } else if let Some(mermaid) = graph.snapshot().and_then(|s| s.mermaid.as_deref()) {
                    println!("{}", mermaid);
                } else {
                    println!("   Backend did not return a Mermaid diagram");
                }
            }
            ReplCommand::Message(content) => {
                if directory.active_channel_id().is_none() {
                    println!("💡 Select a channel to start chatting (/channels, /new <name>)");
                    continue;
                }
                if let Err(e) = validate_message(&content, config.chat.max_message_len) {
                    println!("❌ {}", e);
                    continue;
                }
                if session
                    .send_message(directory.active_channel_id(), &content)
                    .await
                {
                    if let Some(reply) = session.messages().last() {
                        print_message(reply);
                    }
                } else if let Some(error) = session.error() {
                    println!("❌ Failed to send message: {}", error);
                }
            }
        }
    }

    println!("\n👋 Bye");
    Ok(())
}
