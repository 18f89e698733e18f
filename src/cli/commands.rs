use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "wearchat")]
#[command(about = "Chat with the wearables assistant across multiple channels", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Backend URL, overrides the config file (e.g. http://localhost:8000)
    #[arg(long, global = true)]
    pub server: Option<String>,
    /// Path to a config file instead of the default location
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Interactive chat session
    Chat {
        /// Channel to start in (defaults to the first channel)
        #[arg(short, long)]
        channel: Option<String>,
    },
    /// List all channels
    Channels,
    /// Create a new channel
    Create {
        /// Channel name
        name: String,
    },
    /// Delete a channel
    Delete {
        /// Channel ID to delete
        channel_id: String,
    },
    /// Show the message history of a channel
    History {
        /// Channel ID
        channel_id: String,
    },
    /// Send a single message and print the reply
    Send {
        /// Channel ID
        channel_id: String,
        /// Message to send
        #[arg(trailing_var_arg = true, required = true)]
        message: Vec<String>,
    },
    /// Clear the message history of a channel
    Clear {
        /// Channel ID
        channel_id: String,
    },
    /// Show the assistant's workflow graph
    Graph {
        /// Write the rendered PNG to this file instead of printing the diagram
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Check backend health
    Health,
}
