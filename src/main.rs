use clap::Parser;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::EnvFilter;

use wearchat::cli::{handlers, repl, Cli, Commands};
use wearchat::{Config, Result};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing; stdout is reserved for command output
    let default_directive: Directive = if cli.verbose {
        "wearchat=debug".parse()?
    } else {
        "wearchat=info".parse()?
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(default_directive))
        .with_writer(std::io::stderr)
        .init();

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(server) = &cli.server {
        config.server.url = server.clone();
    }
    tracing::debug!("Using backend {}", config.api_base_url());

    // Handle commands
    match cli.command {
        Commands::Chat { channel } => repl::run_chat(config, channel).await,
        Commands::Channels => handlers::list_channels(config).await,
        Commands::Create { name } => handlers::create_channel(config, name).await,
        Commands::Delete { channel_id } => handlers::delete_channel(config, channel_id).await,
        Commands::History { channel_id } => handlers::show_history(config, channel_id).await,
        Commands::Send {
            channel_id,
            message,
        } => handlers::send_message(config, channel_id, message).await,
        Commands::Clear { channel_id } => handlers::clear_history(config, channel_id).await,
        Commands::Graph { output } => handlers::show_graph(config, output).await,
        Commands::Health => handlers::check_health(config).await,
    }
}
