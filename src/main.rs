//! Google Docs MCP Bridge
//!
//! HTTP server exposing Google Docs operations to a tool-calling host over a
//! JSON-RPC endpoint, authorized through the OAuth authorization-code flow.

use std::net::SocketAddr;

use anyhow::Context;
use clap::{Parser, Subcommand};

use gdocs_mcp_bridge::config::Config;
use gdocs_mcp_bridge::docs::store::{CredentialStore, FileCredentialStore};
use gdocs_mcp_bridge::mcp::server::McpServer;

/// Google Docs MCP Bridge
#[derive(Parser)]
#[command(name = "gdocs-mcp-bridge")]
#[command(author, version, about = "Google Docs MCP Bridge - JSON-RPC access to Google Docs")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server (default)
    Serve {
        /// Address to bind (overrides HOST)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides PORT)
        #[arg(long)]
        port: Option<u16>,

        /// Open the authorization page in a browser once listening
        #[arg(long)]
        open: bool,
    },
    /// Print the stored refresh token
    RefreshToken,
    /// Print the OAuth consent URL
    AuthUrl,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = Config::from_env().context("Failed to load configuration")?;

    match cli.command.unwrap_or(Commands::Serve {
        host: None,
        port: None,
        open: false,
    }) {
        Commands::Serve { host, port, open } => {
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port {
                config.port = port;
            }
            run_server(config, open).await?;
        }
        Commands::RefreshToken => {
            let store = FileCredentialStore::new(config.token_path());
            match store.load().await? {
                None => println!("Token file not found: {}", store.path().display()),
                Some(record) => match record.refresh_token {
                    Some(refresh_token) => {
                        println!("REFRESH TOKEN:");
                        println!("{}", refresh_token);
                    }
                    None => println!("No refresh_token found in {}", store.path().display()),
                },
            }
        }
        Commands::AuthUrl => {
            let server = McpServer::from_config(&config).await?;
            println!("{}", server.authenticator().begin_authorization());
        }
    }

    Ok(())
}

async fn run_server(config: Config, open: bool) -> anyhow::Result<()> {
    if !config.client_secrets_exist() {
        anyhow::bail!(
            "Client secrets file not found at {}. Download it from the Google Cloud console \
             or set CLIENT_SECRETS_FILE.",
            config.client_secrets_path.display()
        );
    }

    let server = McpServer::from_config(&config).await?;

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| format!("Invalid listen address {}:{}", config.host, config.port))?;

    if open {
        let url = format!("http://localhost:{}/", config.port);
        if let Err(e) = open::that(&url) {
            tracing::warn!("Could not open browser automatically: {}", e);
            eprintln!("Please open {} manually.", url);
        }
    }

    server.run(addr).await?;
    Ok(())
}
