//! MCP Server Entry Point
//!
//! Parses the command line, loads configuration, initializes logging and
//! serves the selected adapter over the configured transport.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{Level, info};
use tracing_subscriber::{EnvFilter, fmt};

use mcp_server_collection::core::{Config, McpServer, TransportConfig, TransportService};
use mcp_server_collection::domains::tools::ServerKind;

#[derive(Parser, Debug)]
#[command(name = "mcp-server-collection", version)]
#[command(about = "MCP servers exposing third-party HTTP APIs as tools", long_about = None)]
struct Args {
    /// Adapter to serve (see --list-servers)
    #[arg(short, long, env = "MCP_SERVER", required_unless_present = "list_servers")]
    server: Option<String>,

    /// Transport to use: stdio, tcp or http (overrides MCP_TRANSPORT)
    #[arg(short, long)]
    transport: Option<String>,

    /// Host to bind to for tcp/http
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on for tcp/http
    #[arg(long)]
    port: Option<u16>,

    /// Load environment variables from this file instead of ./.env
    #[arg(long)]
    env_file: Option<PathBuf>,

    /// Log level (overrides MCP_LOG_LEVEL)
    #[arg(long)]
    log_level: Option<String>,

    /// List available adapters and exit
    #[arg(long)]
    list_servers: bool,

    /// List the tools of the selected adapter and exit
    #[arg(long)]
    list_tools: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if args.list_servers {
        for kind in ServerKind::ALL {
            println!("{:<18} {}", kind.name(), kind.description());
        }
        return Ok(());
    }

    let mut config = match &args.env_file {
        Some(path) => Config::from_env_file(path)?,
        None => Config::from_env(),
    };

    if let Some(level) = args.log_level {
        config.logging.level = level;
    }
    if args.transport.is_some() || args.host.is_some() || args.port.is_some() {
        let name = args.transport.clone().unwrap_or_else(|| transport_name(&config.transport));
        config.transport = TransportConfig::from_name(&name, args.host, args.port, &config.transport)?;
    }

    init_logging(&config.logging.level, config.logging.with_timestamps);
    config.log_summary();

    let kind: ServerKind = args
        .server
        .as_deref()
        .context("--server is required")?
        .parse()?;

    info!(
        "Starting {} v{} ({})",
        config.server.name, config.server.version, kind
    );

    let transport = TransportService::new(config.transport.clone());
    let server = McpServer::for_server(config, kind)
        .await
        .with_context(|| format!("failed to start server '{}'", kind))?;

    if args.list_tools {
        for tool in server.list_tools() {
            let description = tool.description.as_deref().unwrap_or_default();
            println!(
                "{:<32} {}",
                tool.name,
                description.lines().next().unwrap_or_default()
            );
        }
        return Ok(());
    }

    transport.run(server).await?;

    info!("Server shutting down");

    Ok(())
}

/// Name of the configured transport, used when only --host/--port are given.
fn transport_name(config: &TransportConfig) -> String {
    match config {
        #[cfg(feature = "stdio")]
        TransportConfig::Stdio => "stdio".to_string(),
        #[cfg(feature = "tcp")]
        TransportConfig::Tcp(_) => "tcp".to_string(),
        #[cfg(feature = "http")]
        TransportConfig::Http(_) => "http".to_string(),
    }
}

/// Initialize the logging subsystem.
///
/// Logs go to stderr; stdout carries the STDIO transport. `RUST_LOG`
/// directives are honoured on top of the configured level.
fn init_logging(level: &str, with_timestamps: bool) {
    let level = match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    let builder = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr);

    if with_timestamps {
        builder.init();
    } else {
        builder.without_time().init();
    }
}
