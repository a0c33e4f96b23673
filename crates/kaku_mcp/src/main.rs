//! MCP Server Binary Entry Point
//!
//! Usage: kakuyomu-mcp [--transport stdio|streamable-http]

use clap::Parser;
use kaku_common::{EXIT_CONFIG_ERROR, EXIT_ERROR};
use kaku_config::Config;
use kaku_mcp::transport::{self, TransportKind};
use kaku_mcp::McpServer;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(
    name = "kakuyomu-mcp",
    version,
    about = "カクヨムMCPサーバー - 小説投稿サイト「カクヨム」のコンテンツを読み込むMCPサーバー",
    after_help = "使用例:\n  kakuyomu-mcp --transport stdio            # stdioモードで起動 (デフォルト)\n  kakuyomu-mcp --transport streamable-http  # HTTPモードで起動"
)]
struct Cli {
    /// Transport to serve on
    #[arg(long, value_enum, default_value_t = TransportKind::Stdio)]
    transport: TransportKind,

    /// Path to a TOML config file (default: ./kakuyomu-mcp.toml if present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable verbose/debug logging
    #[arg(long)]
    verbose: bool,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // stderr only; stdout is the stdio transport
    kaku_common::telemetry::init_tracing(cli.verbose, cli.json_logs);

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{}", e);
            eprintln!("Error: {}", e);
            std::process::exit(EXIT_CONFIG_ERROR);
        }
    };

    if let Err(e) = run(cli.transport, config).await {
        tracing::error!("{:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(EXIT_ERROR);
    }
}

async fn run(kind: TransportKind, config: Config) -> anyhow::Result<()> {
    let server = McpServer::new(&config)?;

    match kind {
        TransportKind::Stdio => transport::stdio::serve(&server).await?,
        TransportKind::StreamableHttp => {
            transport::http::serve(
                Arc::new(server),
                &config.bind_addr(),
                config.server.session_idle(),
            )
            .await?
        }
    }

    Ok(())
}
