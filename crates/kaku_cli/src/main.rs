//! Kakuyomu CLI - read Kakuyomu from the terminal
//!
//! Usage: kaku <command> [options]

use clap::{Parser, Subcommand};
use kaku_common::{EXIT_CONFIG_ERROR, EXIT_ERROR};
use kaku_config::Config;
use kaku_core::{KakuyomuClient, RankingQuery, SearchQuery};
use kaku_mcp::transport::{self, TransportKind};
use kaku_mcp::McpServer;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "kaku", version, about = "Read Kakuyomu works, episodes and rankings")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to a TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose/debug logging
    #[arg(long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Latest works from the top page
    Top {
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Search works
    Search {
        /// Search keywords
        q: String,

        #[arg(long, default_value = "1")]
        page: u32,

        /// Keywords to exclude
        #[arg(long)]
        ex_q: Option<String>,

        #[arg(long)]
        serial_status: Option<String>,

        #[arg(long)]
        genre_name: Option<String>,

        #[arg(long)]
        total_review_point_range: Option<String>,

        #[arg(long)]
        total_character_count_range: Option<String>,

        #[arg(long)]
        published_date_range: Option<String>,

        #[arg(long)]
        last_episode_published_date_range: Option<String>,

        #[arg(long)]
        limit: Option<usize>,
    },

    /// Episode list of a work
    Episodes {
        work_id: String,

        #[arg(long)]
        limit: Option<usize>,
    },

    /// Body text of an episode
    Episode { work_id: String, episode_id: String },

    /// Ranking for a genre and period
    Rankings {
        #[arg(long, default_value = "all")]
        genre: String,

        /// daily, weekly, monthly, yearly or entire
        #[arg(long, default_value = "daily")]
        period: String,

        #[arg(long)]
        limit: Option<usize>,
    },

    /// Print server information
    Info,

    /// Start the MCP server
    Mcp {
        #[arg(long, value_enum, default_value_t = TransportKind::Stdio)]
        transport: TransportKind,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    kaku_common::telemetry::init_tracing(cli.verbose, false);

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(EXIT_CONFIG_ERROR);
        }
    };

    if let Err(e) = run(cli.command, config).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(EXIT_ERROR);
    }
}

async fn run(command: Commands, config: Config) -> anyhow::Result<()> {
    let default_limit = config.mcp.default_limit;

    match command {
        Commands::Top { limit } => {
            let client = KakuyomuClient::new(&config.http)?;
            print_text(&client.top_page(limit.unwrap_or(default_limit)).await?);
        }
        Commands::Search {
            q,
            page,
            ex_q,
            serial_status,
            genre_name,
            total_review_point_range,
            total_character_count_range,
            published_date_range,
            last_episode_published_date_range,
            limit,
        } => {
            let query = SearchQuery {
                q,
                page,
                ex_q,
                serial_status,
                genre_name,
                total_review_point_range,
                total_character_count_range,
                published_date_range,
                last_episode_published_date_range,
                limit: limit.unwrap_or(default_limit),
            };
            let client = KakuyomuClient::new(&config.http)?;
            print_text(&client.search_works(&query).await?);
        }
        Commands::Episodes { work_id, limit } => {
            let client = KakuyomuClient::new(&config.http)?;
            let limit = limit.unwrap_or(config.mcp.episode_limit);
            print_text(&client.work_episodes(&work_id, limit).await?);
        }
        Commands::Episode {
            work_id,
            episode_id,
        } => {
            let client = KakuyomuClient::new(&config.http)?;
            print_text(&client.episode_content(&work_id, &episode_id).await?);
        }
        Commands::Rankings {
            genre,
            period,
            limit,
        } => {
            let query = RankingQuery {
                genre,
                period,
                limit: limit.unwrap_or(default_limit),
            };
            let client = KakuyomuClient::new(&config.http)?;
            print_text(&client.rankings(&query).await?);
        }
        Commands::Info => print_text(kaku_mcp::resources::SERVER_INFO),
        Commands::Mcp { transport: kind } => {
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
        }
    }

    Ok(())
}

fn print_text(text: &str) {
    if text.ends_with('\n') {
        print!("{}", text);
    } else {
        println!("{}", text);
    }
}
