use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;

use citeseek::api::create_router;
use citeseek::build_state;
use citeseek::config::Config;
use citeseek::data_models::Query;

#[derive(Parser)]
#[command(name = "citeseek", about = "Web search answers with cited sources")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Maximum log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info")]
    log_level: tracing::Level,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API
    Serve {
        /// Address to bind, overrides BIND_ADDR
        #[arg(long)]
        bind: Option<String>,
    },
    /// Answer a single query and print it with its sources
    Ask { query: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Also captures records from the `log` macros used throughout the library.
    tracing_subscriber::fmt()
        .with_max_level(cli.log_level)
        .with_target(true)
        .init();

    let config = Config::from_env()?;
    let state = build_state(&config).context("Failed to build HTTP client")?;

    match cli.command {
        Commands::Serve { bind } => {
            let addr = bind.unwrap_or(config.bind_addr);
            let listener = tokio::net::TcpListener::bind(&addr)
                .await
                .with_context(|| format!("Failed to bind {addr}"))?;
            tracing::info!("listening on {}", addr);

            axum::serve(listener, create_router(state))
                .with_graceful_shutdown(async {
                    tokio::signal::ctrl_c().await.ok();
                    tracing::info!("shutting down");
                })
                .await?;
        }
        Commands::Ask { query } => {
            let query = Query::new(&query)?;
            let cancel = CancellationToken::new();

            let ctrl_c = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    ctrl_c.cancel();
                }
            });

            let response = state.engine.answer(&query, &cancel).await?;
            println!("\n{}\n", response.answer);
            for (i, citation) in response.citations.iter().enumerate() {
                println!("[{}] {} - {}", i + 1, citation.title, citation.link);
            }
        }
    }

    Ok(())
}
