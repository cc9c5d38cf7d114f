use std::net::SocketAddr;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

mod api;
mod config;
mod db;
mod error;
mod models;
mod params;
mod report;

#[derive(Parser)]
#[command(name = "campaign-report")]
#[command(about = "Campaign delivery and quality score reporting service", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply migrations and serve the report API
    Serve {
        #[arg(long, default_value = "127.0.0.1:8000")]
        bind: SocketAddr,
    },
    /// Create or upgrade the database schema
    InitDb,
    /// Load sample campaigns with matching daily scores
    Seed,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let settings = config::Settings::from_env()?;
    let pool = db::connect(&settings).await?;

    match cli.command {
        Commands::Serve { bind } => {
            db::init_db(&pool).await?;
            let app = api::router(api::AppState { pool });
            let listener = tokio::net::TcpListener::bind(bind)
                .await
                .with_context(|| format!("failed to bind {bind}"))?;
            info!(%bind, "serving campaign reports");
            axum::serve(listener, app).await.context("server error")?;
        }
        Commands::InitDb => {
            db::init_db(&pool).await?;
            info!("schema ready");
        }
        Commands::Seed => {
            let inserted = db::seed(&pool).await?;
            info!(inserted, "seed data upserted");
        }
    }

    Ok(())
}
