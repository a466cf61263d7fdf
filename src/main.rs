use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use team_balancer::api::{build_router, state::AppState};
use team_balancer::balance::TeamPartitioner;
use team_balancer::cache::{CacheStore, MemoryCache};
use team_balancer::config::AppConfig;
use team_balancer::fetch::RiotClient;
use team_balancer::models::PlayerInput;
use team_balancer::optimizer::{HttpOptimizer, OptimizerClient};
use team_balancer::profile::ProfileAggregator;

#[derive(Parser)]
#[command(name = "team-balancer")]
#[command(about = "Custom-game team balancer backed by ranked profiles")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server
    Serve {
        /// Bind address (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port number (overrides config)
        #[arg(long)]
        port: Option<u16>,

        /// Log all HTTP requests
        #[arg(long)]
        access_log: bool,
    },

    /// Print a player's profile as JSON
    Profile {
        /// Summoner name
        name: String,
    },

    /// Balance a roster of 2-10 players
    Balance {
        /// Players as name[:PRIMARY[:SECONDARY]], e.g. "Faker:MID:TOP"
        #[arg(required = true)]
        players: Vec<PlayerInput>,
    },
}

struct Services {
    profiles: Arc<ProfileAggregator>,
    partitioner: Arc<TeamPartitioner>,
    optimizer: Option<Arc<dyn OptimizerClient>>,
}

fn build_services(config: &AppConfig) -> Result<Services> {
    let provider = RiotClient::new(config.riot.client_config()?)
        .context("failed to build provider client")?;
    let cache: Arc<dyn CacheStore> = Arc::new(MemoryCache::new(config.cache.max_entries));
    tracing::debug!(
        "Using {} cache, at most {} entries",
        cache.name(),
        config.cache.max_entries
    );
    let profiles = Arc::new(ProfileAggregator::new(
        Arc::new(provider),
        cache,
        config.profile_settings(),
    ));

    let optimizer: Option<Arc<dyn OptimizerClient>> = if config.optimizer.enabled {
        let client = HttpOptimizer::new(config.optimizer.url()?, config.optimizer.deadline())
            .context("failed to build optimizer client")?;
        Some(Arc::new(client))
    } else {
        tracing::info!("Optimizer disabled, using local partition only");
        None
    };

    let partitioner = Arc::new(TeamPartitioner::new(
        profiles.clone(),
        optimizer.clone(),
        config.optimizer.deadline(),
    ));

    Ok(Services {
        profiles,
        partitioner,
        optimizer,
    })
}

fn cors_layer(origin: &str) -> Result<CorsLayer> {
    let allow = if origin == "*" {
        AllowOrigin::any()
    } else {
        AllowOrigin::exact(origin.parse().context("invalid cors_origin")?)
    };
    Ok(CorsLayer::new()
        .allow_origin(allow)
        .allow_methods(Any)
        .allow_headers(Any))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);
    if cli.json_logs {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("Starting team-balancer v{}", env!("CARGO_PKG_VERSION"));

    let config = AppConfig::load(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;

    match cli.command {
        Commands::Serve {
            host,
            port,
            access_log,
        } => {
            if config.riot.api_key.is_empty() {
                bail!("RIOT_API_KEY is not set");
            }

            let services = build_services(&config)?;
            let state = AppState::new(
                services.profiles,
                services.partitioner,
                services.optimizer,
            );

            let mut app = build_router(state).layer(cors_layer(&config.server.cors_origin)?);
            if access_log {
                app = app.layer(TraceLayer::new_for_http());
            }

            let addr = format!(
                "{}:{}",
                host.unwrap_or(config.server.host),
                port.unwrap_or(config.server.port)
            );
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            tracing::info!("Listening on http://{}", addr);
            axum::serve(listener, app).await?;
        }
        Commands::Profile { name } => {
            let services = build_services(&config)?;

            let profile = services.profiles.get_profile(&name).await?;
            println!("{}", serde_json::to_string_pretty(&profile)?);
        }
        Commands::Balance { players } => {
            let services = build_services(&config)?;
            let results = services.partitioner.balance(&players).await?;

            for result in &results {
                tracing::info!(
                    "Option {}: balance score {:.3}, A {:.1}% / B {:.1}%",
                    result.rank,
                    result.balance_score,
                    result.team_a_win_rate * 100.0,
                    result.team_b_win_rate * 100.0
                );
            }
            println!("{}", serde_json::to_string_pretty(&results)?);
        }
    }

    Ok(())
}
