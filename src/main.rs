use anyhow::Result;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vote_resolver::cache::TtlCache;
use vote_resolver::config_validator::ConfigValidator;
use vote_resolver::identity::{PlayerIdentity, ServerIdentity};
use vote_resolver::metrics::MetricsCollector;
use vote_resolver::{classify, ApiClient, Config, VoteResolver};

#[derive(Debug, Parser)]
#[command(name = "vote-resolver", version, about = "Vote pre-check and outcome classification")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Check whether a player has already voted today
    Check {
        /// Server slug; defaults to the slug in SERVER_URL
        #[arg(long)]
        server: Option<String>,
        /// Player name; defaults to PLAYER_NAME
        #[arg(long)]
        player: Option<String>,
    },
    /// Show server metadata
    Server { slug: String },
    /// Classify the page shown after a vote click
    Classify {
        #[arg(long, default_value = "")]
        text: String,
        #[arg(long = "label")]
        labels: Vec<String>,
    },
}

fn build_resolver(config: &Config, metrics: &MetricsCollector) -> Result<VoteResolver<ApiClient>> {
    let client = ApiClient::from_config(config, metrics.clone())?;
    Ok(VoteResolver::with_cache(
        Arc::new(client),
        TtlCache::with_metrics(metrics.clone()),
        config.cache_ttl(),
    ))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load environment variables from .env file
    dotenv::dotenv().ok();

    let config = Config::from_env()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;
    ConfigValidator::validate_config(&config)?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("vote_resolver={}", config.log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let metrics = MetricsCollector::new();

    match cli.command {
        Command::Check { server, player } => {
            let server_identity = ServerIdentity::from_config(&config);
            let player = player
                .map(|p| PlayerIdentity::new(Some(&p)))
                .unwrap_or_else(|| PlayerIdentity::from_config(&config));
            let Some(slug) = server.or(server_identity.slug) else {
                anyhow::bail!("No server slug given and SERVER_URL has none");
            };

            tracing::info!(player = %player.name, server = %server_identity.name, slug = %slug, "Checking vote status");
            let resolver = build_resolver(&config, &metrics)?;
            let result = resolver.check_player_voted_today(&slug, &player.name).await;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Command::Server { slug } => {
            let resolver = build_resolver(&config, &metrics)?;
            match resolver.get_server_info(&slug).await {
                Some(info) => println!("{}", serde_json::to_string_pretty(&info)?),
                None => println!("Server '{}' not found", slug),
            }
        }
        Command::Classify { text, labels } => {
            let classification = classify(&text, labels.as_slice());
            tracing::info!(outcome = %classification.outcome, "Page classified");
            println!("{}", serde_json::to_string_pretty(&classification)?);
        }
    }

    tracing::debug!(metrics = ?metrics.snapshot(), "Request metrics");
    Ok(())
}
