use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// Use the library instead of redeclaring modules
use favicon_proxy::{
    config::Config,
    database::{favicons::FaviconRepository, Database},
    resolver::FaviconResolver,
    utils::IconHttpClient,
    web::WebServer,
};

#[derive(Parser)]
#[command(name = "favicon-proxy")]
#[command(version = "0.1.0")]
#[command(about = "A favicon discovery and caching proxy service")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Listening IP address
    #[arg(short = 'H', long, value_name = "IP")]
    host: Option<String>,

    /// Listening port
    #[arg(short, long, value_name = "PORT")]
    port: Option<u16>,

    /// Database URL (overrides config file)
    #[arg(short = 'd', long, value_name = "URL")]
    database_url: Option<String>,

    /// Log level
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging with specified level
    let log_filter = if cli.log_level == "trace" {
        format!("favicon_proxy={},tower_http=trace", cli.log_level)
    } else {
        format!("favicon_proxy={}", cli.log_level)
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Favicon Proxy v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration from specified file
    let mut config = Config::load_from_file(&cli.config)?;
    info!("Configuration loaded from: {}", cli.config);

    // Override config with CLI arguments
    if let Some(host) = cli.host {
        config.web.host = host;
    }
    if let Some(port) = cli.port {
        config.web.port = port;
    }
    if let Some(database_url) = cli.database_url {
        config.database.url = database_url;
    }

    // Bad knobs should kill the process here, not a request later
    config.validate()?;

    info!("Using database: {}", config.database.url);

    let database = Database::new(&config.database).await?;
    database.migrate().await?;
    info!("Database connection established and migrations applied");

    let repository = FaviconRepository::new(database.pool(), config.cache.ttl);

    let http_client = IconHttpClient::new(&config.fetch)?;
    let resolver = FaviconResolver::new(
        http_client,
        config.fetch.clone(),
        config.cache.target_icon_size,
    );
    info!(
        "Resolver initialized (per-request timeout {}, overall deadline {})",
        humantime::format_duration(config.fetch.request_timeout),
        humantime::format_duration(config.fetch.resolve_timeout),
    );

    // Periodic sweep of expired cache rows, only meaningful with a TTL
    if config.cache.ttl.is_some() {
        let cleanup_repository = repository.clone();
        let cleanup_interval = config.cache.cleanup_interval;
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(cleanup_interval);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                match cleanup_repository.cleanup_expired().await {
                    Ok(0) => {}
                    Ok(removed) => info!("Removed {removed} expired favicon(s)"),
                    Err(e) => tracing::error!("Expired favicon cleanup failed: {e}"),
                }
            }
        });
        info!(
            "Cache cleanup scheduled every {}",
            humantime::format_duration(config.cache.cleanup_interval)
        );
    }

    let web_server = WebServer::new(config, database, repository, resolver).await?;

    info!(
        "Starting web server on {}:{}",
        web_server.host(),
        web_server.port()
    );
    web_server.serve().await?;

    Ok(())
}
