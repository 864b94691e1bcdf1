use anyhow::Result;
use clap::Parser;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use m3u_console::{
    config::Config,
    database::Database,
    ingestor::{IngestorService, RefreshScheduler},
    web::WebServer,
};

#[derive(Parser)]
#[command(name = "m3u-console")]
#[command(version = "0.1.0")]
#[command(about = "IPTV stream console with provider ingestion, filtering and M3U export")]
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

    let log_filter = format!("m3u_console={},tower_http=warn", cli.log_level);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting M3U Console v{}", env!("CARGO_PKG_VERSION"));

    std::env::set_var("CONFIG_FILE", &cli.config);
    let mut config = Config::load()?;
    info!("Configuration loaded from: {}", cli.config);

    if let Some(host) = cli.host {
        config.web.host = host;
    }
    if let Some(port) = cli.port {
        config.web.port = port;
    }
    if let Some(database_url) = cli.database_url {
        config.database.url = database_url;
    }

    info!("Using database: {}", config.database.url);

    let database = Database::new(&config.database).await?;
    database.migrate().await?;
    info!("Database connection established and migrations applied");

    let ingestor = IngestorService::new(
        database.clone(),
        Duration::from_secs(config.refresh.request_timeout_seconds),
    )?;

    let scheduler = RefreshScheduler::new(database.clone(), ingestor.clone(), &config.refresh);
    tokio::spawn(scheduler.start());

    let web_server = WebServer::new(config, database, ingestor)?;
    info!(
        "Starting web server on {}:{}",
        web_server.host(),
        web_server.port()
    );
    web_server.serve().await?;

    Ok(())
}
