//! Route guard server
//!
//! Serves the application behind declarative route access control.

use clap::Parser;
use routeguard::{
    access::{AccessResolver, RuleStore},
    config::{AppConfig, LogFormat, load_config},
    enforce::GuardState,
    server::run_server_blocking,
    session::{RequestIdentityResolver, create_identity_resolver},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Route guard - declarative route access control with dual enforcement
#[derive(Parser, Debug)]
#[command(name = "routeguard")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, env = "ROUTEGUARD_CONFIG")]
    config: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "ROUTEGUARD_LOG_LEVEL")]
    log_level: Option<String>,

    /// HTTP server host
    #[arg(long, env = "ROUTEGUARD_HOST")]
    host: Option<String>,

    /// HTTP server port
    #[arg(long, env = "ROUTEGUARD_PORT")]
    port: Option<u16>,
}

fn init_logging(args: &Args, config: &AppConfig) {
    let level = args
        .log_level
        .as_deref()
        .unwrap_or(&config.logging.level)
        .to_string();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let registry = tracing_subscriber::registry().with(filter);
    match config.logging.format {
        LogFormat::Pretty => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Load configuration
    let config = load_config(args.config.as_deref())?;

    // Initialize logging
    init_logging(&args, &config);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting route guard server"
    );

    // Discover rule sources and build the resolver over one immutable
    // rule-set snapshot
    let store = RuleStore::discover(&config.rules);
    let resolver = Arc::new(AccessResolver::new(&store));
    info!(rules = resolver.rule_count(), "Loaded route rules");

    // Create the request identity resolver
    let identities: Arc<dyn RequestIdentityResolver> =
        create_identity_resolver(&config.identity).into();
    info!(
        resolver = identities.resolver_type(),
        "Identity resolution configured"
    );

    let state = GuardState::new(resolver, identities);

    // Resolve bind address from CLI args with config fallback
    let host = args.host.as_deref().unwrap_or(&config.server.host);
    let port = args.port.unwrap_or(config.server.port);
    let bind: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .map_err(routeguard::error::ServerError::InvalidAddress)
        .inspect_err(|e| error!(error = %e, "Invalid bind address"))?;

    run_server_blocking(bind, state).await?;
    Ok(())
}
