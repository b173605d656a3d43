//! FKS futures trading service entry point.

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::{error, info};

use fks_futures::config::Config;
use fks_futures::features;
use fks_futures::logging;
use fks_futures::service::Service;
use fks_futures::utils::shutdown_signal;

/// FKS futures trading service.
#[derive(Parser, Debug)]
#[command(name = "fks-futures")]
#[command(about = "Futures market analysis and signal generation service")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// HTTP listen port (overrides SERVICE_PORT).
    #[arg(short, long, global = true)]
    port: Option<u16>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the HTTP API (default).
    Serve,

    /// Check configuration validity and show which features would load.
    CheckConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = Config::load()?;
    if let Some(port) = args.port {
        config.service_port = port;
    }

    logging::init(logging::filter(args.verbose, &config.rust_log));

    match args.command {
        Some(Command::CheckConfig) => cmd_check_config(&config),
        Some(Command::Serve) | None => cmd_serve(config).await,
    }
}

/// Check configuration validity.
fn cmd_check_config(config: &Config) -> anyhow::Result<()> {
    println!("======================================================================");
    println!("FKS FUTURES - CONFIGURATION CHECK");
    println!("======================================================================");

    print!("Validating configuration... ");
    let addr = match config.listen_addr() {
        Ok(addr) => {
            println!("OK");
            addr
        }
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration validation failed"));
        }
    };

    let service = Service::from_config(config);

    println!("----------------------------------------------------------------------");
    println!("Configuration Summary:");
    println!("  Listen Address: {}", addr);
    println!("  Log Filter: {}", config.rust_log);
    match config.cors_origins().as_slice() {
        [] => println!("  CORS Origins: any (mirrored)"),
        origins => println!("  CORS Origins: {}", origins.join(", ")),
    }
    for name in [features::METRICS, features::HEALTH] {
        let status = match service.feature(name).and_then(|c| c.absent_reason()) {
            None => "loaded".to_string(),
            Some(reason) => format!("absent ({})", reason),
        };
        println!("  Feature {}: {}", name, status);
    }
    println!("======================================================================");
    println!("CONFIGURATION CHECK PASSED");
    println!("======================================================================");

    Ok(())
}

/// Compose the service and serve until shutdown.
async fn cmd_serve(config: Config) -> anyhow::Result<()> {
    let addr = config.listen_addr().map_err(|e| {
        error!("Invalid configuration: {}", e);
        e
    })?;

    let service = Service::from_config(&config);

    let listener = TcpListener::bind(addr).await?;
    info!("HTTP server listening on {}", addr);

    service.serve(listener, shutdown_signal()).await?;

    Ok(())
}
