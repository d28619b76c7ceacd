//! Main entry point for the Coffee Shop API

use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};
use coffee_shop_api::{config::Config, server::Server, Result};
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "coffee-shop-api", about = "Coffee Shop drinks API", version, author)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Generate example configuration file
    #[arg(long)]
    gen_config: bool,

    /// Print the front-end environment module for the loaded configuration
    #[arg(long)]
    gen_environment: bool,

    /// Emit logs as JSON
    #[arg(long, env = "COFFEE_SHOP_LOG_JSON")]
    log_json: bool,

    #[command(flatten)]
    verbosity: Verbosity<InfoLevel>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Handle config generation before logging so stdout stays clean
    if args.gen_config {
        let example_config = Config::generate_example()?;
        println!("{example_config}");
        return Ok(());
    }

    let config = Config::load(args.config.as_deref())?;

    if args.gen_environment {
        print!("{}", config.to_environment().render_module());
        return Ok(());
    }

    // Initialize logging using the unified system
    let log_filter = format!("{}=info", env!("CARGO_BIN_NAME").replace('-', "_"));
    if args.log_json {
        coffee_shop_common::logging::init_json_logging(&args.verbosity, &log_filter)?;
    } else {
        coffee_shop_common::logging::init_logging(&args.verbosity, &log_filter)?;
    }

    info!("Starting Coffee Shop API v{}", coffee_shop_api::VERSION);
    info!(
        "Configuration loaded, binding to {}",
        config.server.bind_address
    );

    // Create and run server
    let server = Server::new(config).await?;

    // Run until shutdown signal
    match server.run().await {
        Ok(()) => {
            info!("Coffee Shop API shut down gracefully");
            Ok(())
        }
        Err(e) => {
            error!("Coffee Shop API error: {}", e);
            Err(e)
        }
    }
}
