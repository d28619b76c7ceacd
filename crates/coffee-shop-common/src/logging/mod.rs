//! Unified logging initialization for Coffee Shop binaries
//!
//! Filter priority:
//! 1. CLI flags (`-v/-q`) - highest priority
//! 2. RUST_LOG environment variable
//! 3. Binary-specific defaults - lowest priority

use anyhow::Result;
use clap_verbosity_flag::{LogLevel, Verbosity};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize logging with the specified verbosity level and default filter.
///
/// # Example
///
/// ```no_run
/// use clap::Parser;
/// use clap_verbosity_flag::{Verbosity, InfoLevel};
/// use coffee_shop_common::logging;
///
/// #[derive(Parser)]
/// struct Args {
///     #[clap(flatten)]
///     verbosity: Verbosity<InfoLevel>,
/// }
///
/// let args = Args::parse();
/// logging::init_logging(&args.verbosity, "coffee_shop_api=info").unwrap();
/// ```
pub fn init_logging<L: LogLevel>(verbosity: &Verbosity<L>, default_filter: &str) -> Result<()> {
    let filter = build_filter(verbosity.log_level().map(|l| l.to_string()), default_filter)?;

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .compact(),
        )
        .try_init()?;

    Ok(())
}

/// Initialize JSON-formatted logging, for deployments that ship logs to a collector
pub fn init_json_logging<L: LogLevel>(verbosity: &Verbosity<L>, default_filter: &str) -> Result<()> {
    let filter = build_filter(verbosity.log_level().map(|l| l.to_string()), default_filter)?;

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().json().with_target(true))
        .try_init()?;

    Ok(())
}

fn build_filter(level: Option<String>, default_filter: &str) -> Result<EnvFilter> {
    let filter = match level {
        Some(level) => EnvFilter::try_new(level.to_lowercase())?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
    };
    Ok(filter)
}
