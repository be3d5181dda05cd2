//! sitesweep - sitemap-driven Lighthouse audits
//!
//! Main entry point for the CLI application.

use clap::Parser;
use std::path::PathBuf;
use sitesweep::{Config, Runner};
use tracing_subscriber::EnvFilter;

/// sitesweep - audit every page listed in a site's sitemaps
#[derive(Parser, Debug)]
#[command(name = "sitesweep")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Config file (default: ~/.config/sitesweep/config.toml)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Directory reports are written to
    #[arg(long, short = 'o')]
    output_dir: Option<PathBuf>,

    /// Sitemap URL; repeat to audit several (replaces the configured list)
    #[arg(long = "sitemap", short = 's')]
    sitemaps: Vec<String>,

    /// Enable debug output
    #[arg(long, short = 'd')]
    debug: bool,

    /// Print the effective configuration and exit
    #[arg(long)]
    print_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let default_directive = if args.debug {
        "sitesweep=debug"
    } else {
        "sitesweep=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive)),
        )
        .init();

    // Build configuration
    let mut config = match args.config {
        Some(ref path) => {
            let _ = dotenvy::dotenv();
            Config::load_from(path)?
        }
        None => Config::load(),
    };

    // Apply CLI overrides
    if let Some(output_dir) = args.output_dir {
        config.audit.output_dir = output_dir;
    }

    if !args.sitemaps.is_empty() {
        config.sitemaps.urls = args.sitemaps;
    }

    if args.print_config {
        println!("{}", config.to_toml()?);
        return Ok(());
    }

    let outcome = match Runner::from_config(&config) {
        Ok(runner) => runner.run().await,
        Err(e) => Err(e),
    };

    if let Err(e) = outcome {
        tracing::error!(error = %e, "Error initializing audit run");
        std::process::exit(1);
    }

    Ok(())
}
