//! resolve-backend: one-shot backend resolution
//!
//! Loads the proxy configuration, runs the configured resolver once and
//! prints the backend host. Exits non-zero when resolution fails, the same
//! condition that stops the proxy at startup.

use std::path::PathBuf;

use clap::Parser;

use host_rewrite_proxy::config::loader::load_config;
use host_rewrite_proxy::resolver::{Resolver, VersionResolver};
use host_rewrite_proxy::ProxyConfig;

#[derive(Parser)]
#[command(name = "resolve-backend")]
#[command(about = "Print the backend host the proxy would forward to", long_about = None)]
struct Cli {
    /// Path to the proxy's TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ProxyConfig::default(),
    };

    let resolver = Resolver::from_config(&config.resolver)?;
    let host = resolver.resolve().await?;
    println!("{}", host);
    Ok(())
}
