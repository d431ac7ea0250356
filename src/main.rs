// src/main.rs

// dependencies
use anyhow::Context;
use clap::Parser;
use hf::config::{ServerConfig, default_config_path, load_config};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Serve static files from several directories, each on its own address.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Config file with one `<address> <directory>` binding per line
    /// [default: ~/hf.conf]
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Enable directory listing
    #[arg(short = 'd', long = "dir-listing", default_value_t = false)]
    dir_listing: bool,
}

fn main() {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    if let Err(err) = start(args) {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

fn start(args: Args) -> anyhow::Result<()> {
    let config_path = match args.config {
        Some(path) => path,
        None => default_config_path()?,
    };
    let bindings = load_config(&config_path)?;

    let config = ServerConfig {
        bindings,
        dir_listing: args.dir_listing,
    };

    let runtime = tokio::runtime::Runtime::new().context("could not start the async runtime")?;
    runtime.block_on(hf::run(config))?;
    Ok(())
}
