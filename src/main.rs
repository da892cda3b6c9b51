mod args;
mod config;
mod error;
mod web;

pub type Result<T> = std::result::Result<T, error::Error>;

use args::{Args, Command};
use clap::Parser;
use config::Config;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = Config::load(&args.config)?;

    match args.subcommand {
        None => web::run(config).await,
        Some(Command::PrintConfig) => print_config(&config),
    }
}

fn print_config(config: &Config) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(&config.logger)?;
    println!("{json}");

    Ok(())
}
