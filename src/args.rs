use crate::config::CONFIG_FILE_NAME;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the config file
    #[clap(short, long, default_value = CONFIG_FILE_NAME)]
    pub config: PathBuf,
    #[clap(subcommand)]
    pub subcommand: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the effective request logger settings
    PrintConfig,
}
