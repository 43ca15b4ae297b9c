//! Command-line interface definitions.

pub mod check;
pub mod modes;
pub mod optimize;
pub mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::{ContestStructure, StrategyMode};

/// Stacksmith - DFS lineup portfolio optimizer.
#[derive(Parser, Debug)]
#[command(name = "stacksmith")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build a portfolio of lineups from a player pool
    Optimize(OptimizeArgs),

    /// Validate configuration, and optionally rules against a pool
    Check(CheckArgs),

    /// List strategy modes and their leverage coefficients
    Modes(ConfigPathArg),
}

/// Shared argument for commands that only need a config path.
#[derive(Parser, Debug)]
pub struct ConfigPathArg {
    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Arguments for the `optimize` subcommand.
#[derive(Parser, Debug)]
pub struct OptimizeArgs {
    /// Path to configuration file; defaults apply when omitted
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Player pool as a JSON array
    #[arg(short, long)]
    pub pool: PathBuf,

    /// Override the number of lineups
    #[arg(short = 'n', long)]
    pub lineups: Option<usize>,

    /// Override the strategy mode
    #[arg(long)]
    pub mode: Option<StrategyMode>,

    /// Override the contest structure
    #[arg(long)]
    pub structure: Option<ContestStructure>,

    /// Lock a showdown captain by player id
    #[arg(long)]
    pub captain: Option<String>,

    /// Print the portfolio as JSON instead of tables
    #[arg(long)]
    pub json: bool,

    /// Override log level (debug, info, warn, error)
    #[arg(long)]
    pub log_level: Option<String>,
}

/// Arguments for the `check` subcommand.
#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// Path to configuration file
    #[arg(short, long)]
    pub config: PathBuf,

    /// Player pool to validate the configured rules against
    #[arg(short, long)]
    pub pool: Option<PathBuf>,
}
