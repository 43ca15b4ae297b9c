//! Stacksmith - DFS lineup portfolio optimizer.
//!
//! Builds portfolios of distinct daily-fantasy lineups from a projected
//! player pool by repeated mixed-integer solving, under salary, roster,
//! exposure, ownership and stacking rules.
//!
//! # Modules
//!
//! - [`domain`] - Players, roster structures, contest rules, lineups and portfolios
//! - [`engine`] - Lineup model, single-lineup solver, captain search, portfolio generator
//! - [`solver`] - MILP abstraction with a HiGHS backend
//! - [`config`] - TOML configuration and logging setup
//! - [`cli`] - Command-line interface
//! - [`error`] - Error types for the crate
//!
//! # Example
//!
//! ```no_run
//! use stacksmith::domain::{ContestRules, PlayerPool};
//! use stacksmith::engine::{EngineSettings, PortfolioGenerator, TimeBudget};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = PlayerPool::from_json(&std::fs::read_to_string("players.json")?)?;
//!     let generator = PortfolioGenerator::with_highs(EngineSettings::default())?;
//!     let portfolio = generator.generate(&pool, &ContestRules::classic(), 5, TimeBudget::default())?;
//!     println!("{} lineups ({})", portfolio.count, portfolio.status);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod solver;

pub use error::{Error, Result};
