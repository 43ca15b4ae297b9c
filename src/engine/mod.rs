//! Lineup optimization engine.
//!
//! - [`scoring`] - strategy-mode objective weights
//! - [`model`] - MILP construction and decoding for one lineup
//! - [`lineup_solver`] - single-lineup solve plus infeasibility diagnosis
//! - [`captain`] - showdown captain ranking and parallel fan-out
//! - [`portfolio`] - multi-lineup generation under a time budget

pub mod captain;
pub mod lineup_solver;
pub mod model;
pub mod portfolio;
pub mod scoring;

pub use captain::{rank_captains, CaptainCandidate, CaptainRound, CaptainSearch};
pub use lineup_solver::{solve, LineupSolver};
pub use model::{check_pool_coverage, ConstraintFamily, LineupModel};
pub use portfolio::{CancelFlag, EngineSettings, PortfolioGenerator, TimeBudget};
pub use scoring::LeverageConfig;
