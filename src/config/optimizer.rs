//! Engine tuning: time budget and captain search width.

use std::time::Duration;

use serde::Deserialize;

use crate::engine::TimeBudget;

/// `[optimizer]` section.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    /// No new solve round starts after this many seconds.
    pub soft_time_limit_secs: f64,

    /// Time limit handed to the MILP backend, measured from request start.
    pub hard_time_limit_secs: f64,

    /// Number of showdown captain candidates (K).
    pub captain_candidates: usize,

    /// Captain search threads. 0 picks `min(captain_candidates, cores)`.
    pub worker_threads: usize,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            soft_time_limit_secs: 30.0,
            hard_time_limit_secs: 90.0,
            captain_candidates: 5,
            worker_threads: 0,
        }
    }
}

impl OptimizerConfig {
    /// Budget for one request. Callers should validate the config first;
    /// negative or non-finite values collapse to zero here.
    pub fn time_budget(&self) -> TimeBudget {
        TimeBudget::new(
            secs(self.soft_time_limit_secs),
            secs(self.hard_time_limit_secs),
        )
    }
}

fn secs(value: f64) -> Duration {
    Duration::try_from_secs_f64(value).unwrap_or(Duration::ZERO)
}
