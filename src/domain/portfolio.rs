//! Portfolio result returned for one optimization request.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::lineup::Lineup;
use crate::error::InfeasibleReason;

/// Terminal state of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortfolioStatus {
    /// Exactly the requested number of lineups.
    Complete,
    /// Fewer lineups than requested; see [`StopReason`].
    Partial,
    /// No lineup could be produced.
    Infeasible,
}

impl fmt::Display for PortfolioStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Complete => "complete",
            Self::Partial => "partial",
            Self::Infeasible => "infeasible",
        };
        f.write_str(s)
    }
}

/// Why the generator stopped adding lineups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "reason", rename_all = "snake_case")]
pub enum StopReason {
    Filled,
    TimeBudget,
    Cancelled,
    /// No distinct lineup remained under the accumulated exclusions.
    Exhausted,
    /// The next lineup could not satisfy a hard constraint.
    Infeasible(InfeasibleReason),
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Filled => f.write_str("filled"),
            Self::TimeBudget => f.write_str("time budget exhausted"),
            Self::Cancelled => f.write_str("cancelled"),
            Self::Exhausted => f.write_str("no distinct lineups remain"),
            Self::Infeasible(reason) => write!(f, "{reason} constraint cannot be satisfied"),
        }
    }
}

/// Ordered lineups for one request plus how the request ended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineupPortfolio {
    pub status: PortfolioStatus,
    pub requested: usize,
    pub count: usize,
    pub stop_reason: StopReason,
    pub elapsed_ms: u64,
    pub lineups: Vec<Lineup>,
}

impl LineupPortfolio {
    /// Assemble the final portfolio, deriving its status.
    ///
    /// A request that produced nothing is `Infeasible` unless it was cut
    /// short by the clock or the caller, in which case it is an empty
    /// `Partial`.
    pub fn finish(
        lineups: Vec<Lineup>,
        requested: usize,
        stop_reason: StopReason,
        elapsed_ms: u64,
    ) -> Self {
        let count = lineups.len();
        let status = if count >= requested {
            PortfolioStatus::Complete
        } else if count == 0
            && !matches!(stop_reason, StopReason::TimeBudget | StopReason::Cancelled)
        {
            PortfolioStatus::Infeasible
        } else {
            PortfolioStatus::Partial
        };
        let stop_reason = if status == PortfolioStatus::Complete {
            StopReason::Filled
        } else {
            stop_reason
        };

        Self {
            status,
            requested,
            count,
            stop_reason,
            elapsed_ms,
            lineups,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.status == PortfolioStatus::Complete
    }

    /// The infeasibility category, when the request stopped on one.
    pub fn infeasible_reason(&self) -> Option<InfeasibleReason> {
        match self.stop_reason {
            StopReason::Infeasible(reason) => Some(reason),
            StopReason::Exhausted => Some(InfeasibleReason::Exhausted),
            _ => None,
        }
    }

    /// True when no two lineups share a player set and captain.
    pub fn all_distinct(&self) -> bool {
        let mut seen = HashSet::with_capacity(self.lineups.len());
        self.lineups.iter().all(|l| seen.insert(l.key()))
    }
}
