//! Showdown captain search.
//!
//! Ranks the pool by points per salary unit, keeps the top K as captain
//! candidates, and solves one lineup per candidate with that player pinned
//! to the captain slot. The K solves are independent and run on a bounded
//! worker pool; results come back in rank order.

use std::cmp::Ordering;
use std::time::Instant;

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::debug;

use super::lineup_solver::LineupSolver;
use crate::domain::{Lineup, PlayerId, PlayerPool};
use crate::error::{Error, InfeasibleReason, Result};

/// A lineup built around one pinned captain.
#[derive(Debug, Clone)]
pub struct CaptainCandidate {
    pub captain: PlayerId,
    pub lineup: Lineup,
}

/// Outcome of one fan-out over captain candidates.
#[derive(Debug, Clone, Default)]
pub struct CaptainRound {
    /// Successful candidates, in captain rank order.
    pub candidates: Vec<CaptainCandidate>,
    /// Captains that could not anchor a lineup, with the reason.
    pub failures: Vec<(PlayerId, InfeasibleReason)>,
    /// Captains skipped because the caller asked to stop or the deadline
    /// passed before their solve finished.
    pub skipped: Vec<PlayerId>,
}

/// Bounded brute-force search over the top-K captain candidates.
pub struct CaptainSearch {
    candidates: usize,
    workers: ThreadPool,
}

impl CaptainSearch {
    /// `worker_threads == 0` sizes the pool to `min(candidates, cores)`.
    pub fn new(candidates: usize, worker_threads: usize) -> Result<Self> {
        let candidates = candidates.max(1);
        let threads = match worker_threads {
            0 => candidates.min(num_cpus::get()),
            n => n.min(candidates),
        }
        .max(1);

        let workers = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("captain-search-{i}"))
            .build()
            .map_err(|e| Error::Solver(format!("failed to start captain worker pool: {e}")))?;

        Ok(Self {
            candidates,
            workers,
        })
    }

    pub fn candidate_count(&self) -> usize {
        self.candidates
    }

    pub fn worker_threads(&self) -> usize {
        self.workers.current_num_threads()
    }

    /// Top-K players by value, descending; equal values fall back to id order.
    pub fn rank(&self, pool: &PlayerPool) -> Vec<PlayerId> {
        rank_captains(pool, self.candidates)
    }

    /// Solve one lineup per captain in `captains`.
    ///
    /// `exclusions_for` supplies the no-good cuts for each captain.
    /// `should_stop` is consulted before each solve starts; a solve already
    /// running is allowed to finish unless it reaches `deadline`.
    pub fn run<'s, E, S>(
        &self,
        solver: &LineupSolver<'_>,
        captains: &[PlayerId],
        exclusions_for: E,
        deadline: Option<Instant>,
        should_stop: S,
    ) -> Result<CaptainRound>
    where
        E: Fn(&PlayerId) -> Vec<&'s Lineup> + Sync,
        S: Fn() -> bool + Sync,
    {
        let results: Vec<(PlayerId, Option<Result<Lineup>>)> = self.workers.install(|| {
            captains
                .par_iter()
                .map(|captain| {
                    if should_stop() {
                        return (captain.clone(), None);
                    }
                    let exclusions = exclusions_for(captain);
                    let result = solver.solve(&exclusions, Some(captain), deadline);
                    (captain.clone(), Some(result))
                })
                .collect()
        });

        let mut round = CaptainRound::default();
        for (captain, result) in results {
            match result {
                None | Some(Err(Error::DeadlineExceeded)) => round.skipped.push(captain),
                Some(Ok(lineup)) => round.candidates.push(CaptainCandidate { captain, lineup }),
                Some(Err(Error::Infeasible { reason })) => round.failures.push((captain, reason)),
                Some(Err(e)) => return Err(e),
            }
        }

        debug!(
            solved = round.candidates.len(),
            failed = round.failures.len(),
            skipped = round.skipped.len(),
            "captain round complete"
        );
        Ok(round)
    }
}

/// Rank captains by `objective_score / salary`, highest first.
pub fn rank_captains(pool: &PlayerPool, k: usize) -> Vec<PlayerId> {
    let mut ranked: Vec<_> = pool.iter().collect();
    ranked.sort_by(|a, b| {
        b.value()
            .partial_cmp(&a.value())
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.id.cmp(&b.id))
    });
    ranked.into_iter().take(k).map(|p| p.id.clone()).collect()
}
