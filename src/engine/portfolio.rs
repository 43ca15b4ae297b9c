//! Portfolio generator.
//!
//! Builds up to N pairwise-distinct lineups by repeated solving. Every
//! accepted lineup becomes a no-good cut for later solves. Showdown
//! requests without a locked captain rotate across the top-K captain
//! candidates.
//!
//! The generator is an anytime algorithm: the clock and the cancel flag are
//! checked between rounds, never inside a solve, and whatever has been
//! accepted when either fires is returned as a partial portfolio.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, info_span, warn};
use uuid::Uuid;

use super::captain::{CaptainCandidate, CaptainSearch};
use super::lineup_solver::LineupSolver;
use super::scoring::LeverageConfig;
use crate::domain::{ContestRules, Lineup, LineupPortfolio, PlayerId, PlayerPool, StopReason};
use crate::error::{Error, InfeasibleReason, Result, SettingsError};
use crate::solver::{HiGHSSolver, Solver};

/// Wall-clock budget for one `generate` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeBudget {
    /// No new round starts once this much time has passed.
    pub soft: Duration,
    /// Upper bound handed to every solve as its time limit.
    pub hard: Duration,
}

impl Default for TimeBudget {
    fn default() -> Self {
        Self {
            soft: Duration::from_secs(30),
            hard: Duration::from_secs(90),
        }
    }
}

impl TimeBudget {
    pub fn new(soft: Duration, hard: Duration) -> Self {
        Self { soft, hard }
    }

    /// A budget whose soft and hard limits coincide.
    pub fn fixed(limit: Duration) -> Self {
        Self::new(limit, limit)
    }

    pub fn validate(&self) -> std::result::Result<(), SettingsError> {
        if self.soft.is_zero() || self.hard.is_zero() {
            return Err(SettingsError::TimeBudget {
                reason: "limits must be positive".to_string(),
            });
        }
        if self.soft > self.hard {
            return Err(SettingsError::TimeBudget {
                reason: format!(
                    "soft limit {:?} exceeds hard limit {:?}",
                    self.soft, self.hard
                ),
            });
        }
        Ok(())
    }
}

/// Cooperative cancellation shared between a caller and a running request.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request that the generator stop issuing new solves.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Engine knobs that are not part of a contest's rules.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineSettings {
    pub leverage: LeverageConfig,
    /// Captain candidates (K) tried per showdown round.
    pub captain_candidates: usize,
    /// Captain worker threads; 0 picks `min(K, cores)`.
    pub worker_threads: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            leverage: LeverageConfig::default(),
            captain_candidates: 5,
            worker_threads: 0,
        }
    }
}

struct Clock {
    started: Instant,
    budget: TimeBudget,
}

impl Clock {
    fn start(budget: TimeBudget) -> Self {
        Self {
            started: Instant::now(),
            budget,
        }
    }

    fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    fn soft_expired(&self) -> bool {
        self.elapsed() >= self.budget.soft
    }

    fn hard_expired(&self) -> bool {
        self.elapsed() >= self.budget.hard
    }

    /// Instant after which no solve may keep running.
    fn deadline(&self) -> Instant {
        self.started + self.budget.hard
    }
}

/// Per-captain cache entry for showdown rotation.
#[derive(Debug, Clone)]
enum CaptainSlot {
    /// Needs a (re)solve.
    Stale,
    Ready(Lineup),
    Failed(InfeasibleReason),
}

/// Assembles lineup portfolios.
///
/// Holds no per-request state; one generator can serve concurrent
/// requests from different threads.
pub struct PortfolioGenerator {
    solver: Box<dyn Solver>,
    settings: EngineSettings,
    captain_search: CaptainSearch,
}

impl PortfolioGenerator {
    pub fn new(solver: Box<dyn Solver>, settings: EngineSettings) -> Result<Self> {
        let captain_search =
            CaptainSearch::new(settings.captain_candidates, settings.worker_threads)?;
        Ok(Self {
            solver,
            settings,
            captain_search,
        })
    }

    /// Generator backed by HiGHS.
    pub fn with_highs(settings: EngineSettings) -> Result<Self> {
        Self::new(Box::new(HiGHSSolver::new()), settings)
    }

    /// Generate up to `num_lineups` distinct lineups within `budget`.
    pub fn generate(
        &self,
        pool: &PlayerPool,
        rules: &ContestRules,
        num_lineups: usize,
        budget: TimeBudget,
    ) -> Result<LineupPortfolio> {
        self.generate_with_cancel(pool, rules, num_lineups, budget, &CancelFlag::new())
    }

    /// [`generate`](Self::generate) with a caller-held cancel flag.
    ///
    /// Invalid settings and pools that cannot fill the roster fail with
    /// `Err` before any solve. Everything else, including infeasibility,
    /// is reported through the returned portfolio's status.
    pub fn generate_with_cancel(
        &self,
        pool: &PlayerPool,
        rules: &ContestRules,
        num_lineups: usize,
        budget: TimeBudget,
        cancel: &CancelFlag,
    ) -> Result<LineupPortfolio> {
        let span = info_span!(
            "generate",
            request = %Uuid::new_v4(),
            structure = %rules.structure,
            mode = %rules.strategy_mode,
            requested = num_lineups,
        );
        let _guard = span.enter();

        budget.validate()?;
        rules.validate(pool, num_lineups)?;
        let solver = LineupSolver::new(pool, rules, &self.settings.leverage, self.solver.as_ref())?;

        let clock = Clock::start(budget);
        info!(
            players = pool.len(),
            solver = self.solver.name(),
            soft_secs = budget.soft.as_secs_f64(),
            hard_secs = budget.hard.as_secs_f64(),
            "solving portfolio"
        );

        let mut lineups = Vec::with_capacity(num_lineups);
        let stop = if rules.structure.is_showdown() && rules.locked_captain_id.is_none() {
            self.fill_rotating_captains(&solver, num_lineups, &clock, cancel, &mut lineups)?
        } else {
            let captain = rules.locked_captain_id.as_ref();
            fill_sequential(&solver, captain, num_lineups, &clock, cancel, &mut lineups)?
        };

        let elapsed_ms = u64::try_from(clock.elapsed().as_millis()).unwrap_or(u64::MAX);
        let portfolio = LineupPortfolio::finish(lineups, num_lineups, stop, elapsed_ms);

        if portfolio.is_complete() {
            info!(count = portfolio.count, elapsed_ms, "portfolio complete");
        } else {
            warn!(
                status = %portfolio.status,
                count = portfolio.count,
                reason = %portfolio.stop_reason,
                elapsed_ms,
                "portfolio short of request"
            );
        }
        Ok(portfolio)
    }

    /// Showdown without a locked captain: each round takes the best
    /// candidate across captains, preferring captains not yet overused.
    fn fill_rotating_captains(
        &self,
        solver: &LineupSolver<'_>,
        num_lineups: usize,
        clock: &Clock,
        cancel: &CancelFlag,
        lineups: &mut Vec<Lineup>,
    ) -> Result<StopReason> {
        let captains = self.captain_search.rank(solver.pool());
        let usage_cap = num_lineups.div_ceil(captains.len().max(1));
        let mut slots: HashMap<PlayerId, CaptainSlot> = captains
            .iter()
            .map(|c| (c.clone(), CaptainSlot::Stale))
            .collect();
        let mut usage: HashMap<PlayerId, usize> = HashMap::new();

        debug!(candidates = ?captains, usage_cap, "captain rotation");

        while lineups.len() < num_lineups {
            if let Some(stop) = checkpoint(clock, cancel) {
                return Ok(stop);
            }

            let stale: Vec<PlayerId> = captains
                .iter()
                .filter(|c| matches!(slots.get(*c), Some(CaptainSlot::Stale)))
                .cloned()
                .collect();

            if !stale.is_empty() {
                let accepted: &[Lineup] = lineups;
                let round = match self.captain_search.run(
                    solver,
                    &stale,
                    |captain| {
                        accepted
                            .iter()
                            .filter(|l| l.captain_id.as_ref() == Some(captain))
                            .collect()
                    },
                    Some(clock.deadline()),
                    || cancel.is_cancelled() || clock.hard_expired(),
                ) {
                    Ok(round) => round,
                    Err(Error::Solver(msg)) if clock.hard_expired() => {
                        debug!(error = %msg, "captain round cut off by hard time limit");
                        return Ok(StopReason::TimeBudget);
                    }
                    Err(e) => return Err(e),
                };

                for CaptainCandidate { captain, lineup } in round.candidates {
                    slots.insert(captain, CaptainSlot::Ready(lineup));
                }
                for (captain, reason) in round.failures {
                    slots.insert(captain, CaptainSlot::Failed(reason));
                }
                if !round.skipped.is_empty() {
                    // Cancelled or out of time mid-round; the checkpoint decides which.
                    return Ok(checkpoint(clock, cancel).unwrap_or(StopReason::TimeBudget));
                }
            }

            let Some(captain) = pick_candidate(&captains, &slots, &usage, usage_cap) else {
                return Ok(exhausted_reason(&captains, &slots, lineups.is_empty()));
            };

            if let Some(CaptainSlot::Ready(lineup)) = slots.insert(captain.clone(), CaptainSlot::Stale)
            {
                debug!(
                    captain = %captain,
                    objective = lineup.objective,
                    salary = lineup.total_salary,
                    "accepted showdown lineup"
                );
                *usage.entry(captain).or_insert(0) += 1;
                lineups.push(lineup);
            }
        }

        Ok(StopReason::Filled)
    }
}

/// Classic slates and locked-captain showdowns: one solve per round, each
/// excluding every lineup accepted so far.
fn fill_sequential(
    solver: &LineupSolver<'_>,
    captain: Option<&PlayerId>,
    num_lineups: usize,
    clock: &Clock,
    cancel: &CancelFlag,
    lineups: &mut Vec<Lineup>,
) -> Result<StopReason> {
    while lineups.len() < num_lineups {
        if let Some(stop) = checkpoint(clock, cancel) {
            return Ok(stop);
        }

        let exclusions: Vec<&Lineup> = lineups.iter().collect();
        match solver.solve(&exclusions, captain, Some(clock.deadline())) {
            Ok(lineup) => {
                debug!(
                    index = lineups.len(),
                    objective = lineup.objective,
                    salary = lineup.total_salary,
                    "accepted lineup"
                );
                lineups.push(lineup);
            }
            Err(Error::Infeasible { reason }) => return Ok(stop_for(reason)),
            Err(Error::DeadlineExceeded) => {
                debug!("solve cut off by hard time limit");
                return Ok(StopReason::TimeBudget);
            }
            Err(Error::Solver(msg)) if clock.hard_expired() => {
                debug!(error = %msg, "solve cut off by hard time limit");
                return Ok(StopReason::TimeBudget);
            }
            Err(e) => return Err(e),
        }
    }

    Ok(StopReason::Filled)
}

/// Round-boundary check for cancellation and the soft budget.
fn checkpoint(clock: &Clock, cancel: &CancelFlag) -> Option<StopReason> {
    if cancel.is_cancelled() {
        return Some(StopReason::Cancelled);
    }
    if clock.soft_expired() {
        return Some(StopReason::TimeBudget);
    }
    None
}

fn stop_for(reason: InfeasibleReason) -> StopReason {
    match reason {
        InfeasibleReason::Exhausted => StopReason::Exhausted,
        other => StopReason::Infeasible(other),
    }
}

/// Highest-objective ready candidate whose captain is under `usage_cap`,
/// else the highest-objective ready candidate. Ties keep rank order.
fn pick_candidate(
    captains: &[PlayerId],
    slots: &HashMap<PlayerId, CaptainSlot>,
    usage: &HashMap<PlayerId, usize>,
    usage_cap: usize,
) -> Option<PlayerId> {
    let ready: Vec<(&PlayerId, f64)> = captains
        .iter()
        .filter_map(|c| match slots.get(c) {
            Some(CaptainSlot::Ready(lineup)) => Some((c, lineup.objective)),
            _ => None,
        })
        .collect();

    let under_cap = best_of(
        ready
            .iter()
            .copied()
            .filter(|(c, _)| usage.get(*c).copied().unwrap_or(0) < usage_cap),
    );
    under_cap
        .or_else(|| best_of(ready.iter().copied()))
        .cloned()
}

fn best_of<'a>(items: impl Iterator<Item = (&'a PlayerId, f64)>) -> Option<&'a PlayerId> {
    items
        .fold(None::<(&PlayerId, f64)>, |best, (c, obj)| match best {
            Some((_, best_obj)) if best_obj >= obj => best,
            _ => Some((c, obj)),
        })
        .map(|(c, _)| c)
}

/// Stop reason once no captain has a candidate left.
///
/// With lineups already accepted the pool's diversity is spent; with none,
/// the top-ranked captain's failure names the binding constraint.
fn exhausted_reason(
    captains: &[PlayerId],
    slots: &HashMap<PlayerId, CaptainSlot>,
    portfolio_empty: bool,
) -> StopReason {
    if !portfolio_empty {
        return StopReason::Exhausted;
    }
    captains
        .iter()
        .find_map(|c| match slots.get(c) {
            Some(CaptainSlot::Failed(reason)) => Some(stop_for(*reason)),
            _ => None,
        })
        .unwrap_or(StopReason::Exhausted)
}
