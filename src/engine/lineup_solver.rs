//! Single-lineup solver.
//!
//! Solves one lineup program and, when it is infeasible, names the
//! constraint family responsible by re-solving with families layered in
//! [`ConstraintFamily::ORDER`].

use std::time::{Duration, Instant};

use tracing::debug;

use super::model::{check_pool_coverage, ConstraintFamily, LineupModel};
use super::scoring::LeverageConfig;
use crate::domain::{ContestRules, Lineup, PlayerId, PlayerPool};
use crate::error::{Error, InfeasibleReason, Result, SettingsError};
use crate::solver::{IlpProblem, LpSolution, SolutionStatus, Solver};

/// Solves lineups for one request's pool and rules.
///
/// Holds only read-only state; every call builds a fresh program, so a
/// single instance can be shared across worker threads.
pub struct LineupSolver<'a> {
    model: LineupModel<'a>,
    solver: &'a dyn Solver,
}

impl<'a> LineupSolver<'a> {
    /// Prepare a solver, failing fast when the pool cannot fill the roster.
    pub fn new(
        pool: &'a PlayerPool,
        rules: &'a ContestRules,
        leverage: &LeverageConfig,
        solver: &'a dyn Solver,
    ) -> Result<Self> {
        check_pool_coverage(pool, rules.structure.groups())?;
        Ok(Self {
            model: LineupModel::new(pool, rules, leverage),
            solver,
        })
    }

    pub fn pool(&self) -> &PlayerPool {
        self.model.pool()
    }

    /// Best lineup differing from every lineup in `exclusions`, optionally
    /// with `fixed_captain` pinned to the captain slot.
    ///
    /// Every backend call, including the diagnostic re-solves, is limited
    /// to the time left before `deadline`.
    ///
    /// Returns [`Error::Infeasible`] naming the failing constraint family
    /// when no such lineup exists, and [`Error::DeadlineExceeded`] when the
    /// deadline passes before a result is proven.
    pub fn solve(
        &self,
        exclusions: &[&Lineup],
        fixed_captain: Option<&PlayerId>,
        deadline: Option<Instant>,
    ) -> Result<Lineup> {
        let captain = self.captain_index(fixed_captain)?;
        let problem = self.model.build(&ConstraintFamily::ORDER, exclusions, captain);

        let (problem, solution) = self.run(problem, deadline)?;
        match solution.status {
            SolutionStatus::Optimal => {
                let lineup = self.model.decode(&problem, &solution)?;
                debug!(
                    solver = self.solver.name(),
                    captain = ?lineup.captain_id,
                    salary = lineup.total_salary,
                    objective = lineup.objective,
                    "lineup solved"
                );
                Ok(lineup)
            }
            SolutionStatus::Infeasible => {
                let reason = self.diagnose(exclusions, captain, deadline)?;
                debug!(
                    %reason,
                    captain = ?fixed_captain,
                    exclusions = exclusions.len(),
                    "lineup infeasible"
                );
                Err(Error::Infeasible { reason })
            }
            SolutionStatus::TimeLimit => Err(Error::DeadlineExceeded),
            SolutionStatus::Unbounded => Err(Error::Solver(
                "lineup program reported unbounded".to_string(),
            )),
        }
    }

    fn captain_index(&self, fixed_captain: Option<&PlayerId>) -> Result<Option<usize>> {
        let Some(id) = fixed_captain else {
            return Ok(None);
        };
        if !self.model.rules().structure.is_showdown() {
            return Err(SettingsError::LockedCaptainOnClassic.into());
        }
        self.pool()
            .index_of(id)
            .map(Some)
            .ok_or_else(|| SettingsError::UnknownLockedCaptain { id: id.to_string() }.into())
    }

    /// Hand `problem` to the backend with whatever time is left.
    fn run(
        &self,
        problem: IlpProblem,
        deadline: Option<Instant>,
    ) -> Result<(IlpProblem, LpSolution)> {
        let problem = problem.with_time_limit(remaining(deadline)?);
        let solution = self.solver.solve_ilp(&problem)?;
        Ok((problem, solution))
    }

    /// Whether `problem` has any solution. A diagnostic solve cut off by
    /// the time limit proves nothing, so it ends the diagnosis.
    fn is_feasible(&self, problem: IlpProblem, deadline: Option<Instant>) -> Result<bool> {
        match self.run(problem, deadline)?.1.status {
            SolutionStatus::Optimal | SolutionStatus::Unbounded => Ok(true),
            SolutionStatus::Infeasible => Ok(false),
            SolutionStatus::TimeLimit => Err(Error::DeadlineExceeded),
        }
    }

    /// Find the first constraint family whose addition makes the program
    /// infeasible. Only called after the full program failed.
    fn diagnose(
        &self,
        exclusions: &[&Lineup],
        captain: Option<usize>,
        deadline: Option<Instant>,
    ) -> Result<InfeasibleReason> {
        let order = &ConstraintFamily::ORDER;
        let exhausted = ConstraintFamily::Exclusions.reason();

        // Usual case deep into a portfolio: everything but the cuts is fine.
        if !exclusions.is_empty() {
            let problem = self.model.build(&order[..order.len() - 1], exclusions, captain);
            if self.is_feasible(problem, deadline)? {
                return Ok(exhausted);
            }
        }

        for k in 1..order.len() {
            let family = order[k - 1];
            if k > 1 && !self.is_active(family, exclusions, captain) {
                continue;
            }
            let problem = self.model.build(&order[..k], exclusions, captain);
            if !self.is_feasible(problem, deadline)? {
                return Ok(family.reason());
            }
        }

        Ok(exhausted)
    }

    /// Whether `family` adds any constraint for this request.
    fn is_active(
        &self,
        family: ConstraintFamily,
        exclusions: &[&Lineup],
        captain: Option<usize>,
    ) -> bool {
        let rules = self.model.rules();
        match family {
            ConstraintFamily::Positions | ConstraintFamily::Salary => true,
            ConstraintFamily::Exposure => rules.team_limit().is_some() || rules.game_limit().is_some(),
            ConstraintFamily::Ownership => rules.max_avg_ownership < 1.0,
            ConstraintFamily::Stacking => rules.stacking_rules().any(),
            ConstraintFamily::Captain => captain.is_some(),
            ConstraintFamily::Exclusions => !exclusions.is_empty(),
        }
    }
}

/// Time left before `deadline`; `DeadlineExceeded` once it has passed.
fn remaining(deadline: Option<Instant>) -> Result<Option<Duration>> {
    match deadline {
        None => Ok(None),
        Some(deadline) => {
            let left = deadline.saturating_duration_since(Instant::now());
            if left.is_zero() {
                Err(Error::DeadlineExceeded)
            } else {
                Ok(Some(left))
            }
        }
    }
}

/// Solve a single lineup without keeping the prepared model around.
pub fn solve(
    pool: &PlayerPool,
    rules: &ContestRules,
    leverage: &LeverageConfig,
    solver: &dyn Solver,
    exclusions: &[&Lineup],
    fixed_captain: Option<&PlayerId>,
) -> Result<Lineup> {
    LineupSolver::new(pool, rules, leverage, solver)?.solve(exclusions, fixed_captain, None)
}
