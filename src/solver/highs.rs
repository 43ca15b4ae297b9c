//! HiGHS solver implementation via good_lp.
//!
//! HiGHS is a high-performance open-source linear/mixed-integer programming solver.
//! This implementation wraps it using the good_lp crate for ergonomic Rust usage.

use good_lp::solvers::highs::highs;
use good_lp::solvers::SolutionStatus as BackendStatus;
use good_lp::{
    constraint, variable, variables, Expression, ResolutionError, Solution, SolverModel, Variable,
};

use super::{ConstraintSense, IlpProblem, LpSolution, ObjectiveSense, SolutionStatus, Solver};
use crate::error::{Error, Result};

/// HiGHS-based ILP solver.
#[derive(Debug, Default, Clone)]
pub struct HiGHSSolver;

impl HiGHSSolver {
    pub fn new() -> Self {
        Self
    }
}

impl Solver for HiGHSSolver {
    fn name(&self) -> &'static str {
        "highs"
    }

    fn solve_ilp(&self, problem: &IlpProblem) -> Result<LpSolution> {
        solve_with_good_lp(problem)
    }
}

fn linear_expression(vars: &[Variable], terms: &[(usize, f64)]) -> Expression {
    terms
        .iter()
        .filter(|(_, c)| *c != 0.0)
        .map(|&(i, c)| c * vars[i])
        .sum()
}

/// Build a fresh good_lp model for `problem` and solve it.
fn solve_with_good_lp(problem: &IlpProblem) -> Result<LpSolution> {
    let lp = &problem.lp;
    let n = lp.num_vars();

    if n == 0 {
        return Ok(LpSolution {
            values: vec![],
            objective: 0.0,
            status: SolutionStatus::Optimal,
        });
    }

    let mut is_integer = vec![false; n];
    for &i in &problem.integer_vars {
        if i < n {
            is_integer[i] = true;
        }
    }

    let mut vars = variables!();
    let mut var_list = Vec::with_capacity(n);

    for (i, bounds) in lp.bounds.iter().enumerate().take(n) {
        let mut v = variable();
        if let Some(lb) = bounds.lower {
            v = v.min(lb);
        }
        if let Some(ub) = bounds.upper {
            v = v.max(ub);
        }
        if is_integer[i] {
            v = v.integer();
        }
        var_list.push(vars.add(v));
    }
    // Bounds may be shorter than the objective; remaining variables are free.
    while var_list.len() < n {
        var_list.push(vars.add(variable()));
    }

    let objective: Expression = var_list
        .iter()
        .zip(lp.objective.iter())
        .filter(|(_, c)| **c != 0.0)
        .map(|(v, c)| *c * *v)
        .sum();

    let unsolved = match lp.sense {
        ObjectiveSense::Minimize => vars.minimise(&objective),
        ObjectiveSense::Maximize => vars.maximise(&objective),
    };
    // Exact optimum so repeated requests pick the same lineup.
    let mut model = unsolved
        .using(highs)
        .set_option("mip_rel_gap", 0.0)
        .set_option("mip_abs_gap", 0.0);

    if let Some(limit) = problem.time_limit {
        model = model.set_time_limit(limit.as_secs_f64().max(0.001));
    }

    for constr in &lp.constraints {
        let lhs = linear_expression(&var_list, &constr.terms);
        let rhs = constr.rhs;

        model = match constr.sense {
            ConstraintSense::GreaterEqual => model.with(constraint!(lhs >= rhs)),
            ConstraintSense::LessEqual => model.with(constraint!(lhs <= rhs)),
            ConstraintSense::Equal => model.with(constraint!(lhs == rhs)),
        };
    }

    match model.solve() {
        Ok(solution) => {
            let status = match solution.status() {
                BackendStatus::TimeLimit => SolutionStatus::TimeLimit,
                BackendStatus::Optimal | BackendStatus::GapLimit => SolutionStatus::Optimal,
            };
            let values: Vec<f64> = var_list.iter().map(|v| solution.value(*v)).collect();
            let objective = values
                .iter()
                .zip(lp.objective.iter())
                .map(|(v, c)| v * c)
                .sum();

            Ok(LpSolution {
                values,
                objective,
                status,
            })
        }
        Err(ResolutionError::Infeasible) => Ok(LpSolution::infeasible(n)),
        Err(ResolutionError::Unbounded) => Ok(LpSolution {
            status: SolutionStatus::Unbounded,
            ..LpSolution::infeasible(n)
        }),
        Err(e) => Err(Error::Solver(e.to_string())),
    }
}
