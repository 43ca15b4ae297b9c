//! Solver abstraction for integer programming.
//!
//! The lineup engine formulates every solve as an [`IlpProblem`] and hands
//! it to a [`Solver`]. Problems are plain data: each call builds a fresh
//! backend model from scratch, so no solver state carries over between
//! calls and one solver value can be shared across worker threads.

mod highs;

pub use highs::HiGHSSolver;

use std::time::Duration;

use crate::error::Result;

/// A linear/integer programming solver.
///
/// Implementations wrap specific solver backends and must be thread-safe;
/// captain search calls `solve_ilp` concurrently from a worker pool.
pub trait Solver: Send + Sync {
    /// Solver name for logging/config.
    fn name(&self) -> &'static str;

    /// Solve with integer constraints on the specified variables.
    ///
    /// Infeasible and unbounded problems are reported through
    /// [`LpSolution::status`]; `Err` is reserved for backend failures.
    fn solve_ilp(&self, problem: &IlpProblem) -> Result<LpSolution>;
}

/// Direction of optimization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ObjectiveSense {
    #[default]
    Minimize,
    Maximize,
}

/// Linear programming problem definition.
#[derive(Debug, Clone, Default)]
pub struct LpProblem {
    pub sense: ObjectiveSense,
    /// Objective coefficients, one per variable.
    pub objective: Vec<f64>,
    pub constraints: Vec<Constraint>,
    /// Variable bounds, one per variable.
    pub bounds: Vec<VariableBounds>,
}

impl LpProblem {
    #[must_use]
    pub fn new(num_vars: usize) -> Self {
        Self {
            sense: ObjectiveSense::Minimize,
            objective: vec![0.0; num_vars],
            constraints: Vec::new(),
            bounds: vec![VariableBounds::default(); num_vars],
        }
    }

    #[must_use]
    pub fn maximize(mut self) -> Self {
        self.sense = ObjectiveSense::Maximize;
        self
    }

    #[must_use]
    pub fn num_vars(&self) -> usize {
        self.objective.len()
    }

    pub fn add_constraint(&mut self, constraint: Constraint) {
        self.constraints.push(constraint);
    }
}

/// Integer linear programming problem.
#[derive(Debug, Clone, Default)]
pub struct IlpProblem {
    pub lp: LpProblem,
    /// Indices of variables that must be integer.
    pub integer_vars: Vec<usize>,
    /// Wall-clock limit handed to the backend, if any.
    pub time_limit: Option<Duration>,
}

impl IlpProblem {
    #[must_use]
    pub const fn new(lp: LpProblem, integer_vars: Vec<usize>) -> Self {
        Self {
            lp,
            integer_vars,
            time_limit: None,
        }
    }

    /// Create with all variables as binary (0-1).
    #[must_use]
    pub fn all_binary(mut lp: LpProblem) -> Self {
        lp.bounds = vec![VariableBounds::binary(); lp.num_vars()];
        let integer_vars: Vec<usize> = (0..lp.num_vars()).collect();
        Self::new(lp, integer_vars)
    }

    #[must_use]
    pub fn with_time_limit(mut self, limit: Option<Duration>) -> Self {
        self.time_limit = limit;
        self
    }
}

/// A sparse constraint: `sum(coef * x[var]) {>=, <=, =} rhs`.
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    /// `(variable index, coefficient)` pairs; absent variables have coefficient 0.
    pub terms: Vec<(usize, f64)>,
    pub sense: ConstraintSense,
    pub rhs: f64,
}

impl Constraint {
    #[must_use]
    pub const fn geq(terms: Vec<(usize, f64)>, rhs: f64) -> Self {
        Self {
            terms,
            sense: ConstraintSense::GreaterEqual,
            rhs,
        }
    }

    #[must_use]
    pub const fn leq(terms: Vec<(usize, f64)>, rhs: f64) -> Self {
        Self {
            terms,
            sense: ConstraintSense::LessEqual,
            rhs,
        }
    }

    #[must_use]
    pub const fn eq(terms: Vec<(usize, f64)>, rhs: f64) -> Self {
        Self {
            terms,
            sense: ConstraintSense::Equal,
            rhs,
        }
    }

    /// Evaluate the left-hand side at `values`.
    pub fn lhs(&self, values: &[f64]) -> f64 {
        self.terms
            .iter()
            .map(|&(i, c)| c * values.get(i).copied().unwrap_or(0.0))
            .sum()
    }

    /// Whether `values` satisfy this constraint within `tolerance`.
    pub fn is_satisfied(&self, values: &[f64], tolerance: f64) -> bool {
        let lhs = self.lhs(values);
        match self.sense {
            ConstraintSense::GreaterEqual => lhs >= self.rhs - tolerance,
            ConstraintSense::LessEqual => lhs <= self.rhs + tolerance,
            ConstraintSense::Equal => (lhs - self.rhs).abs() <= tolerance,
        }
    }
}

/// Constraint sense.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintSense {
    GreaterEqual,
    LessEqual,
    Equal,
}

/// Bounds on a variable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VariableBounds {
    /// Lower bound (None = -infinity).
    pub lower: Option<f64>,
    /// Upper bound (None = +infinity).
    pub upper: Option<f64>,
}

impl Default for VariableBounds {
    fn default() -> Self {
        Self {
            lower: Some(0.0),
            upper: None,
        }
    }
}

impl VariableBounds {
    /// Binary variable bounds [0, 1].
    #[must_use]
    pub const fn binary() -> Self {
        Self {
            lower: Some(0.0),
            upper: Some(1.0),
        }
    }
}

/// Solution to an LP/ILP problem.
#[derive(Debug, Clone)]
pub struct LpSolution {
    pub values: Vec<f64>,
    pub objective: f64,
    pub status: SolutionStatus,
}

impl LpSolution {
    #[must_use]
    pub fn infeasible(num_vars: usize) -> Self {
        Self {
            values: vec![0.0; num_vars],
            objective: 0.0,
            status: SolutionStatus::Infeasible,
        }
    }

    #[must_use]
    pub fn is_optimal(&self) -> bool {
        self.status == SolutionStatus::Optimal
    }
}

/// Solver solution status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolutionStatus {
    Optimal,
    Infeasible,
    Unbounded,
    /// The time limit stopped the search before optimality was proven.
    /// `values` may hold an incumbent, or nothing usable.
    TimeLimit,
}
