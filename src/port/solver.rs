//! Solver port for linear programming.
//!
//! The allocators depend only on this narrow contract: an objective, a set
//! of linear constraints, and variable bounds go in; primal values, one dual
//! value per constraint, and a termination status come out.
//!
//! # Overview
//!
//! - [`Solver`]: LP backend interface
//! - [`LpProblem`]: Problem definition
//! - [`LpSolution`]: Primal and dual solution

use crate::domain::constraint::{Constraint, VariableBounds};
use crate::error::SolverError;

/// Linear programming backend.
///
/// Implementations wrap specific solver libraries (HiGHS, CLP, a closed-form
/// solution for tiny instances, ...) behind a uniform interface.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` so that independent controller
/// instances (e.g. one per region shard) can share a backend.
///
/// # Implementation Notes
///
/// - Infeasibility is a status, not an error: return
///   [`LpStatus::Infeasible`] rather than `Err`.
/// - Any timeout is the backend's responsibility; callers never cancel.
pub trait Solver: Send + Sync {
    /// Return the solver name for logging and configuration.
    fn name(&self) -> &'static str;

    /// Solve a linear programming problem.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend itself fails (malformed input,
    /// internal error). Infeasible and unbounded problems are reported
    /// through [`LpSolution::status`].
    fn solve_lp(&self, problem: &LpProblem) -> Result<LpSolution, SolverError>;
}

/// Optimization direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ObjectiveSense {
    #[default]
    Maximize,
    Minimize,
}

/// Linear programming problem definition.
///
/// ```text
/// maximize/minimize  c^T * x
/// subject to         constraints
///                    bounds on x
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct LpProblem {
    /// Optimization direction.
    pub sense: ObjectiveSense,

    /// Objective function coefficients.
    pub objective: Vec<f64>,

    /// Linear constraints on the variables.
    pub constraints: Vec<Constraint>,

    /// Lower and upper bounds for each variable.
    pub bounds: Vec<VariableBounds>,
}

impl LpProblem {
    /// Create a maximization problem with `num_vars` non-negative variables
    /// and a zero objective.
    #[must_use]
    pub fn maximize(num_vars: usize) -> Self {
        Self {
            sense: ObjectiveSense::Maximize,
            objective: vec![0.0; num_vars],
            constraints: Vec::new(),
            bounds: vec![VariableBounds::default(); num_vars],
        }
    }

    /// Return the number of decision variables.
    #[must_use]
    pub fn num_vars(&self) -> usize {
        self.objective.len()
    }

    /// Check that every constraint and bound vector matches the variable count.
    ///
    /// # Errors
    ///
    /// Returns [`SolverError::Malformed`] describing the first mismatch.
    pub fn check_shape(&self) -> Result<(), SolverError> {
        let n = self.num_vars();
        if self.bounds.len() != n {
            return Err(SolverError::Malformed(format!(
                "{} bounds for {} variables",
                self.bounds.len(),
                n
            )));
        }
        if let Some((i, c)) = self
            .constraints
            .iter()
            .enumerate()
            .find(|(_, c)| c.coefficients.len() != n)
        {
            return Err(SolverError::Malformed(format!(
                "constraint {i} has {} coefficients for {n} variables",
                c.coefficients.len()
            )));
        }
        Ok(())
    }
}

/// Termination status of an optimization backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LpStatus {
    /// Solver found a globally optimal solution.
    Optimal,

    /// No feasible solution exists.
    Infeasible,

    /// Objective function is unbounded.
    Unbounded,

    /// Solver stopped without a usable solution.
    Error,
}

/// Primal/dual solution to a linear programming problem.
#[derive(Debug, Clone, PartialEq)]
pub struct LpSolution {
    /// Optimal values for each decision variable.
    pub values: Vec<f64>,

    /// Dual value of each constraint, in constraint order.
    pub duals: Vec<f64>,

    /// Optimal objective function value.
    pub objective: f64,

    /// Termination status of the solver.
    pub status: LpStatus,
}

impl LpSolution {
    /// A non-optimal result carrying no values.
    #[must_use]
    pub fn with_status(problem: &LpProblem, status: LpStatus) -> Self {
        Self {
            values: vec![0.0; problem.num_vars()],
            duals: vec![0.0; problem.constraints.len()],
            objective: 0.0,
            status,
        }
    }

    /// Return `true` if the solver found an optimal solution.
    #[must_use]
    pub fn is_optimal(&self) -> bool {
        self.status == LpStatus::Optimal
    }
}
