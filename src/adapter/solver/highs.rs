//! HiGHS solver implementation via good_lp.
//!
//! HiGHS is a high-performance open-source linear programming solver.
//! This implementation wraps it using the good_lp crate and reads back the
//! row duals so allocators can price their capacity constraints.

use good_lp::solvers::highs::highs;
use good_lp::solvers::{DualValues, SolutionWithDual};
use good_lp::{
    constraint, variable, variables, Expression, ResolutionError, Solution as _, SolverModel,
    Variable,
};
use tracing::trace;

use crate::domain::constraint::ConstraintSense;
use crate::error::SolverError;
use crate::port::{LpProblem, LpSolution, LpStatus, ObjectiveSense, Solver};

/// HiGHS-based LP solver.
#[derive(Debug, Default, Clone)]
pub struct HiGHSSolver;

impl HiGHSSolver {
    /// Create a new HiGHS solver instance.
    pub fn new() -> Self {
        Self
    }
}

impl Solver for HiGHSSolver {
    fn name(&self) -> &'static str {
        "highs"
    }

    fn solve_lp(&self, problem: &LpProblem) -> Result<LpSolution, SolverError> {
        solve_with_good_lp(problem)
    }
}

fn linear_expression(vars: &[Variable], coefficients: &[f64]) -> Expression {
    vars.iter()
        .zip(coefficients.iter())
        .map(|(v, c)| *c * *v)
        .sum()
}

/// Internal solver implementation using good_lp.
fn solve_with_good_lp(problem: &LpProblem) -> Result<LpSolution, SolverError> {
    problem.check_shape()?;
    let n = problem.num_vars();

    // Handle empty problem
    if n == 0 {
        return Ok(LpSolution {
            values: vec![],
            duals: vec![0.0; problem.constraints.len()],
            objective: 0.0,
            status: LpStatus::Optimal,
        });
    }

    let mut vars = variables!();
    let mut var_list = Vec::with_capacity(n);

    for bounds in &problem.bounds {
        let mut v = variable();
        if let Some(lb) = bounds.lower {
            v = v.min(lb);
        }
        if let Some(ub) = bounds.upper {
            v = v.max(ub);
        }
        var_list.push(vars.add(v));
    }

    let objective = linear_expression(&var_list, &problem.objective);

    let mut model = match problem.sense {
        ObjectiveSense::Maximize => vars.maximise(&objective).using(highs),
        ObjectiveSense::Minimize => vars.minimise(&objective).using(highs),
    };

    let mut rows = Vec::with_capacity(problem.constraints.len());
    for constr in &problem.constraints {
        let lhs = linear_expression(&var_list, &constr.coefficients);
        let rhs = constr.rhs;

        let row = match constr.sense {
            ConstraintSense::GreaterEqual => model.add_constraint(constraint!(lhs >= rhs)),
            ConstraintSense::LessEqual => model.add_constraint(constraint!(lhs <= rhs)),
            ConstraintSense::Equal => model.add_constraint(constraint!(lhs == rhs)),
        };
        rows.push(row);
    }

    match model.solve() {
        Ok(mut solution) => {
            let values: Vec<f64> = var_list.iter().map(|v| solution.value(*v)).collect();

            // Re-evaluate objective with the solved values
            let objective: f64 = values
                .iter()
                .zip(problem.objective.iter())
                .map(|(v, c)| v * c)
                .sum();

            let dual_values = solution.compute_dual();
            let duals: Vec<f64> = rows.into_iter().map(|row| dual_values.dual(row)).collect();

            trace!(vars = n, rows = duals.len(), objective, "highs solved");

            Ok(LpSolution {
                values,
                duals,
                objective,
                status: LpStatus::Optimal,
            })
        }
        Err(ResolutionError::Infeasible) => {
            Ok(LpSolution::with_status(problem, LpStatus::Infeasible))
        }
        Err(ResolutionError::Unbounded) => {
            Ok(LpSolution::with_status(problem, LpStatus::Unbounded))
        }
        Err(e) => Err(SolverError::Backend(e.to_string())),
    }
}
