//! Solver doubles.
//!
//! - [`RecordingSolver`] - Delegates to HiGHS and counts calls.
//! - [`FailingSolver`] - Always returns a backend error.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::adapter::solver::HiGHSSolver;
use crate::error::SolverError;
use crate::port::{LpProblem, LpSolution, Solver};

/// HiGHS wrapper that counts how often the backend is invoked.
///
/// Clones share the counter, so a test can keep one handle while the
/// allocator owns another.
#[derive(Debug, Clone, Default)]
pub struct RecordingSolver {
    inner: HiGHSSolver,
    calls: Arc<AtomicUsize>,
}

impl RecordingSolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Solver for RecordingSolver {
    fn name(&self) -> &'static str {
        "recording"
    }

    fn solve_lp(&self, problem: &LpProblem) -> Result<LpSolution, SolverError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.solve_lp(problem)
    }
}

/// Backend that fails every solve.
#[derive(Debug, Clone, Default)]
pub struct FailingSolver;

impl Solver for FailingSolver {
    fn name(&self) -> &'static str {
        "failing"
    }

    fn solve_lp(&self, _problem: &LpProblem) -> Result<LpSolution, SolverError> {
        Err(SolverError::Backend("scripted failure".into()))
    }
}
