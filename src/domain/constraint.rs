//! Rows and bounds of the allocation LP.
//!
//! The allocators build these; the solver port consumes them. One
//! coefficient per rate variable, in client order.

/// Comparison operator of a constraint row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintSense {
    GreaterEqual,
    LessEqual,
    Equal,
}

/// `Σ coefficients[i] * r[i]  (>= | <= | =)  rhs`
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    pub coefficients: Vec<f64>,
    pub sense: ConstraintSense,
    pub rhs: f64,
}

impl Constraint {
    #[must_use]
    pub const fn new(coefficients: Vec<f64>, sense: ConstraintSense, rhs: f64) -> Self {
        Self {
            coefficients,
            sense,
            rhs,
        }
    }

    #[must_use]
    pub const fn geq(coefficients: Vec<f64>, rhs: f64) -> Self {
        Self::new(coefficients, ConstraintSense::GreaterEqual, rhs)
    }

    /// A capacity row.
    #[must_use]
    pub const fn leq(coefficients: Vec<f64>, rhs: f64) -> Self {
        Self::new(coefficients, ConstraintSense::LessEqual, rhs)
    }

    #[must_use]
    pub const fn eq(coefficients: Vec<f64>, rhs: f64) -> Self {
        Self::new(coefficients, ConstraintSense::Equal, rhs)
    }

    /// Hard-SLA floor `r[index] >= min_rate` in a problem of `num_vars` rates.
    #[must_use]
    pub fn floor(num_vars: usize, index: usize, min_rate: f64) -> Self {
        let coefficients = (0..num_vars)
            .map(|i| if i == index { 1.0 } else { 0.0 })
            .collect();
        Self::geq(coefficients, min_rate)
    }
}

/// Bounds on one rate variable. `None` is unbounded on that side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VariableBounds {
    pub lower: Option<f64>,
    pub upper: Option<f64>,
}

impl Default for VariableBounds {
    /// `[0, +inf)`
    fn default() -> Self {
        Self {
            lower: Some(0.0),
            upper: None,
        }
    }
}

impl VariableBounds {
    #[must_use]
    pub fn non_negative() -> Self {
        Self::default()
    }

    /// `[lower, upper]`, used as `[0, demand]` for every client.
    #[must_use]
    pub const fn bounded(lower: f64, upper: f64) -> Self {
        Self {
            lower: Some(lower),
            upper: Some(upper),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floor_row_selects_one_client() {
        let c = Constraint::floor(3, 1, 30.0);
        assert_eq!(c.coefficients, vec![0.0, 1.0, 0.0]);
        assert_eq!(c.sense, ConstraintSense::GreaterEqual);
        assert_eq!(c.rhs, 30.0);
    }

    #[test]
    fn rate_bounds_default_to_non_negative() {
        assert_eq!(VariableBounds::non_negative().lower, Some(0.0));
        assert_eq!(VariableBounds::non_negative().upper, None);
        assert_eq!(VariableBounds::bounded(0.0, 50.0).upper, Some(50.0));
    }
}
