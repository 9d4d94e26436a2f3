use std::fmt;

use axolotl::Scalar;

/// Why a solver stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Status {
    /// The convergence criterion was met.
    Converged,
    /// The iteration budget ran out before the criterion was met.
    MaxIterations,
    /// A non-finite value appeared; the last finite iterate is returned.
    Instability,
    /// A denominator collapsed and no further progress was possible.
    Breakdown,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Converged => write!(f, "converged"),
            Status::MaxIterations => write!(f, "maximum iterations reached"),
            Status::Instability => write!(f, "aborted on non-finite values"),
            Status::Breakdown => write!(f, "numerical breakdown"),
        }
    }
}

/// Outcome of an iterative solve.
///
/// Exhausting the iteration budget is an ordinary outcome, reported
/// through [`Status::MaxIterations`] rather than an error: the iterate
/// is still the best one available and callers often warm-start from
/// it.
#[derive(Debug, Clone)]
pub struct SolveResult<S: Scalar> {
    /// Final iterate (last finite one if the solve went unstable).
    pub x: Vec<S>,
    /// Number of iterations performed.
    pub iterations: usize,
    /// Residual norm at the final iterate, per the solver's own measure.
    pub residual_norm: S::Real,
    /// Residual norm recorded once per completed iteration.
    pub trace: Vec<S::Real>,
    /// Why the solver stopped.
    pub status: Status,
}

impl<S: Scalar> SolveResult<S> {
    /// Whether the solve met its convergence criterion.
    pub fn converged(&self) -> bool {
        self.status == Status::Converged
    }
}
