use thiserror::Error;

use crate::shape::Shape;

/// Construction-time failures of the operator and proximal algebra.
///
/// Shape agreement is checked when composites are built, never during
/// evaluation; an evaluation call with a wrong-length buffer is a
/// caller bug and panics instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Two shapes that must agree for the requested composite do not.
    #[error("{context}: shape {lhs} is incompatible with {rhs}")]
    ShapeMismatch {
        context: &'static str,
        lhs: Shape,
        rhs: Shape,
    },

    /// A transform handed to a transform-domain proximal operator
    /// failed the randomized round-trip probe.
    #[error("transform is not unitary: round-trip deviation {deviation:.3e} exceeds {tol:.3e}")]
    NotUnitary { deviation: f64, tol: f64 },

    /// A stacking constructor was given nothing to stack.
    #[error("{context}: needs at least one block")]
    EmptyBlock { context: &'static str },

    /// Group length of a grouped penalty must be nonzero.
    #[error("group length must be nonzero")]
    EmptyGroup,

    /// Segment lengths of a stacked proximal operator do not cover the
    /// declared input length.
    #[error("segment lengths sum to {got}, expected {expected}")]
    SegmentMismatch { got: usize, expected: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
