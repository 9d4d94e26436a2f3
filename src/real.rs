use std::fmt::{Debug, Display, LowerExp};

use num_traits::{Float as NumFloat, FromPrimitive, NumAssign, ToPrimitive};

/// Marker trait for base floating-point types (`f32`, `f64`).
///
/// Bundles the numeric and utility traits needed throughout axolotl.
/// Only primitive float types implement this; it is the real field
/// underlying every [`Scalar`](crate::scalar::Scalar), including the
/// complex ones.
pub trait Real:
    NumFloat
    + NumAssign
    + FromPrimitive
    + ToPrimitive
    + Copy
    + Send
    + Sync
    + Default
    + Debug
    + Display
    + LowerExp
    + 'static
{
}

impl Real for f32 {}
impl Real for f64 {}
