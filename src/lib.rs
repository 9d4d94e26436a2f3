pub mod basics;
pub mod error;
pub mod map;
pub mod op;
pub mod prox;
pub mod real;
pub mod scalar;
pub mod shape;
pub mod tape;
mod traits;

pub use error::{Error, Result};
pub use map::{LinearMap, Normal};
pub use op::Op;
pub use real::Real;
pub use scalar::Scalar;
pub use shape::Shape;
pub use tape::{GradTape, Gradients, Var};

pub use num_complex::{Complex, Complex32, Complex64};

/// Type alias for operator expressions over `f64`.
pub type Op64 = Op<f64>;
/// Type alias for operator expressions over `f32`.
pub type Op32 = Op<f32>;
/// Type alias for operator expressions over complex `f64`.
pub type OpC64 = Op<Complex64>;
/// Type alias for operator expressions over complex `f32`.
pub type OpC32 = Op<Complex32>;
