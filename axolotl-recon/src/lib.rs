pub mod convergence;
pub mod dictionary;
pub mod line_search;
pub mod result;
pub mod solvers;

#[cfg(feature = "parallel")]
pub mod batch;

pub use convergence::ConvergenceParams;
pub use dictionary::{Dictionary, DictionaryBackend, SparseCodes};
pub use line_search::BacktrackParams;
pub use result::{SolveResult, Status};
pub use solvers::cg::{cg, cg_normal, CgConfig};
pub use solvers::fista::{fista, FistaConfig, StepRule};
pub use solvers::pogm::{pogm, PogmConfig};
pub use solvers::power::{lipschitz, power_iter, PowerConfig, PowerResult};

#[cfg(feature = "parallel")]
pub use batch::{cg_batch, fista_batch};
