pub mod cg;
pub mod fista;
pub mod pogm;
pub mod power;
