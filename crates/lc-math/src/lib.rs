//! Latent calendar math utilities.

pub mod math;

pub use math::matrix::Matrix;
pub use math::simplex::*;
pub use math::stable::*;
