//! Core math modules.

pub mod matrix;
pub mod simplex;
pub mod stable;
