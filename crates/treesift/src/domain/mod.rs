//! Core domain types independent of IO.

pub mod errors;
pub mod model;
