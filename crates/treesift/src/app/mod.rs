//! Application layer: load a tree listing, filter it, render the result.

pub mod filter;
pub mod load;
pub mod render;
