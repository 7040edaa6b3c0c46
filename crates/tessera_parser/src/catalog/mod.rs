//! Static lookup tables consulted when an operator or tag is not recognized.

pub mod distance;
pub mod operators;
pub mod tags;
