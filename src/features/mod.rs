//! Feature encoding and alignment for the prediction path.

pub mod align;

pub use align::*;
