//! Model and encoder implementations behind the two serving traits.
//!
//! The serving code only talks to `Scorer` and `CategoryEncoder`, so the
//! concrete artifact shapes can change without touching feature alignment.

pub mod encoder;
pub mod scorer;

pub use encoder::*;
pub use scorer::*;
