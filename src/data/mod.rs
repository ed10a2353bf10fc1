//! Synthetic request generation for smoke-testing batch scoring.

pub mod sample;

pub use sample::*;
