//! Terminal reports for predictions, model info and batch runs.

pub mod format;

pub use format::*;
