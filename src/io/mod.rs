//! Input/output helpers.
//!
//! - artifact JSON read/write with atomic publish (`artifacts`)
//! - batch CSV ingest (`ingest`)
//! - batch result export (`export`)

pub mod artifacts;
pub mod export;
pub mod ingest;

pub use artifacts::*;
pub use export::*;
pub use ingest::*;
