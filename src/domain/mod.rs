//! Domain types used throughout the service.
//!
//! This module defines:
//!
//! - request types (`OpportunityRecord`, `Phase`, `MacroProduct`)
//! - prediction outputs (`PredictionResult`, `Speed`, `Confidence`)
//! - the artifact metadata record shared by exporter and loader

pub mod types;

pub use types::*;
