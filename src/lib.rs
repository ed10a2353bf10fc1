//! `ttc-predict` library crate.
//!
//! The binary (`ttc`) is a thin wrapper around this library so that:
//!
//! - the prediction path is testable without spawning processes
//! - the bundle and predictor can be embedded in another service
//! - export and serving stay independent of the CLI

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod exporter;
pub mod features;
pub mod io;
pub mod models;
pub mod report;
pub mod serve;
