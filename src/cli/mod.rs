//! Command-line parsing for the time-to-close predictor.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! serving and export code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{MacroProduct, Phase};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "ttc", version, about = "Opportunity time-to-close predictor")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Predict days-to-close for one opportunity.
    Predict(PredictArgs),
    /// Score every row of a CSV file and print a summary.
    Batch(BatchArgs),
    /// Publish trained model, encoder and metadata into an artifact directory.
    Export(ExportArgs),
    /// Show the loaded model's error metric, fit quality and training date.
    Info(ModelsArgs),
    /// Generate synthetic batch input from the training vocabularies.
    Sample(SampleArgs),
}

/// Where to find the artifacts.
#[derive(Debug, Args, Clone)]
pub struct ModelsArgs {
    /// Artifact directory (default: $TTC_MODELS_DIR, then ./models).
    #[arg(long, value_name = "DIR")]
    pub models_dir: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct PredictArgs {
    #[command(flatten)]
    pub models: ModelsArgs,

    /// Project phase.
    #[arg(long, value_enum)]
    pub phase: Phase,

    /// Client identifier (Client_1 .. Client_4 were seen in training).
    #[arg(long)]
    pub client: String,

    /// Product family.
    #[arg(long, value_enum)]
    pub macro_product: MacroProduct,

    /// Detailed product (see `ttc info` for the known list).
    #[arg(long)]
    pub product: String,

    /// Creation month, 1 = January (default: current month).
    #[arg(long)]
    pub month: Option<u32>,

    /// Print the prediction as JSON instead of a report.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args, Clone)]
pub struct BatchArgs {
    #[command(flatten)]
    pub models: ModelsArgs,

    /// Input CSV with columns phase,client,macro_product,product,creation_month.
    #[arg(long, value_name = "CSV")]
    pub input: PathBuf,

    /// Export per-row results to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,

    /// Print per-row predictions, not only the summary.
    #[arg(long)]
    pub rows: bool,
}

/// Inputs produced by the training process. All are required; a missing one aborts the export.
#[derive(Debug, Args, Clone)]
pub struct ExportArgs {
    /// Trained regressor JSON.
    #[arg(long, value_name = "JSON")]
    pub model: Option<PathBuf>,

    /// Fitted one-hot encoder JSON.
    #[arg(long, value_name = "JSON")]
    pub encoder: Option<PathBuf>,

    /// Mean absolute error on the test set, in days.
    #[arg(long)]
    pub mae: Option<f64>,

    /// Fit quality (R²) on the test set.
    #[arg(long)]
    pub fit_quality: Option<f64>,

    /// Destination artifact directory (created if absent).
    #[arg(long, value_name = "DIR")]
    pub out: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct SampleArgs {
    /// Number of records to generate.
    #[arg(short = 'n', long, default_value_t = 50)]
    pub count: usize,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Share of records with a client never seen in training.
    #[arg(long, default_value_t = 0.1)]
    pub unknown_client_rate: f64,

    /// Write to this file instead of stdout.
    #[arg(long, value_name = "CSV")]
    pub output: Option<PathBuf>,
}
