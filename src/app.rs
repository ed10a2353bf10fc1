//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - installs logging
//! - parses CLI arguments
//! - loads the model bundle once
//! - prints reports
//! - writes optional exports

use std::fs::File;
use std::path::PathBuf;

use chrono::Datelike;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli::{BatchArgs, Command, ExportArgs, ModelsArgs, PredictArgs, SampleArgs};
use crate::data::{SampleConfig, generate_records};
use crate::domain::{KNOWN_CLIENTS, KNOWN_PRODUCTS, OpportunityRecord, ServeConfig};
use crate::error::AppError;
use crate::exporter::{TrainingOutputs, export_artifacts, read_training_input};
use crate::io::artifacts::resolve_models_dir;

pub mod pipeline;

const DEFAULT_LOG_FILTER: &str = "ttc_predict=info";

/// Entry point for the `ttc` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = crate::cli::Cli::parse();

    match cli.command {
        Command::Predict(args) => handle_predict(args),
        Command::Batch(args) => handle_batch(args),
        Command::Export(args) => handle_export(args),
        Command::Info(args) => handle_info(args),
        Command::Sample(args) => handle_sample(args),
    }
}

/// Logs go to stderr so stdout stays scriptable.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn handle_predict(args: PredictArgs) -> Result<(), AppError> {
    let config = serve_config_from_args(&args.models, args.json, None);
    let record = OpportunityRecord {
        phase: args.phase,
        client: args.client,
        macro_product: args.macro_product,
        product: args.product,
        creation_month: args.month.unwrap_or_else(|| chrono::Local::now().month()),
    };

    let prediction = pipeline::run_predict(&config, &record)?;

    if config.json_output {
        let json = serde_json::to_string_pretty(&prediction)
            .map_err(|e| AppError::BatchIo(format!("Failed to serialize prediction: {e}")))?;
        println!("{json}");
    } else {
        println!("{}", crate::report::format_prediction(&prediction));
    }
    Ok(())
}

fn handle_batch(args: BatchArgs) -> Result<(), AppError> {
    let config = serve_config_from_args(&args.models, false, args.export.clone());
    let run = pipeline::run_batch(&config, &args.input)?;

    if args.rows {
        println!(
            "{}",
            crate::report::format_prediction_table(&run.predictions, &run.lines)
        );
    }
    println!(
        "{}",
        crate::report::format_batch_summary(&run.summary, run.ingest.rows_read, &run.ingest.row_errors)
    );

    if let Some(path) = &config.export_results {
        crate::io::export::write_results_csv(path, &run.predictions, &run.lines)?;
        info!(path = %path.display(), rows = run.predictions.len(), "batch results exported");
    }
    Ok(())
}

fn handle_export(args: ExportArgs) -> Result<(), AppError> {
    let outputs = TrainingOutputs {
        regressor: args
            .model
            .as_deref()
            .map(|p| read_training_input("regressor", p))
            .transpose()?,
        encoder: args
            .encoder
            .as_deref()
            .map(|p| read_training_input("encoder", p))
            .transpose()?,
        mean_absolute_error: args.mae,
        fit_quality: args.fit_quality,
    };
    let dest = resolve_models_dir(args.out.as_deref());

    let report = export_artifacts(&dest, outputs)?;

    println!("All artifacts saved:");
    for path in report.files() {
        println!("  - {}", path.display());
    }
    Ok(())
}

fn handle_info(args: ModelsArgs) -> Result<(), AppError> {
    let config = serve_config_from_args(&args, false, None);
    let bundle = pipeline::bundle(&config)?;

    println!(
        "{}",
        crate::report::format_model_info(bundle.metadata(), bundle.expected_feature_names().len())
    );
    println!("Known clients: {}", KNOWN_CLIENTS.join(", "));
    println!("Known products:");
    for p in KNOWN_PRODUCTS {
        println!("  - {p}");
    }
    Ok(())
}

fn handle_sample(args: SampleArgs) -> Result<(), AppError> {
    let records = generate_records(&SampleConfig {
        count: args.count,
        seed: args.seed,
        unknown_client_rate: args.unknown_client_rate,
    })?;

    match &args.output {
        Some(path) => {
            let file = File::create(path)
                .map_err(|e| AppError::BatchIo(format!("Failed to create '{}': {e}", path.display())))?;
            crate::io::ingest::write_records(file, &records)?;
            info!(path = %path.display(), count = records.len(), "sample written");
        }
        None => crate::io::ingest::write_records(std::io::stdout().lock(), &records)?,
    }
    Ok(())
}

pub fn serve_config_from_args(
    models: &ModelsArgs,
    json_output: bool,
    export_results: Option<PathBuf>,
) -> ServeConfig {
    ServeConfig {
        models_dir: resolve_models_dir(models.models_dir.as_deref()),
        json_output,
        export_results,
    }
}
