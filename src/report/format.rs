//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the serving code stays free of presentation concerns
//! - output changes are localized (important for snapshot-style tests)
//!
//! Day counts are rounded to whole days for display only.

use crate::domain::{ArtifactMetadata, Prediction, display_days};
use crate::io::ingest::RowError;
use crate::serve::BatchSummary;

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Three-letter month name for `month` in 1..=12.
pub fn month_abbrev(month: u32) -> &'static str {
    month
        .checked_sub(1)
        .and_then(|i| MONTHS.get(i as usize))
        .copied()
        .unwrap_or("?")
}

/// Model information block (error metric, fit quality, training date).
pub fn format_model_info(meta: &ArtifactMetadata, model_columns: usize) -> String {
    let mut out = String::new();

    out.push_str("=== ttc - Opportunity Time-to-Close ===\n");
    out.push_str(&format!("Trained at: {}\n", meta.trained_at));
    out.push_str(&format!("MAE (mean error): {:.1} days\n", meta.mean_absolute_error));
    out.push_str(&format!("R² (fit quality): {:.2}%\n", meta.fit_quality * 100.0));
    out.push_str(&format!("Features: {}\n", meta.features.join(", ")));
    out.push_str(&format!("Model columns: {model_columns}\n"));

    out
}

/// Full single-prediction report.
pub fn format_prediction(p: &Prediction) -> String {
    let r = &p.result;
    let point = display_days(r.point_estimate);
    let lower = display_days(r.lower_bound);
    let upper = display_days(r.upper_bound);
    let delta = display_days(r.uncertainty);

    let mut out = String::new();

    out.push_str(&format!("Predicted delay : {point} days\n"));
    out.push_str(&format!("Lower bound     : {lower} days (-{delta}d)\n"));
    out.push_str(&format!("Upper bound     : {upper} days (+{delta}d)\n"));
    out.push_str(&format!(
        "Confidence interval (±1σ): between {lower} and {upper} days\n"
    ));

    out.push_str(&format!(
        "\nOpportunity speed: {}\n",
        p.speed.label().to_uppercase()
    ));
    out.push_str(p.speed.recommendation());
    out.push('\n');

    out.push_str("\nReliability:\n");
    out.push_str(&format!("- mean model error: ±{delta} days\n"));
    out.push_str(&format!("- fit quality (R²): {:.1}%\n", p.fit_quality * 100.0));
    out.push_str(&format!("- {}\n", p.confidence.label()));

    let rec = &p.record;
    out.push_str("\nRequest:\n");
    out.push_str(&format!("- phase: {}\n", rec.phase.category()));
    out.push_str(&format!("- client: {}\n", rec.client));
    out.push_str(&format!("- macro product: {}\n", rec.macro_product.category()));
    out.push_str(&format!("- product: {}\n", rec.product));
    out.push_str(&format!(
        "- creation month: {} ({})\n",
        rec.creation_month,
        month_abbrev(rec.creation_month)
    ));

    out.push_str("\nCalculation:\n");
    out.push_str(&format!("- central prediction: {:.1} days\n", r.point_estimate));
    out.push_str(&format!("- uncertainty (MAE): ±{:.1} days\n", r.uncertainty));
    out.push_str(&format!(
        "- interval: [{:.1}, {:.1}] days\n",
        r.lower_bound, r.upper_bound
    ));

    out
}

/// Summary of a batch run, including skipped input rows.
pub fn format_batch_summary(summary: &BatchSummary, rows_read: usize, row_errors: &[RowError]) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "Rows: read={rows_read} | scored={} | rejected={}\n",
        summary.scored,
        summary.failed + row_errors.len()
    ));
    out.push_str(&format!(
        "Speed: fast={} | medium={} | slow={}\n",
        summary.fast, summary.medium, summary.slow
    ));
    if let Some(mean) = summary.mean_days {
        out.push_str(&format!("Mean predicted delay: {mean:.1} days\n"));
    }

    if !row_errors.is_empty() {
        out.push_str("\nRejected rows:\n");
        for e in row_errors {
            out.push_str(&format!("  line {}: {}\n", e.line, e.message));
        }
    }

    out
}

/// One line per prediction, for batch output.
pub fn format_prediction_table(predictions: &[Prediction], lines: &[usize]) -> String {
    let mut out = String::new();
    out.push_str(
        format!(
            "{:>6} {:<10} {:<12} {:<26} {:>5} {:>6} {:>6} {:>6} {:<7}",
            "line", "phase", "client", "product", "month", "days", "low", "high", "speed"
        )
        .trim_end(),
    );
    out.push('\n');

    for (i, p) in predictions.iter().enumerate() {
        let line = lines.get(i).map(|l| l.to_string()).unwrap_or_default();
        out.push_str(
            format!(
                "{:>6} {:<10} {:<12} {:<26} {:>5} {:>6} {:>6} {:>6} {:<7}",
                line,
                p.record.phase.category(),
                truncate(&p.record.client, 12),
                truncate(&p.record.product, 26),
                p.record.creation_month,
                display_days(p.result.point_estimate),
                display_days(p.result.lower_bound),
                display_days(p.result.upper_bound),
                p.speed.label(),
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}
