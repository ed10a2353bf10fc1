//! Export batch predictions to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream scripts.
//! Values are written at full precision; rounding is a display concern.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::Prediction;
use crate::error::AppError;

/// Write per-record predictions to a CSV file.
///
/// `lines[i]` is the input CSV line of `predictions[i]`.
pub fn write_results_csv(path: &Path, predictions: &[Prediction], lines: &[usize]) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::BatchIo(format!("Failed to create export CSV '{}': {e}", path.display())))?;
    write_results(file, predictions, lines)
}

pub fn write_results<W: Write>(mut out: W, predictions: &[Prediction], lines: &[usize]) -> Result<(), AppError> {
    writeln!(
        out,
        "line,phase,client,macro_product,product,creation_month,point_estimate,lower_bound,upper_bound,uncertainty,speed,confidence"
    )
    .map_err(|e| AppError::BatchIo(format!("Failed to write export CSV header: {e}")))?;

    for (i, p) in predictions.iter().enumerate() {
        let r = &p.record;
        let line = lines.get(i).map(|l| l.to_string()).unwrap_or_default();
        writeln!(
            out,
            "{},{},{},{},{},{},{:.6},{:.6},{:.6},{:.6},{},{}",
            line,
            r.phase.category(),
            csv_field(&r.client),
            r.macro_product.category(),
            csv_field(&r.product),
            r.creation_month,
            p.result.point_estimate,
            p.result.lower_bound,
            p.result.upper_bound,
            p.result.uncertainty,
            p.speed.label(),
            p.confidence.label(),
        )
        .map_err(|e| AppError::BatchIo(format!("Failed to write export CSV row: {e}")))?;
    }

    Ok(())
}

/// Quote free-text fields that would break the row.
fn csv_field(s: &str) -> String {
    if s.contains([',', '"', '\n']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        Confidence, MacroProduct, OpportunityRecord, Phase, PredictionResult, Speed,
    };

    #[test]
    fn results_csv_has_header_and_full_precision_rows() {
        let p = Prediction {
            record: OpportunityRecord {
                phase: Phase::Study,
                client: "Client, Inc".to_string(),
                macro_product: MacroProduct::NewPoP,
                product: "Nouv PoP Pyl FH".to_string(),
                creation_month: 3,
            },
            result: PredictionResult::from_raw(45.2, 12.5),
            speed: Speed::Medium,
            confidence: Confidence::Low,
            fit_quality: 0.45,
        };

        let mut buf = Vec::new();
        write_results(&mut buf, &[p], &[2]).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let rows: Vec<&str> = text.lines().collect();

        assert_eq!(rows.len(), 2);
        assert!(rows[0].starts_with("line,phase,client"));
        assert_eq!(
            rows[1],
            "2,Study,\"Client, Inc\",NewPoP,Nouv PoP Pyl FH,3,45.200000,32.700000,57.700000,12.500000,medium,low confidence"
        );
    }
}
