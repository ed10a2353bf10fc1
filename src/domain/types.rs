//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - parsed from CLI flags or batch CSV rows
//! - exported to JSON/CSV
//! - written to and reloaded from the artifact directory

use std::path::PathBuf;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

pub const FIELD_PHASE: &str = "phase";
pub const FIELD_CLIENT: &str = "client";
pub const FIELD_MACRO_PRODUCT: &str = "macro_product";
pub const FIELD_PRODUCT: &str = "product";
pub const FIELD_CREATION_MONTH: &str = "creation_month";

/// Logical input fields, in the order the training process declared them.
pub const LOGICAL_FEATURES: [&str; 5] = [
    FIELD_PHASE,
    FIELD_CLIENT,
    FIELD_MACRO_PRODUCT,
    FIELD_PRODUCT,
    FIELD_CREATION_MONTH,
];

/// Request fields an encoder may one-hot encode.
pub const CATEGORICAL_FIELDS: [&str; 4] = [FIELD_PHASE, FIELD_CLIENT, FIELD_MACRO_PRODUCT, FIELD_PRODUCT];

/// Clients present in the training data.
pub const KNOWN_CLIENTS: [&str; 4] = ["Client_1", "Client_2", "Client_3", "Client_4"];

/// Products present in the training data.
pub const KNOWN_PRODUCTS: [&str; 9] = [
    "Evol PoP Pyl FH/BLO",
    "Evol PoP Pyl Radio",
    "Evol PoP Pyl Radio 5G",
    "Evol PoP TT FH/BLO",
    "Nouv PoP PAC Rg 1",
    "Nouv PoP PAC Rg 1 ZB",
    "Nouv PoP PAC Rg suivant",
    "Nouv PoP Pyl FH",
    "Nouv PoP Pyl Radio",
];

/// Project phase of the opportunity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
pub enum Phase {
    #[serde(alias = "study", alias = "Etude")]
    #[value(name = "Study", alias = "study")]
    Study,
    #[serde(alias = "execution", alias = "Réalisation")]
    #[value(name = "Execution", alias = "execution")]
    Execution,
}

impl Phase {
    pub const ALL: [Phase; 2] = [Phase::Study, Phase::Execution];

    /// Category label as fitted by the encoder.
    pub fn category(self) -> &'static str {
        match self {
            Phase::Study => "Study",
            Phase::Execution => "Execution",
        }
    }
}

/// Product family of the opportunity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
pub enum MacroProduct {
    #[serde(alias = "Evolution PoP")]
    #[value(name = "EvolutionPoP", alias = "evolution-pop")]
    EvolutionPoP,
    #[serde(alias = "Nouveau PoP")]
    #[value(name = "NewPoP", alias = "new-pop")]
    NewPoP,
}

impl MacroProduct {
    pub const ALL: [MacroProduct; 2] = [MacroProduct::EvolutionPoP, MacroProduct::NewPoP];

    pub fn category(self) -> &'static str {
        match self {
            MacroProduct::EvolutionPoP => "EvolutionPoP",
            MacroProduct::NewPoP => "NewPoP",
        }
    }
}

/// One prediction request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpportunityRecord {
    pub phase: Phase,
    pub client: String,
    pub macro_product: MacroProduct,
    pub product: String,
    /// Month the opportunity was created (1 = January).
    pub creation_month: u32,
}

impl OpportunityRecord {
    /// Reject malformed requests before they reach the encoder.
    pub fn validate(&self) -> Result<(), AppError> {
        if !(1..=12).contains(&self.creation_month) {
            return Err(AppError::invalid_input(
                FIELD_CREATION_MONTH,
                format!("must be within 1..=12, got {}", self.creation_month),
            ));
        }
        if self.client.trim().is_empty() {
            return Err(AppError::invalid_input(FIELD_CLIENT, "must not be blank"));
        }
        if self.product.trim().is_empty() {
            return Err(AppError::invalid_input(FIELD_PRODUCT, "must not be blank"));
        }
        Ok(())
    }

    /// The four categorical fields as `(field, category)` pairs.
    pub fn categorical_fields(&self) -> [(&'static str, &str); 4] {
        [
            (FIELD_PHASE, self.phase.category()),
            (FIELD_CLIENT, self.client.as_str()),
            (FIELD_MACRO_PRODUCT, self.macro_product.category()),
            (FIELD_PRODUCT, self.product.as_str()),
        ]
    }
}

/// Point estimate plus the symmetric MAE band, in days.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub point_estimate: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub uncertainty: f64,
}

impl PredictionResult {
    /// Clamp a raw model output and derive the interval from `mae`.
    pub fn from_raw(raw_prediction: f64, mae: f64) -> Self {
        let point_estimate = raw_prediction.max(0.0);
        Self {
            point_estimate,
            lower_bound: (point_estimate - mae).max(0.0),
            upper_bound: point_estimate + mae,
            uncertainty: mae,
        }
    }
}

/// Whole-day value used for display; exact floats are kept internally.
pub fn display_days(days: f64) -> i64 {
    days.round() as i64
}

/// Speed class of an opportunity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speed {
    Fast,
    Medium,
    Slow,
}

impl Speed {
    pub const FAST_BELOW_DAYS: f64 = 30.0;
    pub const MEDIUM_BELOW_DAYS: f64 = 60.0;

    pub fn classify(point_estimate: f64) -> Self {
        if point_estimate < Self::FAST_BELOW_DAYS {
            Speed::Fast
        } else if point_estimate < Self::MEDIUM_BELOW_DAYS {
            Speed::Medium
        } else {
            Speed::Slow
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Speed::Fast => "fast",
            Speed::Medium => "medium",
            Speed::Slow => "slow",
        }
    }

    pub fn recommendation(self) -> &'static str {
        match self {
            Speed::Fast => "This opportunity should close quickly.",
            Speed::Medium => "Standard delay, keep regular follow-up.",
            Speed::Slow => "Warning: this opportunity needs reinforced follow-up.",
        }
    }
}

/// Reliability label derived from the model's fit quality (R²).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    pub fn from_fit_quality(fit_quality: f64) -> Self {
        if fit_quality > 0.6 {
            Confidence::High
        } else if fit_quality > 0.5 {
            Confidence::Medium
        } else {
            Confidence::Low
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Confidence::High => "high confidence",
            Confidence::Medium => "medium confidence",
            Confidence::Low => "low confidence",
        }
    }
}

/// A scored request together with its presentation labels.
#[derive(Debug, Clone, Serialize)]
pub struct Prediction {
    pub record: OpportunityRecord,
    pub result: PredictionResult,
    pub speed: Speed,
    pub confidence: Confidence,
    /// Fit quality (R²) of the model that produced the result.
    pub fit_quality: f64,
}

/// Metadata document written next to the model and encoder.
///
/// Unknown keys are ignored on read so newer exporters can add fields.
/// The legacy key aliases cover this document only; model and encoder
/// artifacts must use the current field names and categories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactMetadata {
    #[serde(alias = "date_entrainement")]
    pub trained_at: String,
    #[serde(alias = "mae")]
    pub mean_absolute_error: f64,
    #[serde(alias = "r2")]
    pub fit_quality: f64,
    /// Logical input fields, not the expanded one-hot columns.
    pub features: Vec<String>,
}

/// Serving configuration as understood by the app layer.
///
/// This is derived from CLI flags, then environment, then defaults.
#[derive(Debug, Clone)]
pub struct ServeConfig {
    pub models_dir: PathBuf,
    pub json_output: bool,
    pub export_results: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(month: u32) -> OpportunityRecord {
        OpportunityRecord {
            phase: Phase::Study,
            client: "Client_2".to_string(),
            macro_product: MacroProduct::NewPoP,
            product: "Nouv PoP PAC Rg 1".to_string(),
            creation_month: month,
        }
    }

    #[test]
    fn validate_rejects_month_out_of_range() {
        assert!(record(1).validate().is_ok());
        assert!(record(12).validate().is_ok());
        for month in [0, 13, 99] {
            match record(month).validate() {
                Err(AppError::InvalidInput { field, .. }) => assert_eq!(field, FIELD_CREATION_MONTH),
                other => panic!("expected InvalidInput, got {other:?}"),
            }
        }
    }

    #[test]
    fn validate_rejects_blank_identifiers() {
        let mut r = record(3);
        r.client = "  ".to_string();
        match r.validate() {
            Err(AppError::InvalidInput { field, .. }) => assert_eq!(field, FIELD_CLIENT),
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn interval_is_symmetric_when_not_clamped() {
        let r = PredictionResult::from_raw(45.2, 12.5);
        assert!((r.point_estimate - 45.2).abs() < 1e-12);
        assert!((r.lower_bound - 32.7).abs() < 1e-9);
        assert!((r.upper_bound - 57.7).abs() < 1e-9);
        assert!((r.upper_bound - r.lower_bound - 25.0).abs() < 1e-9);
        assert_eq!(display_days(r.point_estimate), 45);
        assert_eq!(display_days(r.lower_bound), 33);
        assert_eq!(display_days(r.upper_bound), 58);
    }

    #[test]
    fn negative_raw_output_clamps_to_zero() {
        let r = PredictionResult::from_raw(-5.0, 12.5);
        assert_eq!(r.point_estimate, 0.0);
        assert_eq!(r.lower_bound, 0.0);
        assert_eq!(r.upper_bound, 12.5);
        assert_eq!(r.uncertainty, 12.5);
    }

    #[test]
    fn speed_thresholds() {
        assert_eq!(Speed::classify(0.0), Speed::Fast);
        assert_eq!(Speed::classify(29.99), Speed::Fast);
        assert_eq!(Speed::classify(30.0), Speed::Medium);
        assert_eq!(Speed::classify(45.2), Speed::Medium);
        assert_eq!(Speed::classify(60.0), Speed::Slow);
    }

    #[test]
    fn confidence_thresholds_are_strict() {
        assert_eq!(Confidence::from_fit_quality(0.61), Confidence::High);
        assert_eq!(Confidence::from_fit_quality(0.6), Confidence::Medium);
        assert_eq!(Confidence::from_fit_quality(0.5), Confidence::Low);
        assert_eq!(Confidence::from_fit_quality(-0.2), Confidence::Low);
    }

    #[test]
    fn metadata_accepts_legacy_keys_and_ignores_extras() {
        let json = r#"{
            "date_entrainement": "2025-01-15 10:30:00",
            "mae": 12.5,
            "r2": 0.58,
            "features": ["phase", "client", "macro_produit", "produit", "mois_creation"],
            "n_train_rows": 1200
        }"#;
        let meta: ArtifactMetadata = serde_json::from_str(json).unwrap();
        assert_eq!(meta.trained_at, "2025-01-15 10:30:00");
        assert_eq!(meta.mean_absolute_error, 12.5);
        assert_eq!(meta.fit_quality, 0.58);
        assert_eq!(meta.features.len(), 5);
    }

    #[test]
    fn record_deserializes_legacy_category_labels() {
        let json = r#"{"phase":"Etude","client":"Client_1","macro_product":"Nouveau PoP",
            "product":"Nouv PoP Pyl FH","creation_month":7}"#;
        let r: OpportunityRecord = serde_json::from_str(json).unwrap();
        assert_eq!(r.phase, Phase::Study);
        assert_eq!(r.macro_product, MacroProduct::NewPoP);
    }
}
