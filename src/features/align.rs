//! Column alignment between encoder output and the model's positional inputs.
//!
//! Tree models index features by position, so the row handed to a `Scorer`
//! must follow the model's declared feature order exactly. Alignment is:
//! zero-fill every expected column, then overwrite by name. Encoded columns the
//! model does not know are dropped; expected columns nobody produced stay 0.

use std::collections::HashMap;

use tracing::debug;

use crate::domain::{FIELD_CREATION_MONTH, OpportunityRecord};
use crate::models::CategoryEncoder;

/// Named feature values for one request, before alignment.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedFeatureVector {
    pub columns: Vec<(String, f64)>,
}

/// Encode the categorical fields, then append the raw creation month.
pub fn encode_record(encoder: &dyn CategoryEncoder, record: &OpportunityRecord) -> EncodedFeatureVector {
    let mut columns = encoder.encode(&record.categorical_fields());
    columns.push((FIELD_CREATION_MONTH.to_string(), f64::from(record.creation_month)));
    EncodedFeatureVector { columns }
}

/// The model's expected columns with a name → position index.
///
/// Built once per bundle load.
#[derive(Debug, Clone)]
pub struct FeatureLayout {
    names: Vec<String>,
    index: HashMap<String, usize>,
}

impl FeatureLayout {
    pub fn new(expected_feature_names: &[String]) -> Self {
        let index = expected_feature_names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();
        Self {
            names: expected_feature_names.to_vec(),
            index,
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Produce the positional row for `encoded`.
    pub fn align(&self, encoded: &EncodedFeatureVector) -> Vec<f64> {
        let mut row = vec![0.0; self.names.len()];
        let mut dropped = 0usize;

        for (name, value) in &encoded.columns {
            match self.index.get(name) {
                Some(&pos) => row[pos] = *value,
                None => dropped += 1,
            }
        }

        if dropped > 0 {
            debug!(dropped, "encoded columns not expected by the model were dropped");
        }
        row
    }

    /// Expected columns the encoder can never produce (always zero at serve time).
    pub fn unreachable_columns(&self, encoder: &dyn CategoryEncoder) -> Vec<String> {
        let produced = encoder.column_names();
        self.names
            .iter()
            .filter(|name| name.as_str() != FIELD_CREATION_MONTH && !produced.contains(name))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EncodedField, OneHotEncoder};

    fn names(n: &[&str]) -> Vec<String> {
        n.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn align_reorders_by_name() {
        let layout = FeatureLayout::new(&names(&["creation_month", "b", "a"]));
        let encoded = EncodedFeatureVector {
            columns: vec![
                ("a".to_string(), 1.0),
                ("b".to_string(), 2.0),
                ("creation_month".to_string(), 7.0),
            ],
        };
        assert_eq!(layout.align(&encoded), vec![7.0, 2.0, 1.0]);
    }

    #[test]
    fn align_drops_extra_and_zero_fills_missing() {
        let layout = FeatureLayout::new(&names(&["a", "missing", "creation_month"]));
        let encoded = EncodedFeatureVector {
            columns: vec![
                ("a".to_string(), 1.0),
                ("extra".to_string(), 9.0),
                ("creation_month".to_string(), 3.0),
            ],
        };
        assert_eq!(layout.align(&encoded), vec![1.0, 0.0, 3.0]);
    }

    #[test]
    fn unreachable_columns_lists_expected_but_never_encoded() {
        let encoder = OneHotEncoder::new(vec![EncodedField {
            name: "phase".to_string(),
            categories: vec!["Study".to_string()],
        }]);
        let layout = FeatureLayout::new(&names(&["phase_Study", "phase_Other", "creation_month"]));
        assert_eq!(layout.unreachable_columns(&encoder), names(&["phase_Other"]));
    }
}
