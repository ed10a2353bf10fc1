//! One-hot encoding of categorical request fields.
//!
//! Column names follow `<field>_<category>`, in field order then category order.
//! Values outside a field's fitted vocabulary encode as all-zero indicators.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Named indicator columns produced by an encoder, in encoder order.
pub type IndicatorVector = Vec<(String, f64)>;

/// Categorical-to-indicator transform with a closed vocabulary.
pub trait CategoryEncoder: Send + Sync {
    /// Encode `(field, category)` pairs. Never fails on unseen categories.
    fn encode(&self, fields: &[(&str, &str)]) -> IndicatorVector;

    /// Every column this encoder can produce.
    fn column_names(&self) -> Vec<String>;
}

/// What the training-side encoder was configured to do with unseen categories.
///
/// Serving always ignores unknowns; `Error` is kept so the artifact round-trips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownPolicy {
    #[default]
    Ignore,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodedField {
    pub name: String,
    pub categories: Vec<String>,
}

/// Serialized encoder, as written to `encoder.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OneHotEncoder {
    pub fields: Vec<EncodedField>,
    #[serde(default)]
    pub handle_unknown: UnknownPolicy,
}

impl OneHotEncoder {
    pub fn new(fields: Vec<EncodedField>) -> Self {
        Self {
            fields,
            handle_unknown: UnknownPolicy::Ignore,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.fields.is_empty() {
            return Err("encoder declares no fields".to_string());
        }
        for (i, field) in self.fields.iter().enumerate() {
            if field.name.is_empty() {
                return Err(format!("field {i} has an empty name"));
            }
            if self.fields[..i].iter().any(|f| f.name == field.name) {
                return Err(format!("duplicate field '{}'", field.name));
            }
            for (j, cat) in field.categories.iter().enumerate() {
                if field.categories[..j].contains(cat) {
                    return Err(format!("field '{}': duplicate category '{cat}'", field.name));
                }
            }
        }
        Ok(())
    }
}

impl CategoryEncoder for OneHotEncoder {
    fn encode(&self, fields: &[(&str, &str)]) -> IndicatorVector {
        let mut out = Vec::with_capacity(self.fields.iter().map(|f| f.categories.len()).sum());

        for field in &self.fields {
            let value = fields
                .iter()
                .find(|(name, _)| *name == field.name)
                .map(|(_, value)| *value);

            match value {
                Some(v) if !field.categories.iter().any(|c| c == v) => {
                    debug!(field = %field.name, category = v, "unknown category, encoding as all-zero");
                }
                None => {
                    debug!(field = %field.name, "field not supplied, encoding as all-zero");
                }
                _ => {}
            }

            for cat in &field.categories {
                let hit = value == Some(cat.as_str());
                out.push((column_name(&field.name, cat), if hit { 1.0 } else { 0.0 }));
            }
        }

        out
    }

    fn column_names(&self) -> Vec<String> {
        self.fields
            .iter()
            .flat_map(|f| f.categories.iter().map(move |c| column_name(&f.name, c)))
            .collect()
    }
}

fn column_name(field: &str, category: &str) -> String {
    format!("{field}_{category}")
}
