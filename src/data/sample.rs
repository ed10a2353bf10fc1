//! Seeded generator of opportunity records drawn from the training vocabularies.

use rand::prelude::*;
use rand::rngs::StdRng;

use crate::domain::{KNOWN_CLIENTS, KNOWN_PRODUCTS, MacroProduct, OpportunityRecord, Phase};
use crate::error::AppError;

#[derive(Debug, Clone)]
pub struct SampleConfig {
    pub count: usize,
    pub seed: u64,
    /// Share of records given a client outside the training vocabulary.
    pub unknown_client_rate: f64,
}

/// Generate `config.count` records. Same seed, same records.
pub fn generate_records(config: &SampleConfig) -> Result<Vec<OpportunityRecord>, AppError> {
    if config.count == 0 {
        return Err(AppError::invalid_input("count", "must be > 0"));
    }
    if !(0.0..=1.0).contains(&config.unknown_client_rate) {
        return Err(AppError::invalid_input(
            "unknown_client_rate",
            format!("must be within 0..=1, got {}", config.unknown_client_rate),
        ));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut out = Vec::with_capacity(config.count);

    for _ in 0..config.count {
        // Product names carry the macro product ("Evol" vs "Nouv"); keep them consistent.
        let product = *KNOWN_PRODUCTS.choose(&mut rng).unwrap_or(&KNOWN_PRODUCTS[0]);
        let macro_product = if product.starts_with("Evol") {
            MacroProduct::EvolutionPoP
        } else {
            MacroProduct::NewPoP
        };

        let client = if rng.gen_bool(config.unknown_client_rate) {
            format!("Client_{}", rng.gen_range(KNOWN_CLIENTS.len() + 1..=99))
        } else {
            KNOWN_CLIENTS.choose(&mut rng).unwrap_or(&KNOWN_CLIENTS[0]).to_string()
        };

        out.push(OpportunityRecord {
            phase: *Phase::ALL.choose(&mut rng).unwrap_or(&Phase::Study),
            client,
            macro_product,
            product: product.to_string(),
            creation_month: rng.gen_range(1..=12),
        });
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(seed: u64, rate: f64) -> SampleConfig {
        SampleConfig {
            count: 200,
            seed,
            unknown_client_rate: rate,
        }
    }

    #[test]
    fn same_seed_same_records() {
        let a = generate_records(&config(42, 0.1)).unwrap();
        let b = generate_records(&config(42, 0.1)).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, generate_records(&config(43, 0.1)).unwrap());
    }

    #[test]
    fn records_are_valid_and_consistent() {
        for r in generate_records(&config(1, 0.0)).unwrap() {
            r.validate().unwrap();
            assert!(KNOWN_CLIENTS.contains(&r.client.as_str()));
            assert_eq!(r.product.starts_with("Evol"), r.macro_product == MacroProduct::EvolutionPoP);
        }
    }

    #[test]
    fn unknown_clients_appear_when_requested() {
        let records = generate_records(&config(5, 1.0)).unwrap();
        assert!(records.iter().all(|r| !KNOWN_CLIENTS.contains(&r.client.as_str())));
    }

    #[test]
    fn zero_count_is_rejected() {
        let mut c = config(1, 0.0);
        c.count = 0;
        assert!(generate_records(&c).is_err());
    }
}
