//! End to end: export artifacts, load them once, score requests.

use chrono::{TimeZone, Utc};

use ttc_predict::domain::{
    KNOWN_CLIENTS, KNOWN_PRODUCTS, MacroProduct, OpportunityRecord, Phase, Speed, display_days,
};
use ttc_predict::error::AppError;
use ttc_predict::exporter::{TrainingOutputs, export_artifacts_at};
use ttc_predict::models::{EncodedField, Node, OneHotEncoder, Regressor, Tree, TreeEnsemble};
use ttc_predict::serve;

fn strings(xs: &[&str]) -> Vec<String> {
    xs.iter().map(|s| s.to_string()).collect()
}

fn encoder() -> OneHotEncoder {
    OneHotEncoder::new(vec![
        EncodedField {
            name: "phase".to_string(),
            categories: strings(&["Execution", "Study"]),
        },
        EncodedField {
            name: "client".to_string(),
            categories: strings(&KNOWN_CLIENTS),
        },
        EncodedField {
            name: "macro_product".to_string(),
            categories: strings(&["EvolutionPoP", "NewPoP"]),
        },
        EncodedField {
            name: "product".to_string(),
            categories: strings(&KNOWN_PRODUCTS),
        },
    ])
}

/// Model trained on a column order unrelated to the encoder's output.
fn regressor() -> Regressor {
    let mut names = vec!["creation_month".to_string()];
    let mut encoded = encoder()
        .fields
        .iter()
        .flat_map(|f| f.categories.iter().map(move |c| format!("{}_{c}", f.name)))
        .collect::<Vec<_>>();
    encoded.sort();
    names.extend(encoded);
    // A column the encoder never produces; always zero at serve time.
    names.push("client_Client_Legacy".to_string());

    let pos = |name: &str| names.iter().position(|n| n == name).unwrap();

    // Tree 1: Study phase closes faster than Execution.
    let phase_tree = Tree {
        nodes: vec![
            Node::Split {
                feature: pos("phase_Study"),
                threshold: 0.5,
                yes: 1,
                no: 2,
                missing: None,
            },
            Node::Leaf { value: 30.0 },
            Node::Leaf { value: 20.0 },
        ],
    };
    // Tree 2: late-year opportunities take longer; Client_2 is quick.
    let month_tree = Tree {
        nodes: vec![
            Node::Split {
                feature: pos("creation_month"),
                threshold: 9.5,
                yes: 1,
                no: 4,
                missing: None,
            },
            Node::Split {
                feature: pos("client_Client_2"),
                threshold: 0.5,
                yes: 2,
                no: 3,
                missing: None,
            },
            Node::Leaf { value: 5.0 },
            Node::Leaf { value: 0.2 },
            Node::Leaf { value: 40.0 },
        ],
    };

    Regressor::TreeEnsemble(TreeEnsemble {
        feature_names: names.clone(),
        base_score: 35.0,
        trees: vec![phase_tree, month_tree],
    })
}

fn example() -> OpportunityRecord {
    OpportunityRecord {
        phase: Phase::Study,
        client: "Client_2".to_string(),
        macro_product: MacroProduct::NewPoP,
        product: "Nouv PoP PAC Rg 1".to_string(),
        creation_month: 3,
    }
}

#[test]
fn export_load_and_predict() {
    let dir = tempfile::tempdir().unwrap();
    let models = dir.path().join("models");
    let expected = regressor();

    let report = export_artifacts_at(
        &models,
        TrainingOutputs {
            regressor: Some(expected.clone()),
            encoder: Some(encoder()),
            mean_absolute_error: Some(12.5),
            fit_quality: Some(0.58),
        },
        Utc.with_ymd_and_hms(2025, 1, 15, 10, 30, 0).unwrap(),
    )
    .unwrap();
    assert_eq!(report.metadata.trained_at, "2025-01-15 10:30:00");

    let bundle = serve::load_global(&models).unwrap();
    // Second call reuses the installed bundle.
    assert!(std::ptr::eq(bundle, serve::load_global(&models).unwrap()));
    assert!(matches!(
        serve::load_global(&dir.path().join("elsewhere")),
        Ok(b) if std::ptr::eq(b, bundle)
    ));

    let Regressor::TreeEnsemble(ensemble) = &expected else {
        unreachable!()
    };
    assert_eq!(bundle.expected_feature_names(), ensemble.feature_names.as_slice());
    assert_eq!(bundle.mean_absolute_error().to_bits(), 12.5f64.to_bits());
    assert_eq!(bundle.fit_quality().to_bits(), 0.58f64.to_bits());

    // 35 + 20 (Study) + 0.2 (month 3, Client_2) = 55.2
    let p = bundle.predict(&example()).unwrap();
    assert!((p.result.point_estimate - 55.2).abs() < 1e-9);
    assert_eq!(display_days(p.result.lower_bound), 43);
    assert_eq!(display_days(p.result.upper_bound), 68);
    assert_eq!(p.speed, Speed::Medium);

    // Unknown client: no indicator set, falls to the 5.0 leaf.
    let mut unseen = example();
    unseen.client = "Client_New".to_string();
    let p = bundle.predict(&unseen).unwrap();
    assert!((p.result.point_estimate - 60.0).abs() < 1e-9);
    assert_eq!(p.speed, Speed::Slow);

    // Execution, December: 35 + 30 + 40 = 105
    let mut late = example();
    late.phase = Phase::Execution;
    late.creation_month = 12;
    assert!((bundle.predict(&late).unwrap().result.point_estimate - 105.0).abs() < 1e-9);

    // Bad month is rejected before scoring.
    late.creation_month = 13;
    assert!(matches!(
        bundle.predict(&late),
        Err(AppError::InvalidInput { field: "creation_month", .. })
    ));

    // Batch scoring against the same shared bundle.
    let records: Vec<_> = (1..=12)
        .map(|m| OpportunityRecord {
            creation_month: m,
            ..example()
        })
        .collect();
    let results = serve::predict_batch(bundle, &records);
    let summary = serve::BatchSummary::from_results(&results);
    assert_eq!(summary.scored, 12);
    assert_eq!(summary.medium, 9);
    assert_eq!(summary.slow, 3);
}
