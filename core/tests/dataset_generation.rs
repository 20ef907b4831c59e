//! Synthetic dataset shape and quota tests.

mod common;

use agrisense_core::{
    dataset::Dataset,
    error::ComplianceError,
    generator::{FARMER_COUNT, TRANSACTION_COUNT, VIOLATION_COUNT},
    model::{District, Scheme, TransactionDetails, TransactionType, ViolationCode},
};
use std::collections::HashSet;

fn dataset() -> Dataset {
    common::init_logging();
    Dataset::generate().expect("synthetic dataset builds")
}

/// The fixed 50 / 200 / 60 universe.
#[test]
fn generator_hits_exact_counts() {
    let ds = dataset();
    assert_eq!(ds.farmers().len(), FARMER_COUNT);
    assert_eq!(ds.transactions().len(), TRANSACTION_COUNT);
    assert_eq!(
        ds.tagged_violations().len(),
        VIOLATION_COUNT,
        "Expected exactly 60 tagged violations"
    );
    let meta = ds.dataset_meta();
    assert_eq!(meta.violation_percent, 30.0);
    assert_eq!(meta.regions, District::ALL.to_vec());
}

/// Each code's quota, with no transaction tagged twice.
#[test]
fn violation_quotas_per_code() {
    let ds = dataset();
    let expected = [
        (ViolationCode::DuplicateClaims, 10),
        (ViolationCode::SubsidyLimitExceeded, 15),
        (ViolationCode::LateReporting, 12),
        (ViolationCode::ExcessFertilizer, 12),
        (ViolationCode::PriceManipulation, 11),
    ];
    for (code, count) in expected {
        let tagged = ds.tagged_violations_by_code(code).len();
        assert_eq!(tagged, count, "{code}: expected {count} tagged, got {tagged}");
    }
    let rate = ds.tagged_compliance_rate();
    assert_eq!(rate.compliant_transactions, 140);
    assert_eq!(rate.compliance_rate_percent, 70.0);
}

#[test]
fn batches_have_fixed_sizes_and_sequential_ids() {
    let ds = dataset();
    assert_eq!(ds.transactions_by_type(TransactionType::SubsidyClaim).len(), 50);
    assert_eq!(ds.transactions_by_type(TransactionType::InsuranceClaim).len(), 40);
    assert_eq!(ds.transactions_by_type(TransactionType::FertilizerPurchase).len(), 55);
    assert_eq!(ds.transactions_by_type(TransactionType::CropSale).len(), 55);

    for (i, tx) in ds.transactions().iter().enumerate() {
        assert_eq!(tx.transaction_id, format!("T{:05}", i + 1));
    }
    let farmer_ids: HashSet<_> = ds.farmers().iter().map(|f| f.farmer_id.as_str()).collect();
    assert_eq!(farmer_ids.len(), 50, "Farmer ids must be unique");
    assert_eq!(ds.farmers()[0].farmer_id, "F1001");
}

/// The 10 explicit duplicates point at the first 10 claims and repeat them.
#[test]
fn duplicates_reference_first_ten_claims() {
    let ds = dataset();
    let claims = ds.transactions_by_type(TransactionType::SubsidyClaim);
    for i in 0..10 {
        let original = claims[i];
        let duplicate = claims[40 + i];
        assert_eq!(duplicate.duplicate_of.as_deref(), Some(original.transaction_id.as_str()));
        assert_eq!(duplicate.farmer_id, original.farmer_id);
        assert_eq!(duplicate.installment(), original.installment());
        assert_eq!(duplicate.amount, 2000.0);
        assert_eq!(duplicate.violation_code, Some(ViolationCode::DuplicateClaims));
    }
    assert!(claims[..40].iter().all(|t| t.duplicate_of.is_none()));
    assert!(claims.iter().all(|t| t.scheme == Some(Scheme::PmKisan)));
}

#[test]
fn farmers_respect_generation_clamps() {
    let ds = dataset();
    for f in ds.farmers() {
        assert!(
            (50_000..=800_000).contains(&f.annual_income),
            "{} income {} outside clamp",
            f.farmer_id,
            f.annual_income
        );
        assert!((0.5..=10.0).contains(&f.farm_size), "{} farm size {}", f.farmer_id, f.farm_size);
        assert_eq!(f.is_taxpayer, f.annual_income >= 300_000);
        assert!(f.fertilizer_usage.urea_bags >= 2);
        assert!(f.fertilizer_usage.dap_bags >= 1);
        assert!(f.fertilizer_usage.potash_bags >= 1);
    }
    // Districts cycle through the fixed enumeration.
    assert_eq!(ds.farmers_by_district(District::Kolhapur).len(), 10);
}

/// Injected breaches are real: the payloads cross the thresholds.
#[test]
fn injected_payloads_cross_thresholds() {
    let ds = dataset();
    for tx in ds.tagged_violations() {
        match (&tx.details, tx.violation_code) {
            (TransactionDetails::InsuranceClaim(d), Some(ViolationCode::LateReporting)) => {
                assert!((4..=8).contains(&d.report_delay_days), "{} delay {}", tx.transaction_id, d.report_delay_days)
            }
            (TransactionDetails::FertilizerPurchase(d), Some(ViolationCode::ExcessFertilizer)) => {
                assert!((52..=62).contains(&d.urea_bags), "{} urea {}", tx.transaction_id, d.urea_bags)
            }
            (TransactionDetails::CropSale(d), Some(ViolationCode::PriceManipulation)) => {
                let ratio = d.sale_price_per_quintal / d.msp_per_quintal;
                assert!(ratio < 0.86, "{} sold at {ratio:.3} of MSP", tx.transaction_id);
            }
            (TransactionDetails::SubsidyClaim(_), Some(ViolationCode::SubsidyLimitExceeded)) => {
                let farmer = ds
                    .farmers()
                    .iter()
                    .find(|f| f.farmer_id == tx.farmer_id)
                    .expect("farmer exists");
                assert!(farmer.farm_size > 2.0);
            }
            (TransactionDetails::SubsidyClaim(_), Some(ViolationCode::DuplicateClaims)) => {
                assert!(tx.duplicate_of.is_some())
            }
            (details, code) => panic!("{} tagged {code:?} on {details:?}", tx.transaction_id),
        }
    }
}

#[test]
fn search_matches_id_name_district_and_crop() {
    let ds = dataset();
    assert_eq!(ds.search_farmers("  ").len(), 50, "Blank query returns everyone");
    assert_eq!(ds.search_farmers("f1001").len(), 1);
    assert_eq!(ds.search_farmers("ramesh")[0].farmer_id, "F1001");
    assert_eq!(ds.search_farmers("KOLHAPUR").len(), 10);
    assert!(ds.search_farmers("no-such-farmer").is_empty());
}

/// An external feed round-trips and keeps referential integrity.
#[test]
fn external_feed_loads_and_rejects_dangling_farmers() {
    let ds = dataset();
    let json = serde_json::to_string(&ds).unwrap();
    let reloaded = Dataset::from_json_str(&json).expect("feed reloads");
    assert_eq!(reloaded.transactions().len(), 200);
    assert_eq!(reloaded.tagged_violations().len(), 60);
    assert_eq!(
        reloaded.transactions()[40].duplicate_of.as_deref(),
        Some("T00001"),
        "duplicate_of must survive the metadata round trip"
    );

    let dangling = r#"{
        "farmers": [],
        "transactions": [{ "transaction_id": "X1", "transaction_type": "crop_sale", "farmer_id": "F9" }]
    }"#;
    let err = Dataset::from_json_str(dangling).unwrap_err();
    assert!(matches!(err, ComplianceError::UnknownFarmer { .. }), "got {err}");

    let anonymous = r#"{ "transactions": [{ "transaction_type": "crop_sale" }] }"#;
    assert!(Dataset::from_json_str(anonymous).is_err(), "Missing ids must be rejected");
}

#[test]
fn feed_rejects_repeated_ids() {
    let twin_farmers = Dataset::new(
        vec![common::farmer("F1", 1.0, 100_000), common::farmer("F1", 3.0, 400_000)],
        vec![],
    )
    .unwrap_err();
    assert!(
        matches!(&twin_farmers, ComplianceError::DuplicateId { kind: "farmer", id } if id == "F1"),
        "got {twin_farmers}"
    );

    let twin_claims = Dataset::new(
        vec![common::farmer("F1", 1.0, 100_000)],
        vec![
            common::subsidy_claim("T1", "F1", "2025-04-01", 2000.0, 1),
            common::subsidy_claim("T1", "F1", "2025-06-01", 2000.0, 1),
        ],
    )
    .unwrap_err();
    assert!(
        matches!(&twin_claims, ComplianceError::DuplicateId { kind: "transaction", id } if id == "T1"),
        "got {twin_claims}"
    );
}
