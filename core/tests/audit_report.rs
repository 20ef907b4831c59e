//! Full-scan, statistics and engine façade tests.

mod common;

use agrisense_core::{
    engine::ComplianceOutcome,
    model::{District, Severity, TransactionType, ViolationCode},
    report::{flatten_violations, statistics, total_recoverable, ScanResult, ViolationFilter},
};
use common::*;

/// Every tagged violation is re-derived from policy and data alone.
#[test]
fn scan_redetects_every_tagged_violation() {
    let engine = synthetic_engine();
    let scan = engine.scan_all_transactions().unwrap();
    assert_eq!(scan.total_transactions, 200);
    assert!(
        scan.violation_transactions >= 60,
        "Expected at least the 60 injected breaches, got {}",
        scan.violation_transactions
    );

    for (tx, result) in engine.get_all_transactions().iter().zip(&scan.results) {
        assert_eq!(tx.transaction_id, result.transaction_id);
        if let Some(code) = tx.violation_code {
            assert!(
                result.violations.iter().any(|v| v.code == code),
                "{} tagged {code} but evaluator found {:?}",
                tx.transaction_id,
                result.violations.iter().map(|v| v.code).collect::<Vec<_>>()
            );
        }
    }
}

/// The duplicated originals are caught by the pattern detector too.
#[test]
fn duplicated_originals_trip_the_pattern_detector() {
    let engine = synthetic_engine();
    let scan = engine.scan_all_transactions().unwrap();
    for result in &scan.results[..10] {
        assert!(
            result
                .violations
                .iter()
                .any(|v| v.policy_name == "Anti-Fraud Duplicate Pattern"),
            "{} should match its linked duplicate",
            result.transaction_id
        );
    }
}

#[test]
fn statistics_roll_up_consistently() {
    let engine = synthetic_engine();
    let scan = engine.scan_all_transactions().unwrap();
    let stats = engine.get_statistics(Some(&scan)).unwrap();

    assert_eq!(stats.total_transactions, 200);
    assert_eq!(stats.compliant_transactions + stats.violation_transactions, 200);
    assert_eq!(stats.compliance_rate_percent, scan.compliance_rate_percent);

    let district_total: usize = District::ALL.iter().map(|d| stats.district(*d).total).sum();
    assert_eq!(district_total, 200, "Every synthetic transaction carries a district");

    let by_code: usize = stats.violations_by_code.values().sum();
    let by_severity = stats.severity_breakdown.high
        + stats.severity_breakdown.medium
        + stats.severity_breakdown.low;
    let raised: usize = scan.results.iter().map(|r| r.violation_count).sum();
    assert_eq!(by_code, raised);
    assert_eq!(by_severity, raised);

    let by_type: usize = stats.transaction_type_violation_breakdown.values().sum();
    assert_eq!(by_type, raised, "Type breakdown counts violations, not transactions");
    assert!(stats.violations_by_code[&ViolationCode::PriceManipulation] >= 11);
}

/// A purchase breaching all three caps counts three times in the type breakdown.
#[test]
fn type_breakdown_counts_each_violation() {
    let engine = engine_with(
        vec![farmer("F1", 1.0, 100_000)],
        vec![
            fertilizer_purchase("T1", "F1", 60, 31, 26),
            fertilizer_purchase("T2", "F1", 10, 5, 5),
            crop_sale("T3", "F1", 2000.0, 1500.0),
        ],
    );
    let stats = engine.get_statistics(None).unwrap();
    assert_eq!(stats.violation_transactions, 2);
    assert_eq!(
        stats.transaction_type_violation_breakdown.get(&TransactionType::FertilizerPurchase),
        Some(&3)
    );
    assert_eq!(
        stats.transaction_type_violation_breakdown.get(&TransactionType::CropSale),
        Some(&1)
    );
    assert_eq!(stats.violations_by_code[&ViolationCode::ExcessFertilizer], 1);
    assert_eq!(stats.violations_by_code[&ViolationCode::DapLimitExceeded], 1);
}

/// Districts are seeded from the fixed enumeration, even when empty.
#[test]
fn statistics_always_list_every_district() {
    let empty = statistics(&ScanResult::from_results(Vec::new()));
    assert_eq!(empty.total_transactions, 0);
    assert_eq!(empty.compliance_rate_percent, 0.0);
    for district in District::ALL {
        assert_eq!(empty.district(district).total, 0);
        assert!(
            empty.totals_by_district.contains_key(district.as_str()),
            "{district} missing from empty statistics"
        );
    }

    let engine = synthetic_engine();
    let scan = engine.scan_all_transactions().unwrap();
    let pune_only = scan.filtered(|r| r.district == Some(District::Pune));
    let stats = statistics(&pune_only);
    assert_eq!(stats.totals_by_district.len(), District::ALL.len());
    assert_eq!(stats.district(District::Pune).total, pune_only.total_transactions);
    assert_eq!(stats.district(District::Nashik).total, 0);
}

#[test]
fn violation_rows_filter_and_sum() {
    let engine = synthetic_engine();
    let scan = engine.scan_all_transactions().unwrap();
    let rows = flatten_violations(&scan);
    let raised: usize = scan.results.iter().map(|r| r.violation_count).sum();
    assert_eq!(rows.len(), raised);

    let first = &rows[0];
    assert!(
        first.violation_id.starts_with(&format!("{}::{}::", first.transaction_id, first.code)),
        "Unexpected violation id {}",
        first.violation_id
    );

    let high_subsidy = ViolationFilter {
        severity: Some(Severity::High),
        transaction_type: Some(TransactionType::SubsidyClaim),
    }
    .apply(&rows);
    assert!(!high_subsidy.is_empty());
    assert!(high_subsidy
        .iter()
        .all(|r| r.severity == Severity::High && r.transaction_type == TransactionType::SubsidyClaim));

    let recoverable = total_recoverable(&rows);
    let fraud_only = total_recoverable(high_subsidy.iter().copied());
    assert!(recoverable > 0.0);
    assert_eq!(recoverable, fraud_only, "Only high subsidy fraud carries a penalty here");
}

#[test]
fn farmer_summary_reports_recent_breaches() {
    let engine = synthetic_engine();
    let summary = engine
        .get_farmer_compliance_summary("F1001")
        .unwrap()
        .expect("F1001 exists");
    assert_eq!(summary.name, "Ramesh Patil");
    assert_eq!(summary.total_transactions, engine.get_transactions_by_farmer("F1001").len());
    assert!(summary.recent_violations.len() <= 5);
    assert_eq!(
        summary.recent_violations.len(),
        summary.violation_count.min(5)
    );
    assert!((0.0..=100.0).contains(&summary.compliance_percent));

    assert!(engine.get_farmer_compliance_summary("F9999").unwrap().is_none());
}

#[test]
fn farmer_without_transactions_is_fully_compliant() {
    let engine = engine_with(vec![farmer("F1", 1.0, 100_000)], vec![]);
    let summary = engine.get_farmer_compliance_summary("F1").unwrap().unwrap();
    assert_eq!(summary.total_transactions, 0);
    assert_eq!(summary.compliance_percent, 100.0);
}

#[test]
fn evaluate_compliance_dispatches_on_input() {
    let engine = synthetic_engine();
    let tx = engine.get_transaction_by_id("T00041").expect("first duplicate exists").clone();
    match engine.evaluate_compliance(Some(&tx)).unwrap() {
        ComplianceOutcome::Single(result) => assert_eq!(result.transaction_id, "T00041"),
        ComplianceOutcome::Scan(_) => panic!("A transaction with an id is checked alone"),
    }

    let mut anonymous = tx;
    anonymous.transaction_id.clear();
    match engine.evaluate_compliance(Some(&anonymous)).unwrap() {
        ComplianceOutcome::Scan(scan) => assert_eq!(scan.total_transactions, 200),
        ComplianceOutcome::Single(_) => panic!("No id falls back to a full scan"),
    }
}

/// Every raised violation with a published rule points at its policy section.
#[test]
fn violations_trace_to_policy_sections() {
    let engine = synthetic_engine();
    let scan = engine.scan_all_transactions().unwrap();
    let mut traced = 0;
    for violation in scan.results.iter().flat_map(|r| &r.violations) {
        let highlight = engine.highlight_violation(violation).unwrap();
        if violation.code == ViolationCode::PriceManipulation {
            assert!(highlight.is_none(), "Fair-price findings have no published rule");
            continue;
        }
        let hit = highlight.unwrap_or_else(|| panic!("{} has no policy reference", violation.code));
        assert!(hit.found, "{} rule missing from {}", violation.code, hit.policy_id);
        assert!(hit.highlighted_section.is_some());
        traced += 1;
    }
    assert!(traced > 0, "Expected at least one traceable violation");

    let late = engine.policies().load_policy("PMFBY").unwrap();
    assert_eq!(late.rule("PMF-001").map(|r| r.severity.as_str()), Some("medium"));
}
