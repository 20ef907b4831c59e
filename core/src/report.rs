//! Aggregator / reporter.
//!
//! Scans transactions through the evaluator and rolls verdicts into
//! district, severity, code and type level statistics.
//!
//! RULE: Statistics never fail. Empty input yields zero-valued aggregates,
//! and every district in `District::ALL` is always present.

use crate::{
    error::ComplianceResult,
    evaluator::{ComplianceEvaluator, EvaluationResult},
    model::{
        District, Evidence, Penalty, Severity, Transaction, TransactionType, ViolationCode,
    },
    rule_family::EvaluationContext,
    types::{round2, to_percent, Amount, FarmerId, TransactionId},
};
use serde::Serialize;
use std::collections::BTreeMap;

pub const UNKNOWN_DISTRICT: &str = "Unknown";

// ── Scan ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanResult {
    pub total_transactions: usize,
    pub compliant_transactions: usize,
    pub violation_transactions: usize,
    pub compliance_rate_percent: f64,
    pub results: Vec<EvaluationResult>,
}

impl ScanResult {
    pub fn from_results(results: Vec<EvaluationResult>) -> Self {
        let total = results.len();
        let compliant = results.iter().filter(|r| r.is_compliant).count();
        Self {
            total_transactions: total,
            compliant_transactions: compliant,
            violation_transactions: total - compliant,
            compliance_rate_percent: to_percent(compliant as f64, total as f64),
            results,
        }
    }

    /// A new scan holding only the results that match `keep`, totals recomputed.
    pub fn filtered(&self, keep: impl Fn(&EvaluationResult) -> bool) -> Self {
        Self::from_results(self.results.iter().filter(|r| keep(r)).cloned().collect())
    }

    pub fn non_compliant(&self) -> impl Iterator<Item = &EvaluationResult> {
        self.results.iter().filter(|r| !r.is_compliant)
    }
}

/// Evaluate every transaction independently, in input order.
pub fn scan_all(
    evaluator: &ComplianceEvaluator,
    transactions: &[Transaction],
    context: &dyn EvaluationContext,
) -> ComplianceResult<ScanResult> {
    let results = transactions
        .iter()
        .map(|tx| evaluator.evaluate(tx, None, context))
        .collect::<ComplianceResult<Vec<_>>>()?;
    let scan = ScanResult::from_results(results);

    if scan.violation_transactions > 0 {
        log::warn!(
            "Scan flagged {} of {} transactions ({}% compliant)",
            scan.violation_transactions,
            scan.total_transactions,
            scan.compliance_rate_percent
        );
    } else {
        log::info!("Scan of {} transactions found no breaches", scan.total_transactions);
    }
    Ok(scan)
}

// ── Statistics ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DistrictTotals {
    pub total: usize,
    pub compliant: usize,
    pub violations: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeverityBreakdown {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl SeverityBreakdown {
    fn record(&mut self, severity: Severity) {
        match severity {
            Severity::High => self.high += 1,
            Severity::Medium => self.medium += 1,
            Severity::Low => self.low += 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComplianceStatistics {
    pub total_transactions: usize,
    pub compliant_transactions: usize,
    pub violation_transactions: usize,
    pub compliance_rate_percent: f64,
    /// Keyed by district name; results without a district land under "Unknown".
    pub totals_by_district: BTreeMap<String, DistrictTotals>,
    /// Number of violations raised per code.
    pub violations_by_code: BTreeMap<ViolationCode, usize>,
    /// Number of violations per severity.
    pub severity_breakdown: SeverityBreakdown,
    /// Number of violations raised per transaction type.
    pub transaction_type_violation_breakdown: BTreeMap<TransactionType, usize>,
}

impl ComplianceStatistics {
    pub fn district(&self, district: District) -> DistrictTotals {
        self.totals_by_district
            .get(district.as_str())
            .copied()
            .unwrap_or_default()
    }
}

pub fn statistics(scan: &ScanResult) -> ComplianceStatistics {
    let mut totals_by_district: BTreeMap<String, DistrictTotals> = District::ALL
        .iter()
        .map(|d| (d.as_str().to_string(), DistrictTotals::default()))
        .collect();
    let mut violations_by_code = BTreeMap::new();
    let mut severity_breakdown = SeverityBreakdown::default();
    let mut type_breakdown = BTreeMap::new();

    for result in &scan.results {
        let district = result.district.map_or(UNKNOWN_DISTRICT, |d| d.as_str());
        let totals = totals_by_district.entry(district.to_string()).or_default();
        totals.total += 1;
        if result.is_compliant {
            totals.compliant += 1;
        } else {
            totals.violations += 1;
        }

        for violation in &result.violations {
            *violations_by_code.entry(violation.code).or_insert(0) += 1;
            severity_breakdown.record(violation.severity);
            *type_breakdown.entry(violation.transaction_type).or_insert(0) += 1;
        }
    }

    let total = scan.results.len();
    let compliant = scan.results.iter().filter(|r| r.is_compliant).count();
    ComplianceStatistics {
        total_transactions: total,
        compliant_transactions: compliant,
        violation_transactions: total - compliant,
        compliance_rate_percent: to_percent(compliant as f64, total as f64),
        totals_by_district,
        violations_by_code,
        severity_breakdown,
        transaction_type_violation_breakdown: type_breakdown,
    }
}

// ── Violation rows ───────────────────────────────────────────────────────────

/// One violation flattened with its transaction context, for tabular views.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViolationRow {
    pub violation_id: String,
    pub transaction_id: TransactionId,
    pub farmer_id: FarmerId,
    pub district: String,
    pub transaction_type: TransactionType,
    pub code: ViolationCode,
    pub severity: Severity,
    pub policy_name: String,
    pub evidence: Evidence,
    pub penalty: Penalty,
    pub justification: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViolationFilter {
    pub severity: Option<Severity>,
    pub transaction_type: Option<TransactionType>,
}

impl ViolationFilter {
    pub fn matches(&self, row: &ViolationRow) -> bool {
        self.severity.is_none_or(|s| s == row.severity)
            && self.transaction_type.is_none_or(|t| t == row.transaction_type)
    }

    pub fn apply<'a>(&self, rows: &'a [ViolationRow]) -> Vec<&'a ViolationRow> {
        rows.iter().filter(|row| self.matches(row)).collect()
    }
}

pub fn flatten_violations(scan: &ScanResult) -> Vec<ViolationRow> {
    scan.results
        .iter()
        .flat_map(|result| {
            let district = result
                .district
                .map_or(UNKNOWN_DISTRICT, |d| d.as_str())
                .to_string();
            result.violations.iter().enumerate().map(move |(i, v)| ViolationRow {
                violation_id: format!("{}::{}::{}", v.transaction_id, v.code, i),
                transaction_id: v.transaction_id.clone(),
                farmer_id: v.farmer_id.clone(),
                district: district.clone(),
                transaction_type: v.transaction_type,
                code: v.code,
                severity: v.severity,
                policy_name: v.policy_name.clone(),
                evidence: v.evidence.clone(),
                penalty: v.penalty.clone(),
                justification: v.justification.clone(),
            })
        })
        .collect()
}

pub fn total_recoverable<'a>(rows: impl IntoIterator<Item = &'a ViolationRow>) -> Amount {
    round2(rows.into_iter().map(|r| r.penalty.total_recoverable).sum())
}
