//! The compliance engine: the façade presentation layers talk to.
//!
//! An engine owns a rule catalog, a wired evaluator, the policy library and a
//! handle to the current dataset snapshot. There is no global instance: callers construct
//! one and pass it by reference.
//!
//! RULES:
//!   - The snapshot is immutable. `refresh` builds a complete new snapshot
//!     and swaps the handle in one assignment.
//!   - Dataset drift is fatal: constructors and `refresh` propagate
//!     DatasetInvariant and leave no engine or snapshot behind.

use crate::{
    config::RuleCatalog,
    dataset::Dataset,
    error::ComplianceResult,
    evaluator::{ComplianceEvaluator, EvaluationResult},
    generator::DatasetGenerator,
    model::{Farmer, Transaction, Violation},
    policy::{PolicyLibrary, RuleHighlight},
    report::{self, ComplianceStatistics, ScanResult},
    rng::RngBank,
    snapshot::DatasetSnapshot,
    types::to_percent,
};
use serde::Serialize;
use std::sync::Arc;

pub const RECENT_VIOLATION_LIMIT: usize = 5;

/// Compliance posture of a single farmer, from fresh evaluations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FarmerComplianceSummary {
    pub farmer_id: String,
    pub name: String,
    pub district: String,
    pub total_transactions: usize,
    pub violation_count: usize,
    /// 100 when the farmer has no transactions.
    pub compliance_percent: f64,
    /// Up to the last five non-compliant verdicts, in dataset order.
    pub recent_violations: Vec<EvaluationResult>,
}

/// Either verdict `evaluate_compliance` can produce.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ComplianceOutcome {
    Single(EvaluationResult),
    Scan(ScanResult),
}

pub struct ComplianceEngine {
    evaluator: ComplianceEvaluator,
    policies: PolicyLibrary,
    snapshot: Arc<DatasetSnapshot>,
    rng: RngBank,
}

impl ComplianceEngine {
    /// Engine over an externally supplied dataset.
    pub fn new(catalog: RuleCatalog, dataset: Dataset) -> Self {
        Self {
            evaluator: ComplianceEvaluator::build(catalog),
            policies: PolicyLibrary::standard(),
            snapshot: Arc::new(DatasetSnapshot::build(dataset)),
            rng: RngBank::default(),
        }
    }

    /// Standard catalog over the synthetic dataset.
    pub fn build() -> ComplianceResult<Self> {
        Self::with_seed(RuleCatalog::standard(), RngBank::default())
    }

    pub fn with_seed(catalog: RuleCatalog, rng: RngBank) -> ComplianceResult<Self> {
        let dataset = DatasetGenerator::new(rng).generate()?;
        let mut engine = Self::new(catalog, dataset);
        engine.rng = rng;
        Ok(engine)
    }

    pub fn catalog(&self) -> &RuleCatalog {
        self.evaluator.catalog()
    }

    pub fn evaluator(&self) -> &ComplianceEvaluator {
        &self.evaluator
    }

    pub fn policies(&self) -> &PolicyLibrary {
        &self.policies
    }

    /// The policy section a violation breaches. `None` for findings with no
    /// published rule.
    pub fn highlight_violation(&self, violation: &Violation) -> ComplianceResult<Option<RuleHighlight>> {
        let (Some(policy_id), Some(rule_id)) = (violation.code.policy_id(), violation.code.policy_rule_id())
        else {
            return Ok(None);
        };
        self.policies.highlight_violation(policy_id, rule_id).map(Some)
    }

    /// Handle to the current snapshot. Stays valid across `refresh`.
    pub fn snapshot(&self) -> Arc<DatasetSnapshot> {
        Arc::clone(&self.snapshot)
    }

    /// Regenerate the synthetic dataset, rebuild every index and swap the
    /// snapshot in. On drift the current snapshot stays in place.
    pub fn refresh(&mut self) -> ComplianceResult<()> {
        let generator = DatasetGenerator::new(self.rng);
        self.reload(|| generator.generate())
    }

    /// Swap in the dataset `source` builds. If it fails, the error is
    /// returned and the current snapshot stays in place.
    pub fn reload<F>(&mut self, source: F) -> ComplianceResult<()>
    where
        F: FnOnce() -> ComplianceResult<Dataset>,
    {
        let dataset = source().inspect_err(|e| {
            log::error!("Reload failed, keeping current snapshot: {e}");
        })?;
        self.load_dataset(dataset);
        Ok(())
    }

    /// Index an external `dataset` and swap it in.
    pub fn load_dataset(&mut self, dataset: Dataset) {
        let snapshot = DatasetSnapshot::build(dataset);
        log::info!(
            "Engine refreshed: {} farmers, {} transactions",
            snapshot.farmers().len(),
            snapshot.transactions().len()
        );
        self.snapshot = Arc::new(snapshot);
    }

    // ── Evaluation ───────────────────────────────────────────────────────────

    pub fn check_compliance(
        &self,
        transaction: &Transaction,
        farmer: Option<&Farmer>,
    ) -> ComplianceResult<EvaluationResult> {
        self.evaluator.evaluate(transaction, farmer, self.snapshot.as_ref())
    }

    pub fn scan_all_transactions(&self) -> ComplianceResult<ScanResult> {
        report::scan_all(&self.evaluator, self.snapshot.transactions(), self.snapshot.as_ref())
    }

    /// Statistics over `scan`, or over a fresh full scan when `None`.
    pub fn get_statistics(&self, scan: Option<&ScanResult>) -> ComplianceResult<ComplianceStatistics> {
        match scan {
            Some(scan) => Ok(report::statistics(scan)),
            None => Ok(report::statistics(&self.scan_all_transactions()?)),
        }
    }

    /// Single check for a transaction with an id, full scan otherwise.
    pub fn evaluate_compliance(
        &self,
        transaction: Option<&Transaction>,
    ) -> ComplianceResult<ComplianceOutcome> {
        match transaction.filter(|t| !t.transaction_id.trim().is_empty()) {
            Some(tx) => self.check_compliance(tx, None).map(ComplianceOutcome::Single),
            None => self.scan_all_transactions().map(ComplianceOutcome::Scan),
        }
    }

    // ── Accessors ────────────────────────────────────────────────────────────

    pub fn get_all_farmers(&self) -> &[Farmer] {
        self.snapshot.farmers()
    }

    pub fn get_farmer_by_id(&self, farmer_id: &str) -> Option<&Farmer> {
        self.snapshot.farmer(farmer_id)
    }

    pub fn get_all_transactions(&self) -> &[Transaction] {
        self.snapshot.transactions()
    }

    pub fn get_transaction_by_id(&self, transaction_id: &str) -> Option<&Transaction> {
        self.snapshot.transaction(transaction_id)
    }

    pub fn get_transactions_by_farmer(&self, farmer_id: &str) -> Vec<&Transaction> {
        self.snapshot.transactions_for_farmer(farmer_id)
    }

    pub fn get_farmer_compliance_summary(
        &self,
        farmer_id: &str,
    ) -> ComplianceResult<Option<FarmerComplianceSummary>> {
        let Some(farmer) = self.snapshot.farmer(farmer_id) else {
            return Ok(None);
        };

        let results = self
            .snapshot
            .transactions_for_farmer(farmer_id)
            .into_iter()
            .map(|tx| self.check_compliance(tx, Some(farmer)))
            .collect::<ComplianceResult<Vec<_>>>()?;

        let total = results.len();
        let failing: Vec<EvaluationResult> = results.into_iter().filter(|r| !r.is_compliant).collect();
        let violation_count = failing.len();
        let compliance_percent = if total == 0 {
            100.0
        } else {
            to_percent((total - violation_count) as f64, total as f64)
        };
        let older = violation_count.saturating_sub(RECENT_VIOLATION_LIMIT);
        let recent_violations = failing.into_iter().skip(older).collect();

        Ok(Some(FarmerComplianceSummary {
            farmer_id: farmer.farmer_id.clone(),
            name: farmer.name.clone(),
            district: farmer.district.to_string(),
            total_transactions: total,
            violation_count,
            compliance_percent,
            recent_violations,
        }))
    }
}
