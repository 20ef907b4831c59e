//! The compliance evaluator: one transaction in, one verdict out.
//!
//! EXECUTION ORDER (fixed, documented, never reordered):
//!   1. Subsidy family     (PM-KISAN eligibility, amount, frequency)
//!   2. Insurance family   (PMFBY reporting window)
//!   3. Fertilizer family  (urea / DAP / potash caps)
//!   4. Market family      (sale price against MSP)
//!   5. Anti-fraud family  (explicit and pattern duplicates)
//!
//! RULES:
//!   - Every family runs on every transaction; none short-circuits another.
//!   - Evaluation is pure: same transaction, partition, farmer and catalog
//!     always yield the same result.
//!   - Malformed input fails with InvalidTransaction, never a compliant verdict.

use crate::{
    anti_fraud_family::AntiFraudFamily,
    config::RuleCatalog,
    error::ComplianceResult,
    explain::explain,
    fertilizer_family::FertilizerFamily,
    insurance_family::InsuranceFamily,
    market_family::MarketFamily,
    model::{District, Farmer, OverallSeverity, Transaction, TransactionType, Violation},
    penalty::penalty_for,
    rule_family::{EvaluationContext, Finding, RuleFamily, RuleInput},
    subsidy_family::SubsidyFamily,
    types::{FarmerId, TransactionId},
};
use serde::Serialize;

/// Verdict for one transaction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationResult {
    pub transaction_id: TransactionId,
    pub farmer_id: FarmerId,
    pub transaction_type: TransactionType,
    /// Transaction district, falling back to the farmer's.
    pub district: Option<District>,
    pub is_compliant: bool,
    pub violation_count: usize,
    pub severity: OverallSeverity,
    pub violations: Vec<Violation>,
    pub explanation: String,
}

pub struct ComplianceEvaluator {
    catalog: RuleCatalog,
    families: Vec<Box<dyn RuleFamily>>,
}

impl ComplianceEvaluator {
    /// An evaluator with no families. Use `build` unless testing a family
    /// in isolation.
    pub fn new(catalog: RuleCatalog) -> Self {
        Self {
            catalog,
            families: Vec::new(),
        }
    }

    /// Build a fully wired evaluator with all families registered.
    pub fn build(catalog: RuleCatalog) -> Self {
        let mut evaluator = Self::new(catalog);
        // EXECUTION ORDER: fixed, documented, never reordered.
        evaluator.register(Box::new(SubsidyFamily));
        evaluator.register(Box::new(InsuranceFamily));
        evaluator.register(Box::new(FertilizerFamily));
        evaluator.register(Box::new(MarketFamily));
        evaluator.register(Box::new(AntiFraudFamily));
        evaluator
    }

    /// Register a family. Call in the documented execution order.
    pub fn register(&mut self, family: Box<dyn RuleFamily>) {
        self.families.push(family);
    }

    pub fn catalog(&self) -> &RuleCatalog {
        &self.catalog
    }

    pub fn family_names(&self) -> Vec<&'static str> {
        self.families.iter().map(|f| f.name()).collect()
    }

    /// Evaluate one transaction. `farmer` overrides the context lookup.
    pub fn evaluate<'a>(
        &self,
        transaction: &'a Transaction,
        farmer: Option<&'a Farmer>,
        context: &'a dyn EvaluationContext,
    ) -> ComplianceResult<EvaluationResult> {
        transaction.validate()?;

        let farmer = farmer.or_else(|| context.farmer(&transaction.farmer_id));
        let year = transaction.year();
        let partition = context.transactions_in_year(&transaction.farmer_id, year);
        let input = RuleInput {
            transaction,
            farmer,
            partition: &partition,
            year,
            catalog: &self.catalog,
        };

        let mut violations = Vec::new();
        for family in &self.families {
            for finding in family.evaluate(&input) {
                log::debug!(
                    "{} raised {} on {}",
                    family.name(),
                    finding.rule.code(),
                    transaction.transaction_id
                );
                violations.push(self.violation_from(finding, transaction));
            }
        }

        Ok(EvaluationResult {
            transaction_id: transaction.transaction_id.clone(),
            farmer_id: transaction.farmer_id.clone(),
            transaction_type: transaction.transaction_type(),
            district: transaction.district.or(farmer.map(|f| f.district)),
            is_compliant: violations.is_empty(),
            violation_count: violations.len(),
            severity: OverallSeverity::of(&violations),
            explanation: explain(transaction, farmer, &violations),
            violations,
        })
    }

    fn violation_from(&self, finding: Finding, transaction: &Transaction) -> Violation {
        let code = finding.rule.code();
        Violation {
            code,
            severity: finding.severity,
            policy_name: finding.rule.policy_name().to_string(),
            transaction_id: transaction.transaction_id.clone(),
            transaction_type: transaction.transaction_type(),
            farmer_id: transaction.farmer_id.clone(),
            evidence: finding.evidence,
            justification: finding.rule.justification().to_string(),
            penalty: penalty_for(code, transaction, self.catalog.penalty()),
        }
    }
}
