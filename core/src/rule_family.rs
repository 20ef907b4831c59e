//! Rule family trait and the inputs every family sees.
//!
//! RULE: Every rule family implements RuleFamily.
//! The evaluator runs every registered family on every transaction,
//! in registration order. Families never short-circuit each other.
//! Execution order is fixed and documented in evaluator.rs.
//!
//! RULE: Families read the transaction, the farmer, the farmer's same-year
//! partition and the catalog. Nothing else. Generation-time tags
//! (`is_violation`, `violation_code`) are never consulted.

use crate::{
    config::RuleCatalog,
    model::{Evidence, Farmer, Severity, Transaction, ViolationRule},
    types::YearPartition,
};

/// Read-only lookups an evaluation may need beyond the transaction itself.
pub trait EvaluationContext {
    fn farmer(&self, farmer_id: &str) -> Option<&Farmer>;

    /// Every transaction of `farmer_id` dated in `year`, in dataset order.
    fn transactions_in_year(&self, farmer_id: &str, year: YearPartition) -> Vec<&Transaction>;
}

pub struct RuleInput<'a> {
    pub transaction: &'a Transaction,
    pub farmer: Option<&'a Farmer>,
    /// Same farmer, same year partition. May include `transaction` itself.
    pub partition: &'a [&'a Transaction],
    pub year: YearPartition,
    pub catalog: &'a RuleCatalog,
}

/// One rule firing, before it is dressed up as a `Violation`.
#[derive(Debug, Clone, PartialEq)]
pub struct Finding {
    pub rule: ViolationRule,
    pub severity: Severity,
    pub evidence: Evidence,
}

impl Finding {
    /// A finding at the rule's fixed severity.
    pub fn new(rule: ViolationRule, evidence: Evidence) -> Self {
        Self {
            rule,
            severity: rule.severity(),
            evidence,
        }
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }
}

/// The contract every rule family must fulfill.
pub trait RuleFamily: Send + Sync {
    /// Unique stable name for this family.
    fn name(&self) -> &'static str;

    /// Zero or more findings for one transaction. Pure: no side effects.
    fn evaluate(&self, input: &RuleInput<'_>) -> Vec<Finding>;
}
