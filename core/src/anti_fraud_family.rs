//! Anti-fraud family: duplicate claim detection.
//!
//! Two independent detectors, both reporting `duplicate_claims`:
//!   1. Explicit link: the transaction names the claim it duplicates.
//!      Applies to every transaction type.
//!   2. Pattern: another PM-KISAN claim by the same farmer in the same year
//!      repeats both the amount and the installment.
//!
//! A linked duplicate that also repeats its original's pattern fires both.

use crate::{
    config::RuleCatalog,
    model::{Evidence, TransactionType, ViolationRule},
    rule_family::{Finding, RuleFamily, RuleInput},
};

pub struct AntiFraudFamily;

impl AntiFraudFamily {
    fn explicit_duplicate(&self, input: &RuleInput<'_>) -> Option<Finding> {
        let tx = input.transaction;
        let original = tx.duplicate_of.as_deref()?;
        Some(Finding::new(
            ViolationRule::ExplicitDuplicate,
            Evidence::new()
                .with("duplicate_of", original)
                .with("current_transaction", tx.transaction_id.as_str())
                .with("scheme", tx.scheme.as_ref().map(|s| s.as_str()))
                .with("year", input.year.to_string()),
        ))
    }

    fn duplicate_pattern(&self, input: &RuleInput<'_>) -> Option<Finding> {
        let tx = input.transaction;
        if tx.transaction_type() != TransactionType::SubsidyClaim
            || !tx.is_scheme(&RuleCatalog::SUBSIDY_SCHEME)
        {
            return None;
        }

        let installment = tx.installment();
        let matches: Vec<String> = input
            .partition
            .iter()
            .filter(|other| {
                other.transaction_id != tx.transaction_id
                    && other.transaction_type() == TransactionType::SubsidyClaim
                    && other.scheme == tx.scheme
                    && other.amount == tx.amount
                    && other.installment() == installment
            })
            .map(|other| other.transaction_id.clone())
            .collect();
        if matches.is_empty() {
            return None;
        }

        Some(Finding::new(
            ViolationRule::DuplicatePattern,
            Evidence::new()
                .with("suspicious_matches", matches)
                .with("repeated_installment", installment)
                .with("repeated_amount", tx.amount),
        ))
    }
}

impl RuleFamily for AntiFraudFamily {
    fn name(&self) -> &'static str {
        "anti_fraud"
    }

    fn evaluate(&self, input: &RuleInput<'_>) -> Vec<Finding> {
        self.explicit_duplicate(input)
            .into_iter()
            .chain(self.duplicate_pattern(input))
            .collect()
    }
}
