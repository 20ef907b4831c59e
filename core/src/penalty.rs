//! Penalty calculator.
//!
//! RULE: Only subsidy-fraud codes raised on a subsidy claim are recoverable.
//! Interest is flat: applied once to the principal, never compounded and
//! never prorated over elapsed time.

use crate::{
    config::PenaltyPolicy,
    model::{Penalty, Transaction, TransactionType, ViolationCode},
    types::round2,
};

/// Recoverable amount for one finding of `code` on `transaction`.
pub fn penalty_for(code: ViolationCode, transaction: &Transaction, policy: &PenaltyPolicy) -> Penalty {
    if transaction.transaction_type() != TransactionType::SubsidyClaim || !code.is_subsidy_fraud() {
        return Penalty::none();
    }

    let principal = transaction.amount;
    let rate = policy.subsidy_fraud_interest_rate;
    let interest = round2(principal * rate);
    Penalty {
        principal_amount: principal,
        interest_rate: rate,
        interest_amount: interest,
        total_recoverable: round2(principal + interest),
        rule: format!("{}% flat interest on subsidy fraud recovery", round2(rate * 100.0)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RuleCatalog;
    use crate::model::{SubsidyDetails, TransactionDetails};

    fn claim(amount: f64, details: TransactionDetails) -> Transaction {
        Transaction {
            transaction_id: "T-PEN".into(),
            scheme: None,
            farmer_id: "F1001".into(),
            district: None,
            date: Some("2025-04-01".into()),
            amount,
            details,
            duplicate_of: None,
            is_violation: false,
            violation_code: None,
            violation_note: None,
        }
    }

    fn subsidy(amount: f64) -> Transaction {
        claim(
            amount,
            TransactionDetails::SubsidyClaim(SubsidyDetails {
                installment: 1,
                farm_size_snapshot: None,
            }),
        )
    }

    #[test]
    fn claim_amount_fraud_recovers_principal_plus_24_percent() {
        let catalog = RuleCatalog::standard();
        let penalty = penalty_for(ViolationCode::ClaimAmountExceeded, &subsidy(2000.0), catalog.penalty());
        assert_eq!(penalty.principal_amount, 2000.0);
        assert_eq!(penalty.interest_amount, 480.0);
        assert_eq!(penalty.total_recoverable, 2480.0);
        assert_eq!(penalty.rule, "24% flat interest on subsidy fraud recovery");
    }

    #[test]
    fn interest_rounds_to_two_decimals() {
        let catalog = RuleCatalog::standard();
        let penalty = penalty_for(ViolationCode::DuplicateClaims, &subsidy(1234.567), catalog.penalty());
        assert_eq!(penalty.interest_amount, 296.3);
        assert_eq!(penalty.total_recoverable, 1530.87);
    }

    #[test]
    fn non_fraud_codes_carry_no_penalty() {
        let catalog = RuleCatalog::standard();
        let penalty = penalty_for(ViolationCode::IncomeEligibilityFailed, &subsidy(2000.0), catalog.penalty());
        assert_eq!(penalty, Penalty::none());
        assert!(!penalty.is_recoverable());
    }

    #[test]
    fn fraud_codes_outside_subsidy_claims_carry_no_penalty() {
        let catalog = RuleCatalog::standard();
        let purchase = claim(
            5000.0,
            TransactionDetails::empty(TransactionType::FertilizerPurchase),
        );
        let penalty = penalty_for(ViolationCode::DuplicateClaims, &purchase, catalog.penalty());
        assert_eq!(penalty.total_recoverable, 0.0);
        assert_eq!(penalty.rule, Penalty::NO_PENALTY_RULE);
    }
}
