//! Explanation builder: renders a verdict as a single narrative string.

use crate::model::{Farmer, Transaction, Violation};

pub const NO_BREACH_EXPLANATION: &str =
    "No compliance breach detected. Transaction aligns with configured policy checks.";

pub fn explain(transaction: &Transaction, farmer: Option<&Farmer>, violations: &[Violation]) -> String {
    if violations.is_empty() {
        return NO_BREACH_EXPLANATION.to_string();
    }

    let farmer_label = match farmer {
        Some(f) => format!("{} / {}", f.name, f.farmer_id),
        None => transaction.farmer_id.clone(),
    };
    let header = format!(
        "Compliance review identified {} issue(s). Transaction: {} ({}) Farmer: {}",
        violations.len(),
        transaction.transaction_id,
        transaction.transaction_type(),
        farmer_label
    );

    let details: Vec<String> = violations
        .iter()
        .enumerate()
        .map(|(i, v)| describe(i + 1, v))
        .collect();

    format!("{header} {}", details.join(" "))
}

fn describe(number: usize, violation: &Violation) -> String {
    let evidence = violation
        .evidence
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join(", ");

    let mut line = format!(
        "{number}. [{}] {} failed ({}). {} Evidence: {evidence}.",
        violation.severity.as_str().to_uppercase(),
        violation.policy_name,
        violation.code,
        violation.justification
    );
    if violation.penalty.is_recoverable() {
        line.push_str(&format!(
            " Penalty: recoverable={}, interest={}.",
            violation.penalty.total_recoverable, violation.penalty.interest_amount
        ));
    }
    line
}
