//! PMFBY crop-insurance family: reporting-delay window.

use crate::{
    config::RuleCatalog,
    model::{Evidence, TransactionDetails, ViolationRule},
    rule_family::{Finding, RuleFamily, RuleInput},
};

pub struct InsuranceFamily;

impl RuleFamily for InsuranceFamily {
    fn name(&self) -> &'static str {
        "insurance"
    }

    fn evaluate(&self, input: &RuleInput<'_>) -> Vec<Finding> {
        let tx = input.transaction;
        let TransactionDetails::InsuranceClaim(details) = &tx.details else {
            return Vec::new();
        };
        if !tx.is_scheme(&RuleCatalog::INSURANCE_SCHEME) {
            return Vec::new();
        }

        let max_delay = input.catalog.pmfby().max_reporting_delay_days;
        if details.report_delay_days <= max_delay {
            return Vec::new();
        }
        vec![Finding::new(
            ViolationRule::ReportingTimeline,
            Evidence::new()
                .with("report_delay_days", details.report_delay_days)
                .with("max_allowed", max_delay)
                .with("event_date", details.event_date.clone())
                .with("reported_date", tx.date.clone()),
        )]
    }
}
