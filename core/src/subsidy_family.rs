//! PM-KISAN subsidy family.
//!
//! Applies only to `subsidy_claim` transactions under PM-KISAN.
//! Four independent checks, in order:
//!   1. Farm size above the cap
//!   2. Annual income above the cap
//!   3. Claim amount above the per-installment limit
//!   4. More same-scheme claims in the calendar year than allowed

use crate::{
    config::RuleCatalog,
    model::{Evidence, TransactionType, ViolationRule},
    rule_family::{Finding, RuleFamily, RuleInput},
};

pub struct SubsidyFamily;

impl RuleFamily for SubsidyFamily {
    fn name(&self) -> &'static str {
        "subsidy"
    }

    fn evaluate(&self, input: &RuleInput<'_>) -> Vec<Finding> {
        let tx = input.transaction;
        if tx.transaction_type() != TransactionType::SubsidyClaim
            || !tx.is_scheme(&RuleCatalog::SUBSIDY_SCHEME)
        {
            return Vec::new();
        }
        let policy = input.catalog.pm_kisan();
        let scheme = RuleCatalog::SUBSIDY_SCHEME;
        let mut findings = Vec::new();

        if let Some(farmer) = input.farmer {
            if farmer.farm_size > policy.max_farm_size_ha {
                findings.push(Finding::new(
                    ViolationRule::FarmSizeEligibility,
                    Evidence::new()
                        .with("farm_size", farmer.farm_size)
                        .with("max_allowed", policy.max_farm_size_ha)
                        .with("claim_amount", tx.amount)
                        .with("scheme", scheme.as_str()),
                ));
            }

            if farmer.annual_income > policy.max_income {
                findings.push(Finding::new(
                    ViolationRule::IncomeEligibility,
                    Evidence::new()
                        .with("annual_income", farmer.annual_income)
                        .with("max_allowed", policy.max_income)
                        .with("is_taxpayer", farmer.is_taxpayer),
                ));
            }
        }

        if tx.amount > policy.max_claim_amount {
            findings.push(Finding::new(
                ViolationRule::ClaimAmountLimit,
                Evidence::new()
                    .with("claim_amount", tx.amount)
                    .with("max_allowed", policy.max_claim_amount)
                    .with("installment", tx.installment()),
            ));
        }

        let claims_in_year = input
            .partition
            .iter()
            .filter(|t| {
                t.transaction_type() == TransactionType::SubsidyClaim
                    && t.is_scheme(&RuleCatalog::SUBSIDY_SCHEME)
            })
            .count();
        if claims_in_year > policy.max_claims_per_year {
            findings.push(Finding::new(
                ViolationRule::AnnualClaimLimit,
                Evidence::new()
                    .with("claims_in_year", claims_in_year)
                    .with("max_allowed", policy.max_claims_per_year)
                    .with("year", input.year.to_string()),
            ));
        }

        findings
    }
}
