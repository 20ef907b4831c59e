//! Fertilizer subsidy family.
//!
//! Three independent per-nutrient caps on a single purchase. Bag counts
//! missing from the payload arrive here as zero and never fire.

use crate::{
    model::{Evidence, TransactionDetails, ViolationRule},
    rule_family::{Finding, RuleFamily, RuleInput},
};

pub struct FertilizerFamily;

impl RuleFamily for FertilizerFamily {
    fn name(&self) -> &'static str {
        "fertilizer"
    }

    fn evaluate(&self, input: &RuleInput<'_>) -> Vec<Finding> {
        let tx = input.transaction;
        let TransactionDetails::FertilizerPurchase(details) = &tx.details else {
            return Vec::new();
        };
        let policy = input.catalog.fertilizer();
        let mut findings = Vec::new();

        if details.urea_bags > policy.max_urea_bags {
            findings.push(Finding::new(
                ViolationRule::UreaCap,
                Evidence::new()
                    .with("nutrient", "urea")
                    .with("purchased_bags", details.urea_bags)
                    .with("max_allowed", policy.max_urea_bags)
                    .with("district", tx.district.map(|d| d.as_str())),
            ));
        }

        if details.dap_bags > policy.max_dap_bags {
            findings.push(Finding::new(
                ViolationRule::DapCap,
                Evidence::new()
                    .with("nutrient", "dap")
                    .with("purchased_bags", details.dap_bags)
                    .with("max_allowed", policy.max_dap_bags),
            ));
        }

        if details.potash_bags > policy.max_potash_bags {
            findings.push(Finding::new(
                ViolationRule::PotashCap,
                Evidence::new()
                    .with("nutrient", "potash")
                    .with("purchased_bags", details.potash_bags)
                    .with("max_allowed", policy.max_potash_bags),
            ));
        }

        findings
    }
}
