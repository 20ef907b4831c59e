//! Market fair-price family.
//!
//! A crop sale below its MSP benchmark is graded by the size of the gap.
//! Sales missing either price are skipped, so a zero MSP never divides.

use crate::{
    model::{Evidence, Severity, TransactionDetails, ViolationRule},
    rule_family::{Finding, RuleFamily, RuleInput},
    types::to_percent,
};

// ── Constants ────────────────────────────────────────────────────────────────

const HIGH_GAP_PERCENT: f64 = 20.0;
const MEDIUM_GAP_PERCENT: f64 = 10.0;

pub struct MarketFamily;

/// Severity for a sale `gap_percent` below MSP.
pub fn gap_severity(gap_percent: f64) -> Severity {
    if gap_percent >= HIGH_GAP_PERCENT {
        Severity::High
    } else if gap_percent >= MEDIUM_GAP_PERCENT {
        Severity::Medium
    } else {
        Severity::Low
    }
}

impl RuleFamily for MarketFamily {
    fn name(&self) -> &'static str {
        "market"
    }

    fn evaluate(&self, input: &RuleInput<'_>) -> Vec<Finding> {
        let TransactionDetails::CropSale(details) = &input.transaction.details else {
            return Vec::new();
        };
        let msp = details.msp_per_quintal;
        let sale = details.sale_price_per_quintal;
        if !(msp > 0.0 && sale > 0.0 && sale < msp) {
            return Vec::new();
        }

        let gap_percent = to_percent(msp - sale, msp);
        vec![Finding::new(
            ViolationRule::FairPrice,
            Evidence::new()
                .with("crop", details.crop.as_deref().unwrap_or("Unknown"))
                .with("sale_price_per_quintal", sale)
                .with("msp_per_quintal", msp)
                .with("below_msp_by_percent", gap_percent),
        )
        .with_severity(gap_severity(gap_percent))]
    }
}
