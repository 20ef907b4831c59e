//! Violation taxonomy and the records the evaluator emits.

use crate::{
    model::TransactionType,
    types::{Amount, FarmerId, TransactionId},
};
use serde::{ser::SerializeMap, Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

/// Domain findings, not software errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationCode {
    SubsidyLimitExceeded,
    IncomeEligibilityFailed,
    ClaimAmountExceeded,
    ClaimFrequencyExceeded,
    LateReporting,
    ExcessFertilizer,
    DapLimitExceeded,
    PotashLimitExceeded,
    PriceManipulation,
    DuplicateClaims,
}

impl ViolationCode {
    pub const ALL: [ViolationCode; 10] = [
        Self::SubsidyLimitExceeded,
        Self::IncomeEligibilityFailed,
        Self::ClaimAmountExceeded,
        Self::ClaimFrequencyExceeded,
        Self::LateReporting,
        Self::ExcessFertilizer,
        Self::DapLimitExceeded,
        Self::PotashLimitExceeded,
        Self::PriceManipulation,
        Self::DuplicateClaims,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SubsidyLimitExceeded => "subsidy_limit_exceeded",
            Self::IncomeEligibilityFailed => "income_eligibility_failed",
            Self::ClaimAmountExceeded => "claim_amount_exceeded",
            Self::ClaimFrequencyExceeded => "claim_frequency_exceeded",
            Self::LateReporting => "late_reporting",
            Self::ExcessFertilizer => "excess_fertilizer",
            Self::DapLimitExceeded => "dap_limit_exceeded",
            Self::PotashLimitExceeded => "potash_limit_exceeded",
            Self::PriceManipulation => "price_manipulation",
            Self::DuplicateClaims => "duplicate_claims",
        }
    }

    /// Codes treated as subsidy fraud: recoverable with interest when raised
    /// on a subsidy claim.
    pub fn is_subsidy_fraud(&self) -> bool {
        matches!(
            self,
            Self::SubsidyLimitExceeded
                | Self::DuplicateClaims
                | Self::ClaimAmountExceeded
                | Self::ClaimFrequencyExceeded
        )
    }

    /// Policy rule id this finding breaches, if the policy library carries one.
    pub fn policy_rule_id(&self) -> Option<&'static str> {
        match self {
            Self::SubsidyLimitExceeded => Some("PMK-001"),
            Self::IncomeEligibilityFailed => Some("PMK-002"),
            Self::ClaimAmountExceeded => Some("PMK-003"),
            Self::ClaimFrequencyExceeded => Some("PMK-004"),
            Self::DuplicateClaims => Some("PMK-005"),
            Self::LateReporting => Some("PMF-001"),
            Self::ExcessFertilizer => Some("FER-001"),
            Self::DapLimitExceeded => Some("FER-002"),
            Self::PotashLimitExceeded => Some("FER-003"),
            Self::PriceManipulation => None,
        }
    }

    /// Policy document id the finding's rule lives in.
    pub fn policy_id(&self) -> Option<&'static str> {
        self.policy_rule_id().map(|rule| match &rule[..3] {
            "PMK" => "pm-kisan",
            "PMF" => "pmfby",
            _ => "fertilizer",
        })
    }
}

impl fmt::Display for ViolationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Worst severity across a verdict; `None` when compliant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverallSeverity {
    None,
    Low,
    Medium,
    High,
}

impl OverallSeverity {
    pub fn of(violations: &[Violation]) -> Self {
        violations
            .iter()
            .map(|v| v.severity)
            .max()
            .map(Self::from)
            .unwrap_or(Self::None)
    }
}

impl From<Severity> for OverallSeverity {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Low => Self::Low,
            Severity::Medium => Self::Medium,
            Severity::High => Self::High,
        }
    }
}

/// The concrete rules the evaluator applies. Several rules can share a code
/// (explicit and pattern duplicates both report `duplicate_claims`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViolationRule {
    FarmSizeEligibility,
    IncomeEligibility,
    ClaimAmountLimit,
    AnnualClaimLimit,
    ReportingTimeline,
    UreaCap,
    DapCap,
    PotashCap,
    FairPrice,
    ExplicitDuplicate,
    DuplicatePattern,
}

impl ViolationRule {
    pub fn code(&self) -> ViolationCode {
        match self {
            Self::FarmSizeEligibility => ViolationCode::SubsidyLimitExceeded,
            Self::IncomeEligibility => ViolationCode::IncomeEligibilityFailed,
            Self::ClaimAmountLimit => ViolationCode::ClaimAmountExceeded,
            Self::AnnualClaimLimit => ViolationCode::ClaimFrequencyExceeded,
            Self::ReportingTimeline => ViolationCode::LateReporting,
            Self::UreaCap => ViolationCode::ExcessFertilizer,
            Self::DapCap => ViolationCode::DapLimitExceeded,
            Self::PotashCap => ViolationCode::PotashLimitExceeded,
            Self::FairPrice => ViolationCode::PriceManipulation,
            Self::ExplicitDuplicate | Self::DuplicatePattern => ViolationCode::DuplicateClaims,
        }
    }

    /// Fixed severity. `FairPrice` grades its own severity from the price gap.
    pub fn severity(&self) -> Severity {
        match self {
            Self::FarmSizeEligibility
            | Self::ClaimAmountLimit
            | Self::UreaCap
            | Self::ExplicitDuplicate
            | Self::DuplicatePattern => Severity::High,
            Self::IncomeEligibility
            | Self::AnnualClaimLimit
            | Self::ReportingTimeline
            | Self::DapCap => Severity::Medium,
            Self::PotashCap | Self::FairPrice => Severity::Low,
        }
    }

    pub fn policy_name(&self) -> &'static str {
        match self {
            Self::FarmSizeEligibility => "PM-KISAN Farm Size Eligibility",
            Self::IncomeEligibility => "PM-KISAN Income Eligibility",
            Self::ClaimAmountLimit => "PM-KISAN Claim Amount Limit",
            Self::AnnualClaimLimit => "PM-KISAN Annual Claim Limit",
            Self::ReportingTimeline => "PMFBY Reporting Timeline",
            Self::UreaCap => "Fertilizer Subsidy - Urea Cap",
            Self::DapCap => "Fertilizer Subsidy - DAP Cap",
            Self::PotashCap => "Fertilizer Subsidy - Potash Cap",
            Self::FairPrice => "Market Fair-Price Monitoring",
            Self::ExplicitDuplicate => "Anti-Fraud Duplicate Detection",
            Self::DuplicatePattern => "Anti-Fraud Duplicate Pattern",
        }
    }

    pub fn justification(&self) -> &'static str {
        match self {
            Self::FarmSizeEligibility => {
                "Farmer land holding exceeds the PM-KISAN farm size threshold."
            }
            Self::IncomeEligibility => {
                "Farmer annual income exceeds the PM-KISAN eligibility cap."
            }
            Self::ClaimAmountLimit => {
                "Claim amount exceeds the PM-KISAN per-installment amount limit."
            }
            Self::AnnualClaimLimit => {
                "Number of PM-KISAN claims exceeds the annual allowable claim frequency."
            }
            Self::ReportingTimeline => {
                "Insurance claim was filed beyond the PMFBY reporting window."
            }
            Self::UreaCap => "Urea bags purchased exceed the subsidy monitoring threshold.",
            Self::DapCap => "DAP bags purchased exceed the configured threshold.",
            Self::PotashCap => "Potash bags purchased are above the configured threshold.",
            Self::FairPrice => {
                "Recorded crop sale price is below the MSP reference and needs market review."
            }
            Self::ExplicitDuplicate => {
                "Claim is explicitly linked as a duplicate of an earlier transaction."
            }
            Self::DuplicatePattern => {
                "Multiple claims with the same installment and amount were found in the same year."
            }
        }
    }
}

/// The exact values a rule compared, in the order the rule recorded them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Evidence(Vec<(String, Value)>);

impl Evidence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.0.push((key.to_string(), value.into()));
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for Evidence {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in &self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Recoverable amount attached to a violation. All zero unless the finding
/// is subsidy fraud on a subsidy claim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Penalty {
    pub principal_amount: Amount,
    pub interest_rate: f64,
    pub interest_amount: Amount,
    pub total_recoverable: Amount,
    pub rule: String,
}

impl Penalty {
    pub const NO_PENALTY_RULE: &'static str = "No monetary penalty";

    pub fn none() -> Self {
        Self {
            principal_amount: 0.0,
            interest_rate: 0.0,
            interest_amount: 0.0,
            total_recoverable: 0.0,
            rule: Self::NO_PENALTY_RULE.to_string(),
        }
    }

    pub fn is_recoverable(&self) -> bool {
        self.total_recoverable > 0.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Violation {
    pub code: ViolationCode,
    pub severity: Severity,
    pub policy_name: String,
    pub transaction_id: TransactionId,
    pub transaction_type: TransactionType,
    pub farmer_id: FarmerId,
    pub evidence: Evidence,
    pub justification: String,
    pub penalty: Penalty,
}
