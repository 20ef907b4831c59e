//! Policy library: the scheme documents violations are traced back to.
//!
//! Each document carries its full text, numbered sections and the rules
//! declared in the text. Rule lines follow the convention:
//!
//! ```text
//! RULE:<rule_id>|<severity>|<title>|<condition>
//! ```
//!
//! RULE: Rules are always extracted from the document text, never declared
//! separately, so text and rule list cannot disagree.

use crate::{
    error::{ComplianceError, ComplianceResult},
    model::ViolationCode,
};
use serde::Serialize;

pub const DEFAULT_POLICY_ID: &str = "pm-kisan";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PolicySection {
    pub number: u32,
    pub page: u32,
    pub heading: String,
    pub rule_ids: Vec<String>,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PolicyRule {
    pub rule_id: String,
    /// Lowercased as written; not restricted to the violation severities.
    pub severity: String,
    pub title: String,
    pub condition: String,
    pub section_number: Option<u32>,
    pub page: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PolicyDocument {
    pub policy_id: String,
    pub title: String,
    pub text: String,
    pub sections: Vec<PolicySection>,
    pub rules: Vec<PolicyRule>,
}

impl PolicyDocument {
    fn new(policy_id: &str, title: &str, lines: &[&str], sections: Vec<PolicySection>) -> Self {
        let text = lines.join("\n");
        let rules = extract_rules(&text)
            .into_iter()
            .map(|mut rule| {
                let section = sections.iter().find(|s| s.rule_ids.contains(&rule.rule_id));
                rule.section_number = section.map(|s| s.number);
                rule.page = section.map_or(1, |s| s.page);
                rule
            })
            .collect();
        Self {
            policy_id: policy_id.to_string(),
            title: title.to_string(),
            text,
            sections,
            rules,
        }
    }

    pub fn section(&self, number: u32) -> Option<&PolicySection> {
        self.sections.iter().find(|s| s.number == number)
    }

    pub fn rule(&self, rule_id: &str) -> Option<&PolicyRule> {
        let rule_id = rule_id.trim();
        self.rules.iter().find(|r| r.rule_id == rule_id)
    }

    pub fn page_count(&self) -> u32 {
        self.sections.iter().map(|s| s.page).max().unwrap_or(1)
    }
}

/// Where a rule sits inside its policy document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleHighlight {
    pub found: bool,
    pub policy_id: String,
    pub rule: Option<PolicyRule>,
    pub highlighted_section: Option<PolicySection>,
}

/// Parse every `RULE:` line in `text`. Lines with fewer than four
/// `|`-separated parts are skipped; extra parts belong to the condition.
pub fn extract_rules(text: &str) -> Vec<PolicyRule> {
    text.lines()
        .filter_map(|line| line.trim().strip_prefix("RULE:"))
        .filter_map(|payload| {
            let parts: Vec<&str> = payload.split('|').collect();
            if parts.len() < 4 {
                return None;
            }
            Some(PolicyRule {
                rule_id: parts[0].trim().to_string(),
                severity: parts[1].trim().to_lowercase(),
                title: parts[2].trim().to_string(),
                condition: parts[3..].join("|").trim().to_string(),
                section_number: None,
                page: 1,
            })
        })
        .collect()
}

/// Canonical form of a user-supplied policy id.
pub fn normalize_policy_id(policy_id: &str) -> String {
    let id = policy_id.trim().to_lowercase();
    match id.as_str() {
        "" => DEFAULT_POLICY_ID.to_string(),
        "pmkisan" => DEFAULT_POLICY_ID.to_string(),
        _ => id,
    }
}

pub struct PolicyLibrary {
    documents: Vec<PolicyDocument>,
}

impl PolicyLibrary {
    pub fn standard() -> Self {
        Self {
            documents: vec![pm_kisan(), pmfby(), fertilizer()],
        }
    }

    pub fn documents(&self) -> &[PolicyDocument] {
        &self.documents
    }

    pub fn load_policy(&self, policy_id: &str) -> ComplianceResult<&PolicyDocument> {
        let id = normalize_policy_id(policy_id);
        self.documents
            .iter()
            .find(|d| d.policy_id == id)
            .ok_or_else(|| ComplianceError::PolicyNotFound {
                policy_id: policy_id.to_string(),
            })
    }

    pub fn highlight_violation(&self, policy_id: &str, rule_id: &str) -> ComplianceResult<RuleHighlight> {
        let document = self.load_policy(policy_id)?;
        let rule = document.rule(rule_id).cloned();
        let highlighted_section = rule
            .as_ref()
            .and_then(|r| r.section_number)
            .and_then(|n| document.section(n))
            .cloned();
        Ok(RuleHighlight {
            found: rule.is_some(),
            policy_id: document.policy_id.clone(),
            rule,
            highlighted_section,
        })
    }

    /// The document rule a violation code breaches, if one is published.
    pub fn rule_for_code(&self, code: ViolationCode) -> Option<&PolicyRule> {
        let policy_id = code.policy_id()?;
        let rule_id = code.policy_rule_id()?;
        self.load_policy(policy_id).ok()?.rule(rule_id)
    }
}

impl Default for PolicyLibrary {
    fn default() -> Self {
        Self::standard()
    }
}

// ── Documents ────────────────────────────────────────────────────────────────

fn section(number: u32, heading: &str, rule_ids: &[&str], text: &str) -> PolicySection {
    PolicySection {
        number,
        page: number,
        heading: heading.to_string(),
        rule_ids: rule_ids.iter().map(|id| id.to_string()).collect(),
        text: text.to_string(),
    }
}

fn pm_kisan() -> PolicyDocument {
    PolicyDocument::new(
        "pm-kisan",
        "PM-KISAN Guidelines",
        &[
            "PM-KISAN Guidelines",
            "Section 1: Eligibility",
            "RULE:PMK-001|high|Land Size Eligibility|Farm size must be within notified beneficiary threshold.",
            "RULE:PMK-002|medium|Income Eligibility|Annual income must be below prescribed cap for eligibility.",
            "Section 2: Claim Limits",
            "RULE:PMK-003|high|Installment Limit|Each claim amount must not exceed notified installment amount.",
            "RULE:PMK-004|medium|Annual Claim Frequency|Claims per year should not exceed allowed installments.",
            "Section 3: Fraud and Recovery",
            "RULE:PMK-005|high|Duplicate Claim Prohibition|Duplicate claims are treated as subsidy fraud and recoverable.",
        ],
        vec![
            section(
                1,
                "Eligibility",
                &["PMK-001", "PMK-002"],
                "Beneficiary farmer must satisfy land and income eligibility conditions as notified by competent authority.",
            ),
            section(
                2,
                "Claim Limits",
                &["PMK-003", "PMK-004"],
                "Claims under PM-KISAN are limited by installment amount and maximum claim frequency in one financial year.",
            ),
            section(
                3,
                "Fraud and Recovery",
                &["PMK-005"],
                "Duplicate or fraudulent subsidy claims are recoverable with applicable penal interest.",
            ),
        ],
    )
}

fn pmfby() -> PolicyDocument {
    PolicyDocument::new(
        "pmfby",
        "PMFBY Insurance Rules",
        &[
            "PMFBY Insurance Rules",
            "Section 1: Intimation Timeline",
            "RULE:PMF-001|medium|Timely Reporting|Insurance claims must be reported within 3 days of event.",
            "Section 2: Documentation",
            "RULE:PMF-002|low|Mandatory Evidence|Claims should contain verifiable date, crop, and location evidence.",
            "Section 3: Escalation",
            "RULE:PMF-003|medium|Delayed Escalation|Delayed claims must be escalated for manual compliance review.",
        ],
        vec![
            section(
                1,
                "Intimation Timeline",
                &["PMF-001"],
                "Loss intimation must be filed within prescribed timeline from date of crop loss event.",
            ),
            section(
                2,
                "Documentation",
                &["PMF-002"],
                "Supporting evidence must include event details, crop, location, and date with traceable records.",
            ),
            section(
                3,
                "Review and Escalation",
                &["PMF-003"],
                "Delayed or inconsistent claims may be flagged for additional verification and audit review.",
            ),
        ],
    )
}

fn fertilizer() -> PolicyDocument {
    PolicyDocument::new(
        "fertilizer",
        "Fertilizer Subsidy Policy",
        &[
            "Fertilizer Subsidy Policy",
            "Section 1: Purchase Limits",
            "RULE:FER-001|high|Urea Threshold|Urea purchase should not exceed the policy threshold.",
            "RULE:FER-002|medium|DAP Threshold|DAP purchase should remain under district and crop norm.",
            "RULE:FER-003|low|Potash Threshold|Potash purchase beyond norm should be flagged.",
            "Section 2: Distribution Controls",
            "RULE:FER-004|medium|High Volume Monitoring|Unusual fertilizer volumes require verification.",
            "Section 3: Compliance Action",
            "RULE:FER-005|medium|Repeat Breach Action|Repeated excess purchases may trigger notices.",
        ],
        vec![
            section(
                1,
                "Purchase Limits",
                &["FER-001", "FER-002", "FER-003"],
                "Nutrient purchase quantity must be proportionate to landholding and seasonal recommendations.",
            ),
            section(
                2,
                "Distribution Controls",
                &["FER-004"],
                "Transactions crossing threshold should be reviewed for diversion, stock hoarding, and misuse.",
            ),
            section(
                3,
                "Compliance Action",
                &["FER-005"],
                "Repeated threshold breaches can trigger subsidy hold and compliance notice generation.",
            ),
        ],
    )
}
