use crate::error::{ComplianceError, ComplianceResult};
use crate::model::Scheme;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PmKisanPolicy {
    pub max_farm_size_ha: f64,
    pub max_income: u64,
    pub max_claim_amount: f64,
    pub max_claims_per_year: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PmfbyPolicy {
    pub max_reporting_delay_days: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FertilizerPolicy {
    pub max_urea_bags: u32,
    pub max_dap_bags: u32,
    pub max_potash_bags: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PenaltyPolicy {
    /// Flat rate applied once to the principal; not compounded, not prorated.
    pub subsidy_fraud_interest_rate: f64,
}

/// Immutable policy thresholds. Changing policy means building a new catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleCatalog {
    pm_kisan: PmKisanPolicy,
    pmfby: PmfbyPolicy,
    fertilizer: FertilizerPolicy,
    penalty: PenaltyPolicy,
}

impl RuleCatalog {
    /// Scheme the subsidy rules apply to.
    pub const SUBSIDY_SCHEME: Scheme = Scheme::PmKisan;
    /// Scheme the insurance rules apply to.
    pub const INSURANCE_SCHEME: Scheme = Scheme::Pmfby;

    pub fn new(
        pm_kisan: PmKisanPolicy,
        pmfby: PmfbyPolicy,
        fertilizer: FertilizerPolicy,
        penalty: PenaltyPolicy,
    ) -> ComplianceResult<Self> {
        let catalog = Self {
            pm_kisan,
            pmfby,
            fertilizer,
            penalty,
        };
        catalog.validate()?;
        Ok(catalog)
    }

    /// The notified thresholds.
    pub fn standard() -> Self {
        Self {
            pm_kisan: PmKisanPolicy {
                max_farm_size_ha: 2.0,
                max_income: 500_000,
                max_claim_amount: 2_000.0,
                max_claims_per_year: 3,
            },
            pmfby: PmfbyPolicy {
                max_reporting_delay_days: 3,
            },
            fertilizer: FertilizerPolicy {
                max_urea_bags: 50,
                max_dap_bags: 30,
                max_potash_bags: 25,
            },
            penalty: PenaltyPolicy {
                subsidy_fraud_interest_rate: 0.24,
            },
        }
    }

    /// Load from `<data_dir>/policy/rule_catalog.json`.
    /// In tests, use RuleCatalog::standard().
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let path = format!("{data_dir}/policy/rule_catalog.json");
        let content = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        Self::from_json_str(&content).map_err(|e| anyhow::anyhow!("{path}: {e}"))
    }

    pub fn from_json_str(content: &str) -> ComplianceResult<Self> {
        let catalog: Self = serde_json::from_str(content)?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn pm_kisan(&self) -> &PmKisanPolicy {
        &self.pm_kisan
    }

    pub fn pmfby(&self) -> &PmfbyPolicy {
        &self.pmfby
    }

    pub fn fertilizer(&self) -> &FertilizerPolicy {
        &self.fertilizer
    }

    pub fn penalty(&self) -> &PenaltyPolicy {
        &self.penalty
    }

    fn validate(&self) -> ComplianceResult<()> {
        let invalid = |reason: &str| ComplianceError::InvalidCatalog {
            reason: reason.to_string(),
        };
        if self.pm_kisan.max_farm_size_ha <= 0.0 {
            return Err(invalid("pm_kisan.max_farm_size_ha must be positive"));
        }
        if self.pm_kisan.max_income == 0 {
            return Err(invalid("pm_kisan.max_income must be positive"));
        }
        if self.pm_kisan.max_claim_amount <= 0.0 {
            return Err(invalid("pm_kisan.max_claim_amount must be positive"));
        }
        if self.pm_kisan.max_claims_per_year == 0 {
            return Err(invalid("pm_kisan.max_claims_per_year must be positive"));
        }
        let caps = [
            ("fertilizer.max_urea_bags", self.fertilizer.max_urea_bags),
            ("fertilizer.max_dap_bags", self.fertilizer.max_dap_bags),
            ("fertilizer.max_potash_bags", self.fertilizer.max_potash_bags),
        ];
        if let Some((name, _)) = caps.iter().find(|(_, cap)| *cap == 0) {
            return Err(invalid(&format!("{name} must be positive")));
        }
        let rate = self.penalty.subsidy_fraud_interest_rate;
        if !(0.0..=1.0).contains(&rate) {
            return Err(invalid("penalty.subsidy_fraud_interest_rate must lie in [0, 1]"));
        }
        Ok(())
    }
}

impl Default for RuleCatalog {
    fn default() -> Self {
        Self::standard()
    }
}
