//! The farmer and transaction universe an engine evaluates.
//!
//! A `Dataset` is immutable once built. It either comes from the synthetic
//! generator (which enforces the fixed 50/200/60 shape) or from an external
//! JSON feed (which only enforces referential integrity).

use crate::{
    error::{ComplianceError, ComplianceResult},
    generator::DatasetGenerator,
    model::{District, Farmer, Transaction, TransactionType, ViolationCode},
    types::to_percent,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

pub const DATASET_LABEL: &str = "AgriSense Compliance Agent";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    farmers: Vec<Farmer>,
    transactions: Vec<Transaction>,
}

/// Shape of an external feed file.
#[derive(Deserialize)]
struct DatasetFeed {
    #[serde(default)]
    farmers: Vec<Farmer>,
    #[serde(default)]
    transactions: Vec<Transaction>,
}

/// Violation share according to the generation-time tags.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaggedComplianceRate {
    pub total_transactions: usize,
    pub compliant_transactions: usize,
    pub violation_transactions: usize,
    pub compliance_rate_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetMeta {
    pub farmers_count: usize,
    pub transactions_count: usize,
    pub violation_count: usize,
    pub violation_percent: f64,
    pub generated_for: String,
    pub regions: Vec<District>,
}

impl Dataset {
    /// Build from parts. Farmer and transaction ids must be unique and every
    /// transaction must resolve to a farmer.
    pub fn new(farmers: Vec<Farmer>, transactions: Vec<Transaction>) -> ComplianceResult<Self> {
        let mut known = HashSet::with_capacity(farmers.len());
        for farmer in &farmers {
            if !known.insert(farmer.farmer_id.as_str()) {
                return Err(ComplianceError::DuplicateId {
                    kind: "farmer",
                    id: farmer.farmer_id.clone(),
                });
            }
        }
        let mut seen = HashSet::with_capacity(transactions.len());
        for tx in &transactions {
            tx.validate()?;
            if !seen.insert(tx.transaction_id.as_str()) {
                return Err(ComplianceError::DuplicateId {
                    kind: "transaction",
                    id: tx.transaction_id.clone(),
                });
            }
            if !known.contains(tx.farmer_id.as_str()) {
                return Err(ComplianceError::UnknownFarmer {
                    transaction_id: tx.transaction_id.clone(),
                    farmer_id: tx.farmer_id.clone(),
                });
            }
        }
        Ok(Self {
            farmers,
            transactions,
        })
    }

    /// The synthetic dataset with the default seed.
    pub fn generate() -> ComplianceResult<Self> {
        DatasetGenerator::default().generate()
    }

    pub fn from_json_str(content: &str) -> ComplianceResult<Self> {
        let feed: DatasetFeed = serde_json::from_str(content)?;
        Self::new(feed.farmers, feed.transactions)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> ComplianceResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn farmers(&self) -> &[Farmer] {
        &self.farmers
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn farmers_by_district(&self, district: District) -> Vec<&Farmer> {
        self.farmers.iter().filter(|f| f.district == district).collect()
    }

    pub fn transactions_by_type(&self, transaction_type: TransactionType) -> Vec<&Transaction> {
        self.transactions
            .iter()
            .filter(|t| t.transaction_type() == transaction_type)
            .collect()
    }

    pub fn tagged_violations(&self) -> Vec<&Transaction> {
        self.transactions.iter().filter(|t| t.is_violation).collect()
    }

    pub fn tagged_violations_by_code(&self, code: ViolationCode) -> Vec<&Transaction> {
        self.transactions
            .iter()
            .filter(|t| t.violation_code == Some(code))
            .collect()
    }

    pub fn tagged_compliance_rate(&self) -> TaggedComplianceRate {
        let violations = self.tagged_violations().len();
        let compliant = self.transactions.len() - violations;
        TaggedComplianceRate {
            total_transactions: self.transactions.len(),
            compliant_transactions: compliant,
            violation_transactions: violations,
            compliance_rate_percent: to_percent(compliant as f64, self.transactions.len() as f64),
        }
    }

    /// Case-insensitive substring match over id, name, district and crop.
    /// A blank query returns every farmer.
    pub fn search_farmers(&self, query: &str) -> Vec<&Farmer> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return self.farmers.iter().collect();
        }
        self.farmers
            .iter()
            .filter(|f| {
                [
                    f.farmer_id.as_str(),
                    f.name.as_str(),
                    f.district.as_str(),
                    f.primary_crop.as_str(),
                ]
                .iter()
                .any(|field| field.to_lowercase().contains(&needle))
            })
            .collect()
    }

    pub fn dataset_meta(&self) -> DatasetMeta {
        let violation_count = self.tagged_violations().len();
        DatasetMeta {
            farmers_count: self.farmers.len(),
            transactions_count: self.transactions.len(),
            violation_count,
            violation_percent: to_percent(violation_count as f64, self.transactions.len() as f64),
            generated_for: DATASET_LABEL.to_string(),
            regions: District::ALL.to_vec(),
        }
    }
}
