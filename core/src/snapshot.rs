//! Dataset snapshot: a dataset plus its derived lookup indices.
//!
//! A snapshot is built once and never mutated. Refreshing the engine means
//! building a new snapshot and swapping the handle, so readers holding the
//! old one keep a consistent view.

use crate::{
    dataset::Dataset,
    model::{Farmer, Transaction},
    rule_family::EvaluationContext,
    types::{FarmerId, TransactionId, YearPartition},
};
use std::collections::HashMap;

pub struct DatasetSnapshot {
    dataset: Dataset,
    farmer_by_id: HashMap<FarmerId, usize>,
    transaction_by_id: HashMap<TransactionId, usize>,
    /// (farmer, year) → positions in `dataset.transactions()`, in dataset order.
    partitions: HashMap<(FarmerId, YearPartition), Vec<usize>>,
}

impl DatasetSnapshot {
    pub fn build(dataset: Dataset) -> Self {
        let farmer_by_id = dataset
            .farmers()
            .iter()
            .enumerate()
            .map(|(i, f)| (f.farmer_id.clone(), i))
            .collect();

        let mut transaction_by_id = HashMap::with_capacity(dataset.transactions().len());
        let mut partitions: HashMap<(FarmerId, YearPartition), Vec<usize>> = HashMap::new();
        for (i, tx) in dataset.transactions().iter().enumerate() {
            // First occurrence wins on id collisions in external feeds.
            transaction_by_id.entry(tx.transaction_id.clone()).or_insert(i);
            partitions
                .entry((tx.farmer_id.clone(), tx.year()))
                .or_default()
                .push(i);
        }

        log::debug!(
            "Indexed snapshot: {} farmers, {} transactions, {} farmer-year partitions",
            dataset.farmers().len(),
            dataset.transactions().len(),
            partitions.len()
        );

        Self {
            dataset,
            farmer_by_id,
            transaction_by_id,
            partitions,
        }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn farmers(&self) -> &[Farmer] {
        self.dataset.farmers()
    }

    pub fn transactions(&self) -> &[Transaction] {
        self.dataset.transactions()
    }

    pub fn farmer(&self, farmer_id: &str) -> Option<&Farmer> {
        self.farmer_by_id
            .get(farmer_id)
            .and_then(|&i| self.dataset.farmers().get(i))
    }

    pub fn transaction(&self, transaction_id: &str) -> Option<&Transaction> {
        self.transaction_by_id
            .get(transaction_id)
            .and_then(|&i| self.dataset.transactions().get(i))
    }

    pub fn transactions_for_farmer(&self, farmer_id: &str) -> Vec<&Transaction> {
        self.dataset
            .transactions()
            .iter()
            .filter(|t| t.farmer_id == farmer_id)
            .collect()
    }
}

impl EvaluationContext for DatasetSnapshot {
    fn farmer(&self, farmer_id: &str) -> Option<&Farmer> {
        DatasetSnapshot::farmer(self, farmer_id)
    }

    fn transactions_in_year(&self, farmer_id: &str, year: YearPartition) -> Vec<&Transaction> {
        self.partitions
            .get(&(farmer_id.to_string(), year))
            .map(|positions| {
                positions
                    .iter()
                    .filter_map(|&i| self.dataset.transactions().get(i))
                    .collect()
            })
            .unwrap_or_default()
    }
}
