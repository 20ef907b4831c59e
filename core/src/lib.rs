//! AgriSense compliance core.
//!
//! Audits agricultural-subsidy transactions against scheme policy and
//! produces per-transaction verdicts with evidence, severity, narrative and
//! recoverable penalty, plus dataset-wide statistics.
//!
//! Leaf-first:
//!   generator → dataset → snapshot → rule families → evaluator
//!   → penalty / explain → report → engine

pub mod config;
pub mod dataset;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod explain;
pub mod generator;
pub mod model;
pub mod name_generator;
pub mod penalty;
pub mod policy;
pub mod report;
pub mod rng;
pub mod rule_family;
pub mod snapshot;
pub mod types;

pub mod anti_fraud_family;
pub mod fertilizer_family;
pub mod insurance_family;
pub mod market_family;
pub mod subsidy_family;
