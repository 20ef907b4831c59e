//! Data model shared by the generator, the evaluator and the reporters.
//!
//! RULE: Farmers and transactions are immutable once a snapshot is built.
//! Anything derived from them (indices, verdicts, statistics) is recomputed,
//! never patched in place.

pub mod farmer;
pub mod transaction;
pub mod violation;

pub use farmer::{Crop, District, Farmer, FertilizerUsage, LandOwnership};
pub use transaction::{
    CropSaleDetails, FertilizerDetails, InsuranceDetails, Scheme, SubsidyDetails, Transaction,
    TransactionDetails, TransactionType,
};
pub use violation::{
    Evidence, OverallSeverity, Penalty, Severity, Violation, ViolationCode, ViolationRule,
};
