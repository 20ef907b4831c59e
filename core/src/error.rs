use thiserror::Error;

#[derive(Error, Debug)]
pub enum ComplianceError {
    #[error("Invalid transaction: {reason}")]
    InvalidTransaction { reason: String },

    /// The synthetic dataset drifted from its fixed shape. Fatal: callers must
    /// not continue with the snapshot that produced it.
    #[error(
        "Dataset invariant violated: expected {expected_farmers} farmers / \
         {expected_transactions} transactions / {expected_violations} violations, \
         got {actual_farmers} / {actual_transactions} / {actual_violations}"
    )]
    DatasetInvariant {
        expected_farmers: usize,
        expected_transactions: usize,
        expected_violations: usize,
        actual_farmers: usize,
        actual_transactions: usize,
        actual_violations: usize,
    },

    #[error("Transaction '{transaction_id}' references unknown farmer '{farmer_id}'")]
    UnknownFarmer {
        transaction_id: String,
        farmer_id: String,
    },

    #[error("Duplicate {kind} id '{id}'")]
    DuplicateId { kind: &'static str, id: String },

    #[error("Policy '{policy_id}' not found")]
    PolicyNotFound { policy_id: String },

    #[error("Invalid rule catalog: {reason}")]
    InvalidCatalog { reason: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ComplianceError {
    pub fn invalid_transaction(reason: impl Into<String>) -> Self {
        Self::InvalidTransaction {
            reason: reason.into(),
        }
    }
}

pub type ComplianceResult<T> = Result<T, ComplianceError>;
