use thiserror::Error;
use uuid::Uuid;

/// Errors raised while simulating the claim lifecycle.
///
/// Nothing in the core recovers from these locally; they are surfaced to the
/// caller, which is expected to stop the simulation.
#[derive(Error, Debug)]
pub enum SimulatorError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Expected to affect 1 row for claim {quote_id}, affected {rows_affected}")]
    IntegrityViolation { quote_id: Uuid, rows_affected: u64 },

    #[error("A claim with quote id {0} already exists")]
    DuplicateQuote(Uuid),

    #[error("Inserted claim {expected} but the store confirmed {returned}")]
    InsertMismatch { expected: Uuid, returned: Uuid },

    #[error("Claim status {0} is outside the lifecycle range 1..=7")]
    InvalidStatus(i32),

    #[error("Claim {quote_id} is terminal but was selected for advancement")]
    TerminalClaimSelected { quote_id: Uuid },

    #[error("Unknown claim source: {0}")]
    UnknownSource(String),

    #[error("Invalid reference data: {0}")]
    ReferenceData(String),
}

impl SimulatorError {
    /// Every simulator error stops the process; kept as a method so callers
    /// don't have to encode that policy themselves.
    pub fn is_fatal(&self) -> bool {
        match self {
            SimulatorError::Database(_)
            | SimulatorError::IntegrityViolation { .. }
            | SimulatorError::DuplicateQuote(_)
            | SimulatorError::InsertMismatch { .. }
            | SimulatorError::InvalidStatus(_)
            | SimulatorError::TerminalClaimSelected { .. }
            | SimulatorError::UnknownSource(_)
            | SimulatorError::ReferenceData(_) => true,
        }
    }
}

pub type Result<T> = std::result::Result<T, SimulatorError>;
