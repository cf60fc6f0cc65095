use crate::ids::RecordId;

/// Errors raised while building or querying a patient's care plan.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TrackerError {
    /// A record kind was built without the text its label or summary is derived from.
    #[error("{kind} cannot be constructed: {detail}")]
    ContractViolation { kind: &'static str, detail: String },
    /// Completion date and completion author disagree (one set, the other absent).
    #[error("record {record} has inconsistent completion fields: {detail}")]
    InvariantViolation { record: RecordId, detail: String },
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },
    #[error("storage error: {0}")]
    Storage(String),
    #[error("could not parse input: {0}")]
    Parse(String),
}

pub type TrackerResult<T> = std::result::Result<T, TrackerError>;
