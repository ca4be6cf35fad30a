use thiserror::Error;

/// Failures raised by the hex automaton engine.
/// None of these are retried internally; stepping and loading are all-or-nothing.
#[derive(Debug, Error)]
pub enum HexError {
    #[error("offset ({dx}, {dy}) is not one of the six hex directions")]
    UnknownOffset { dx: i32, dy: i32 },

    #[error("{kind} cannot produce a successor: {reason}")]
    RuleViolation { kind: String, reason: String },

    #[error("cell type {name:?} is not registered")]
    UnknownType { name: String },

    #[error("{kind} record has an invalid {field:?} field: {reason}")]
    MalformedRecord {
        kind: String,
        field: String,
        reason: String,
    },

    #[error("{key:?} is not an \"x,y\" coordinate key")]
    MalformedKey { key: String },

    #[error("snapshot json error: {0}")]
    Json(#[from] serde_json::Error),
}
