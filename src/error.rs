use thiserror::Error;

/// Domain-specific errors for the timetabling core.
#[derive(Error, Debug)]
pub enum SchedulerError {
    // Input / parse errors
    #[error("Failed to read file '{path}': {source}")]
    FileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse JSON in '{file}': {message}")]
    JsonParse { file: String, message: String },

    #[error("Duplicate ID found: {id_type} '{id}'")]
    DuplicateId { id_type: String, id: String },

    // Expansion / configuration errors
    #[error("Configuration invalid: {message}")]
    ConfigurationInvalid { message: String },

    #[error("No feasible placement for block '{block}': {reason}")]
    InfeasiblePlacement { block: String, reason: String },

    #[error("Slot lock cannot be matched to any placement option: {lock}")]
    LockNotRepresentable { lock: String },

    // Driver / publish errors
    #[error("Best candidate still has {hard_conflicts} hard conflict(s)")]
    ConflictedBestCandidate { hard_conflicts: u64 },

    #[error("Schedule violates hard rule '{rule}': {message}")]
    VerifierRejected { rule: String, message: String },

    #[error("Conflict could not be resolved automatically: {message}")]
    ResolverFailed { message: String },

    #[error("Solver run was cancelled before completion")]
    Cancelled,
}

/// Use anyhow::Result at application boundaries, matching the rest of the crate.
pub type Result<T> = anyhow::Result<T>;
