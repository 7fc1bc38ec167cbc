use thiserror::Error;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field,
            reason: reason.into(),
        }
    }
}

/// Errors raised while constructing domain values.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("client id must not be empty")]
    EmptyClientId,

    #[error("client {client}: {field} must be finite and non-negative, got {value}")]
    NegativeField {
        client: String,
        field: &'static str,
        value: f64,
    },

    #[error("client {client}: willingness to pay must be non-negative")]
    NegativeWillingness { client: String },

    #[error("unknown tier: {0}")]
    UnknownTier(String),
}

/// Errors from the optimization backend itself (not infeasibility).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SolverError {
    #[error("problem is malformed: {0}")]
    Malformed(String),

    #[error("backend failure: {0}")]
    Backend(String),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Solver(#[from] SolverError),

    #[error("workload error: {0}")]
    Workload(String),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
