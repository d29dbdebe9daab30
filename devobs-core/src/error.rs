/// Top-level devobs error type.
///
/// All fallible operations in `devobs-core` return [`Result<T, DevObsError>`](Result).
/// Each variant wraps a domain-specific error, so callers can match on the
/// source (transport, validation, config) without string inspection.
#[derive(thiserror::Error, Debug)]
pub enum DevObsError {
    /// Error talking to the dev-observer backend.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Client-side validation rejected the input before any network call.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Error in configuration parsing or validation.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A store action completed at the transport level but the backend
    /// refused it.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Errors from the typed API client.
#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    /// Transport-level failure (connect, TLS, timeout, body read).
    #[error("Network error: {0}")]
    Network(String),

    /// The backend answered with a non-success HTTP status.
    #[error("HTTP {status}: {status_text}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Canonical reason phrase for the status.
        status_text: String,
    },

    /// Response body was not valid JSON for the expected message.
    #[error("Response parse error: {0}")]
    Parse(String),

    /// A bearer token was required but could not be obtained.
    #[error("Authorization error: {0}")]
    Auth(String),
}

/// A structured field + message validation failure.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[error("{message}")]
pub struct ValidationError {
    /// Name of the offending input field.
    pub field: String,
    /// Human-readable explanation.
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Errors in devobs configuration loading.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// The configuration file does not exist at the expected path.
    #[error("Config file not found: {0}")]
    NotFound(String),

    /// Configuration values are present but semantically invalid.
    #[error("Invalid config: {0}")]
    Invalid(String),

    /// Configuration file syntax could not be parsed (TOML error).
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Errors raised by store actions after a successful round-trip.
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    /// The backend reported `success = false` for an action.
    #[error("{action} rejected: {message}")]
    Rejected {
        /// Action name (e.g. `enroll`).
        action: &'static str,
        /// Message returned by the backend.
        message: String,
    },

    /// The operation is not offered by the configured endpoint family.
    #[error("Unsupported operation: {0}")]
    Unsupported(String),
}

/// Convenience alias for `Result<T, DevObsError>`.
pub type Result<T> = std::result::Result<T, DevObsError>;
