use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DevModelError {
    #[error("Invalid input: {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Could not parse '{input}' as a number for {field}")]
    ParseError { field: String, input: String },

    #[error("Unknown parameter: {0}")]
    UnknownField(String),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl DevModelError {
    /// True for the errors a UI should surface as a rejected edit.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            DevModelError::InvalidInput { .. }
                | DevModelError::ParseError { .. }
                | DevModelError::UnknownField(_)
        )
    }
}

impl From<serde_json::Error> for DevModelError {
    fn from(e: serde_json::Error) -> Self {
        DevModelError::SerializationError(e.to_string())
    }
}
