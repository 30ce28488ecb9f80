//! Error types for SCGraph domain records

use thiserror::Error;

/// Result type alias for domain-level operations
pub type Result<T> = std::result::Result<T, GraphError>;

/// Errors raised while building domain records from external data
#[derive(Error, Debug)]
pub enum GraphError {
    /// A raw follower record is missing a required field or carries an unusable value
    #[error("Malformed record: field '{field}' {reason}")]
    MalformedRecord { field: String, reason: String },

    #[error("Invalid account id: {0}")]
    InvalidAccountId(String),
}

impl GraphError {
    /// Create a malformed record error for a missing field
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MalformedRecord {
            field: field.into(),
            reason: "is missing".to_string(),
        }
    }

    /// Create a malformed record error for a field with the wrong shape
    pub fn invalid_field(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedRecord {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_record_message() {
        let err = GraphError::missing_field("followers_count");
        assert_eq!(err.to_string(), "Malformed record: field 'followers_count' is missing");

        let err = GraphError::invalid_field("id", "must be an integer");
        assert_eq!(err.to_string(), "Malformed record: field 'id' must be an integer");
    }
}
