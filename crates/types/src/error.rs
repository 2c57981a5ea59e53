use std::collections::BTreeMap;

/// Errors raised while constructing the value types in this crate.
#[derive(Debug, thiserror::Error)]
pub enum TypeError {
    #[error("record is not a JSON object")]
    NotAnObject,
    #[error("record has no usable id field")]
    MissingId,
    #[error("collection name cannot be empty")]
    EmptyCollectionName,
    #[error("collection name contains invalid character {0:?}")]
    InvalidCollectionName(char),
    #[error("page index must be at least 1")]
    PageIndexZero,
    #[error("page holds {items} items but page size is {page_size}")]
    PageOverfull { items: usize, page_size: u32 },
    #[error("ordering key cannot be empty")]
    EmptyOrderingKey,
    #[error("unknown appointment status {0:?}")]
    UnknownStatus(String),
}

/// Failure taxonomy for backend calls.
///
/// The client classifies raw transport errors into exactly one of these
/// variants and passes them up untouched; controllers decide the
/// user-facing behaviour. No variant is ever retried automatically.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    /// No response at all (connection refused, DNS, broken pipe, ...).
    #[error("network error: {0}")]
    Network(String),
    /// HTTP 401/403. Should send the caller back through re-authentication.
    #[error("authentication required (HTTP {status})")]
    Auth { status: u16 },
    /// HTTP 404.
    #[error("resource not found")]
    NotFound,
    /// HTTP 400, with field-level messages when the backend provides them.
    #[error("validation failed: {message}")]
    Validation {
        message: String,
        field_errors: BTreeMap<String, Vec<String>>,
    },
    /// 5xx or any other non-success status.
    #[error("server error (HTTP {status}): {message}")]
    Server { status: u16, message: String },
    /// A success response whose body could not be decoded.
    #[error("malformed response: {0}")]
    Decode(String),
}

impl ApiError {
    /// True for the one case a controller may treat as already-satisfied:
    /// deleting a record that is already gone.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound)
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_carries_field_messages() {
        let mut fields = BTreeMap::new();
        fields.insert("phone".to_string(), vec!["Enter a valid phone number.".to_string()]);
        let err = ApiError::Validation {
            message: "invalid input".into(),
            field_errors: fields,
        };
        assert!(err.to_string().contains("validation failed"));
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_not_found_is_the_only_already_satisfied_case() {
        assert!(ApiError::NotFound.is_not_found());
        assert!(!ApiError::Network("refused".into()).is_not_found());
        assert!(!ApiError::Server { status: 500, message: "boom".into() }.is_not_found());
    }
}
