//! Error and result types shared by every R-tree operation.

use thiserror::Error;

/// Errors that can occur while configuring or reading an R-tree.
///
/// Tree operations themselves (insert, delete, search, nearest) are total
/// over a validated [`Context`](crate::Context); errors only surface at the
/// configuration boundary and at the external node-provider and value
/// serializer boundaries.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RTreeError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Node provider error: {0}")]
    Provider(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

impl From<bincode::error::EncodeError> for RTreeError {
    fn from(err: bincode::error::EncodeError) -> Self {
        RTreeError::Serialization(err.to_string())
    }
}

impl From<bincode::error::DecodeError> for RTreeError {
    fn from(err: bincode::error::DecodeError) -> Self {
        RTreeError::Serialization(err.to_string())
    }
}

/// Result type for R-tree operations
pub type RTreeResult<T> = Result<T, RTreeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RTreeError::InvalidConfiguration("max_children must be > 2".into());
        assert_eq!(
            err.to_string(),
            "Invalid configuration: max_children must be > 2"
        );

        let err = RTreeError::Provider("page 7 unreadable".into());
        assert_eq!(err.to_string(), "Node provider error: page 7 unreadable");
    }

    #[test]
    fn test_decode_error_maps_to_serialization() {
        let bytes: [u8; 0] = [];
        let err = bincode::serde::decode_from_slice::<u64, _>(&bytes, bincode::config::legacy())
            .map(|(value, _)| value)
            .map_err(RTreeError::from)
            .unwrap_err();
        assert!(matches!(err, RTreeError::Serialization(_)));
    }
}
