//! Unified error types for the catalog search core.
//!
//! Only [`Error::Persistence`] and [`Error::ArchiveNotFound`] ever reach a
//! caller through a result object; both are cached together with the result
//! that carried them.

use rmcp::model::{ErrorCode, ErrorData as McpError};
use serde::Serialize;

/// Unified error type for the catalog core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", content = "message", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Error {
    /// A directive-shaped token could not be fully parsed.
    ///
    /// The tokenizer drops such directives; this never aborts a query.
    #[error("MALFORMED_DIRECTIVE: {0}")]
    MalformedDirective(String),

    /// The persistence collaborator failed to execute a query.
    #[error("PERSISTENCE_FAILURE: {0}")]
    Persistence(String),

    /// No visible archive exists with the given id.
    #[error("ARCHIVE_NOT_FOUND: {0}")]
    ArchiveNotFound(i64),

    /// Invalid input parameters.
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// A purge or stats request named a cache instance that is not registered.
    #[error("UNKNOWN_CACHE: {0}")]
    UnknownCache(String),
}

impl From<Error> for McpError {
    fn from(err: Error) -> Self {
        let (code, message) = match &err {
            Error::InvalidInput(msg) => (-32602, msg.clone()),
            Error::MalformedDirective(msg) => (-32602, msg.clone()),
            Error::Persistence(msg) => (-32002, msg.clone()),
            Error::ArchiveNotFound(id) => (-32001, format!("archive {id} does not exist")),
            Error::UnknownCache(name) => (-32003, format!("unknown cache: {name}")),
        };

        McpError { code: ErrorCode(code), message: message.into(), data: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Persistence("connection reset".to_string());
        assert!(err.to_string().contains("PERSISTENCE_FAILURE"));
        assert!(err.to_string().contains("connection reset"));
    }

    #[test]
    fn test_error_to_mcp_error() {
        let mcp_err: McpError = Error::ArchiveNotFound(42).into();
        assert_eq!(mcp_err.code.0, -32001);
        assert!(mcp_err.message.contains("42"));

        let mcp_err: McpError = Error::UnknownCache("thumbnails".into()).into();
        assert_eq!(mcp_err.code.0, -32003);
    }

    #[test]
    fn test_error_serializes_with_kind() {
        let json = serde_json::to_value(Error::Persistence("boom".into())).unwrap();
        assert_eq!(json["kind"], "PERSISTENCE");
        assert_eq!(json["message"], "boom");
    }
}
