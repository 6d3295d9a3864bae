//! Unified error types for mcp-secframe.
//!
//! Validation errors (size, compression ratio, secret) always reach the caller.
//! Remote and persistence failures are absorbed by the discovery layer and only
//! surface here when a caller asks for something with no fallback, such as a
//! document body.

use rmcp::model::{ErrorCode, ErrorData as McpError};

use crate::config::ConfigError;

/// Unified error types for the mcp-secframe server.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Missing or invalid configuration (including the cache secret).
    #[error("CONFIG_ERROR: {0}")]
    Config(#[from] ConfigError),

    /// Serialized value exceeds the cache object ceiling.
    #[error("OBJECT_TOO_LARGE: {size} bytes exceeds {max}")]
    ObjectTooLarge { size: usize, max: usize },

    /// Value compresses suspiciously well and was refused.
    #[error("COMPRESSION_RATIO_EXCEEDED: ratio {ratio:.1} exceeds {max}")]
    CompressionRatio { ratio: f64, max: usize },

    /// Value could not be serialized or deserialized.
    #[error("SERIALIZATION_ERROR: {0}")]
    Serialization(String),

    /// Stored bytes could not be decompressed.
    #[error("DECOMPRESSION_FAILED: {0}")]
    Decompression(String),

    /// Remote catalog or body request failed.
    #[error("REMOTE_FETCH_FAILED: {0}")]
    RemoteFetch(String),

    /// Remote request timed out.
    #[error("FETCH_TIMEOUT: {0}")]
    FetchTimeout(String),

    /// Remote response too large.
    #[error("FETCH_TOO_LARGE: {0}")]
    FetchTooLarge(String),

    /// Non-success HTTP status.
    #[error("HTTP_ERROR: {0}")]
    HttpError(String),

    /// Snapshot file could not be written.
    #[error("PERSISTENCE_ERROR: {0}")]
    Persistence(String),

    /// Invalid input parameters.
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// No catalog entry matches the requested identity.
    #[error("NOT_FOUND: {0}")]
    NotFound(String),
}

impl Error {
    /// Whether this error came from a remote collaborator rather than local misuse.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            Error::RemoteFetch(_) | Error::FetchTimeout(_) | Error::FetchTooLarge(_) | Error::HttpError(_)
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<Error> for McpError {
    fn from(err: Error) -> Self {
        let code = match &err {
            Error::InvalidInput(_) => -32602,
            Error::NotFound(_) => -32001,
            Error::Config(_) => -32002,
            Error::ObjectTooLarge { .. } => -32003,
            Error::CompressionRatio { .. } => -32004,
            Error::Serialization(_) | Error::Decompression(_) => -32005,
            Error::RemoteFetch(_) => -32006,
            Error::FetchTimeout(_) => -32007,
            Error::FetchTooLarge(_) => -32008,
            Error::HttpError(_) => -32009,
            Error::Persistence(_) => -32010,
        };

        McpError { code: ErrorCode(code), message: err.to_string().into(), data: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::ObjectTooLarge { size: 11, max: 10 };
        assert!(err.to_string().contains("OBJECT_TOO_LARGE"));
        assert!(err.to_string().contains("11"));
    }

    #[test]
    fn test_config_error_wraps() {
        let err: Error = ConfigError::Missing { field: "cache_secret".into(), hint: "set it".into() }.into();
        assert!(err.to_string().starts_with("CONFIG_ERROR"));
    }

    #[test]
    fn test_error_to_mcp_error() {
        let err = Error::NotFound("mitigations/mi-99".to_string());
        let mcp_err: McpError = err.into();
        assert_eq!(mcp_err.code.0, -32001);

        let mcp_err: McpError = Error::InvalidInput("bad".into()).into();
        assert_eq!(mcp_err.code.0, -32602);
    }

    #[test]
    fn test_is_remote() {
        assert!(Error::FetchTimeout("slow".into()).is_remote());
        assert!(Error::HttpError("status 502".into()).is_remote());
        assert!(!Error::Persistence("disk".into()).is_remote());
    }
}
