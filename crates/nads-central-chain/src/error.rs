use solana_client::{client_error::ClientErrorKind, rpc_request::RpcError};
use std::time::Duration;
use thiserror::Error;

pub type ReadResult<T> = Result<T, ReadError>;

/// JSON-RPC "limit exceeded", returned by rate-limited EVM providers
const EVM_LIMIT_EXCEEDED: i64 = -32005;

/// Errors that can occur while reading a membership balance
#[derive(Error, Debug)]
pub enum ReadError {
    #[error("Invalid owner address: {0}")]
    InvalidAddress(String),

    #[error("Invalid chain configuration: {0}")]
    Config(String),

    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("RPC endpoint returned HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("JSON-RPC error {code}: {message}")]
    JsonRpc { code: i64, message: String },

    #[error("Solana RPC error: {0}")]
    SolanaRpc(#[from] solana_client::client_error::ClientError),

    #[error("Could not decode balance: {0}")]
    Decode(String),

    #[error("Balance read timed out after {0:?}")]
    Timeout(Duration),

    #[error("Balance read failed after {retries} retries: {last_error}")]
    RetriesExhausted { retries: usize, last_error: String },
}

impl ReadError {
    /// Whether another attempt could succeed
    pub fn is_transient(&self) -> bool {
        match self {
            ReadError::Http(_) | ReadError::Timeout(_) => true,
            ReadError::HttpStatus { status, .. } => *status == 429 || *status >= 500,
            ReadError::JsonRpc { code, .. } => *code == EVM_LIMIT_EXCEEDED,
            ReadError::SolanaRpc(err) => !matches!(
                err.kind(),
                ClientErrorKind::RpcError(RpcError::RpcResponseError { .. })
            ),
            ReadError::InvalidAddress(_)
            | ReadError::Config(_)
            | ReadError::Decode(_)
            | ReadError::RetriesExhausted { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(ReadError::Timeout(Duration::from_secs(1)).is_transient());
        assert!(ReadError::HttpStatus {
            status: 503,
            body: String::new()
        }
        .is_transient());
        assert!(ReadError::HttpStatus {
            status: 429,
            body: String::new()
        }
        .is_transient());
        assert!(!ReadError::HttpStatus {
            status: 400,
            body: String::new()
        }
        .is_transient());
        assert!(!ReadError::JsonRpc {
            code: 3,
            message: "execution reverted".to_string()
        }
        .is_transient());
        assert!(ReadError::JsonRpc {
            code: -32005,
            message: "limit exceeded".to_string()
        }
        .is_transient());
        assert!(!ReadError::InvalidAddress("xyz".to_string()).is_transient());
    }
}
