use nads_central_chain::ReadError;
use nads_central_gate::AddressError;
use nads_central_sdk::SessionError;
use nads_central_store::StoreError;
use thiserror::Error;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid wallet address: {0}")]
    Address(#[from] AddressError),

    #[error("Chain read failed: {0}")]
    Chain(#[from] ReadError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Balance could not be read: {0}")]
    BalanceUnavailable(String),
}
