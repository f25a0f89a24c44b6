use nads_central_gate::AddressError;
use nads_central_store::StoreError;
use thiserror::Error;

pub type SessionResult<T> = Result<T, SessionError>;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("No wallet connected")]
    NoAccount,

    #[error("No profile loaded for the connected wallet")]
    NoProfile,

    #[error(transparent)]
    Address(#[from] AddressError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
