use thiserror::Error;

pub type AddressResult<T> = Result<T, AddressError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("Wallet address is empty")]
    Empty,

    #[error("Wallet address contains invalid character {found:?} at position {position}")]
    InvalidCharacter { found: char, position: usize },

    #[error("Wallet address too long: {len} characters (max: {max})")]
    TooLong { len: usize, max: usize },
}
