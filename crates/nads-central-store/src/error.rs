use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("A profile already exists for {0}")]
    UniqueViolation(String),

    #[error("Profile not found: {0}")]
    NotFound(String),

    #[error("Invalid profile update: {0}")]
    Validation(String),

    #[error("Backend returned HTTP {status}: {message}")]
    Backend { status: u16, message: String },

    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Could not decode backend response: {0}")]
    Decode(String),

    #[error("Invalid backend configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
