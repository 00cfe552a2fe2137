use thiserror::Error;

pub type Result<T> = std::result::Result<T, ValidatorError>;

#[derive(Error, Debug)]
pub enum ValidatorError {
    /// The pass was cancelled; no partial results are returned.
    #[error("Validation pass cancelled")]
    Cancelled,

    #[error("Invalid naming pattern: {0}")]
    InvalidNamingPattern(#[from] regex::Error),
}
