/// Errors surfaced before any tree work starts. Once a fragment is parsed,
/// sanitizing it cannot fail.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid policy: {0}")]
    InvalidPolicy(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Error::InvalidInput(_))
    }

    pub fn is_invalid_policy(&self) -> bool {
        matches!(self, Error::InvalidPolicy(_))
    }
}
