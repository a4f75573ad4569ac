use thiserror::Error;

/// Failures resolving the acting user
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("missing bearer credentials")]
    MissingCredentials,
    #[error("invalid token: {0}")]
    InvalidToken(String),
    #[error("token error: {0}")]
    TokenError(String),
}

impl IdentityError {
    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            IdentityError::MissingCredentials => 1101,
            IdentityError::InvalidToken(_) => 1102,
            IdentityError::TokenError(_) => 1103,
        }
    }
}
