use thiserror::Error;

/// Authentication failure as seen by callers.
///
/// `InvalidCredentials` and `Unauthorized` are deliberately uninformative:
/// they never say whether the username exists or which token check failed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Login payload failed validation before any lookup.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Password did not match the stored hash.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Missing, malformed, tampered or expired session token.
    #[error("unauthorized")]
    Unauthorized,

    /// Hashing, signing or storage failed; detail is for logs only.
    #[error("authentication backend failure: {0}")]
    Internal(String),
}
