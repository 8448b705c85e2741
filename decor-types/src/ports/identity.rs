//! Identity provider port.
//!
//! Token issuance and user sign-in live entirely with the external provider;
//! the service only needs "which email does this bearer token belong to".

/// Error type for identity verification.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("Token expired")]
    Expired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Token carries no email claim")]
    MissingEmail,

    #[error("Signing keys unavailable: {0}")]
    KeySet(String),
}

/// Identity extracted from a verified token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity {
    pub email: String,
    /// Provider-side subject id
    pub subject: String,
}

/// Port trait for bearer-token verification.
#[async_trait::async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, IdentityError>;
}
