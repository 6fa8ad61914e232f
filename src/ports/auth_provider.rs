//! Auth provider port for the sign-in handshake.
//!
//! The login dialog sends the user a sign-in card; the identity provider
//! hands the user a short code, which they paste back. This port redeems
//! that code for a token and the profile claims the engine cares about.
//!
//! # Contract
//!
//! Implementations must:
//! - Return `Ok(None)` for a code that is unknown, expired or already used
//! - Return `AuthError::ServiceUnavailable` for transient errors
//! - Treat `revoke` of a user without a token as a no-op

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::foundation::UserId;

/// Claims read from the identity provider's profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignInProfile {
    /// User principal name, e.g. `sam@contoso.com`.
    pub upn: String,
    pub given_name: Option<String>,
}

/// Result of a successful code redemption.
#[derive(Clone, PartialEq, Eq)]
pub struct SignIn {
    pub token: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub profile: SignInProfile,
}

impl std::fmt::Debug for SignIn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignIn")
            .field("token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .field("profile", &self.profile)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("auth service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("auth provider rejected the request: {0}")]
    Rejected(String),
}

/// Redeems sign-in codes and revokes tokens.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Exchange a magic code for a token.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(SignIn))` - Code accepted
    /// * `Ok(None)` - Code not recognized
    /// * `Err(AuthError::ServiceUnavailable)` - Provider unreachable
    async fn redeem(&self, user_id: &UserId, code: &str) -> Result<Option<SignIn>, AuthError>;

    /// Sign the user out at the provider.
    async fn revoke(&self, user_id: &UserId) -> Result<(), AuthError>;
}
