//! In-memory auth provider.
//!
//! Implements the `AuthProvider` port without an identity provider. Codes
//! are registered up front; in development mode any six-digit code signs
//! the user in under a local principal name.
//!
//! # Example
//!
//! ```ignore
//! let auth = InMemoryAuthProvider::new()
//!     .with_code("123456", "sam@contoso.com", Some("Sam"));
//!
//! let sign_in = auth.redeem(&user_id, "123456").await?;
//! assert!(sign_in.is_some());
//! ```

use std::collections::{HashMap, HashSet};
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;

use crate::domain::foundation::UserId;
use crate::ports::{AuthError, AuthProvider, SignIn, SignInProfile};

#[derive(Debug, Default)]
pub struct InMemoryAuthProvider {
    /// Single-use codes and who they sign in.
    codes: RwLock<HashMap<String, SignInProfile>>,
    /// Accept any six-digit code.
    accept_any_code: bool,
    /// Users with a live token.
    signed_in: RwLock<HashSet<String>>,
    /// Optional error to return for all calls (for error testing).
    force_error: RwLock<Option<AuthError>>,
}

impl InMemoryAuthProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Development mode: any six-digit code is accepted.
    pub fn accepting_any_code() -> Self {
        Self {
            accept_any_code: true,
            ..Self::default()
        }
    }

    /// Registers a code that signs in `upn`.
    pub fn with_code(self, code: &str, upn: &str, given_name: Option<&str>) -> Self {
        self.codes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                code.to_string(),
                SignInProfile {
                    upn: upn.to_string(),
                    given_name: given_name.map(str::to_string),
                },
            );
        self
    }

    /// Forces all calls to return the specified error.
    pub fn with_error(self, error: AuthError) -> Self {
        *self.force_error.write().unwrap_or_else(PoisonError::into_inner) = Some(error);
        self
    }

    pub fn is_signed_in(&self, user_id: &UserId) -> bool {
        self.signed_in
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(user_id.as_str())
    }

    fn check_error(&self) -> Result<(), AuthError> {
        match self
            .force_error
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
        {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn is_magic_code(code: &str) -> bool {
        code.len() == 6 && code.chars().all(|c| c.is_ascii_digit())
    }
}

#[async_trait]
impl AuthProvider for InMemoryAuthProvider {
    async fn redeem(&self, user_id: &UserId, code: &str) -> Result<Option<SignIn>, AuthError> {
        self.check_error()?;
        let code = code.trim();

        let registered = self
            .codes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(code);
        let profile = match registered {
            Some(profile) => profile,
            None if self.accept_any_code && Self::is_magic_code(code) => SignInProfile {
                upn: format!("{}@local", user_id),
                given_name: None,
            },
            None => return Ok(None),
        };

        self.signed_in
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(user_id.as_str().to_string());

        Ok(Some(SignIn {
            token: format!("token-{}-{}", user_id, uuid::Uuid::new_v4()),
            expires_at: None,
            profile,
        }))
    }

    async fn revoke(&self, user_id: &UserId) -> Result<(), AuthError> {
        self.check_error()?;
        self.signed_in
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(user_id.as_str());
        Ok(())
    }
}
