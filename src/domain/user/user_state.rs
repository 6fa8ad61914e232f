//! User-scoped state, shared by every conversation of the same user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::onboarding::OnboardingRecord;

/// Opaque credential obtained at sign-in.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthToken {
    token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    expires_at: Option<DateTime<Utc>>,
}

impl AuthToken {
    pub fn new(token: impl Into<String>, expires_at: Option<DateTime<Utc>>) -> Self {
        Self {
            token: token.into(),
            expires_at,
        }
    }

    pub fn expose(&self) -> &str {
        &self.token
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthToken")
            .field("token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UserState {
    #[serde(default)]
    pub onboarding: OnboardingRecord,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<AuthToken>,
}

impl UserState {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when a token is stored and not past its expiry.
    pub fn is_authenticated(&self, now: DateTime<Utc>) -> bool {
        self.auth_token
            .as_ref()
            .is_some_and(|token| !token.is_expired(now))
    }

    /// Drops the stored credential, returning it for revocation.
    pub fn sign_out(&mut self) -> Option<AuthToken> {
        self.auth_token.take()
    }

    /// Name to address the user by, with a fallback.
    pub fn display_name<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.onboarding
            .name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(fallback)
    }
}
