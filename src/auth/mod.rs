use std::collections::HashSet;

use async_trait::async_trait;

use crate::error::AppError;

/// Pluggable authorization policy. The shipped configuration is an allow-list
/// of exactly one driver identity, matching the system this replaces.
pub trait AccessPolicy: Send + Sync {
    fn authorize(&self, email: &str) -> Result<(), AppError>;
}

pub struct AllowListPolicy {
    allowed: HashSet<String>,
}

impl AllowListPolicy {
    pub fn new(allowed: impl IntoIterator<Item = String>) -> Self {
        Self {
            allowed: allowed.into_iter().collect(),
        }
    }

    pub fn single(email: impl Into<String>) -> Self {
        Self::new([email.into()])
    }
}

impl AccessPolicy for AllowListPolicy {
    fn authorize(&self, email: &str) -> Result<(), AppError> {
        if self.allowed.contains(email) {
            Ok(())
        } else {
            Err(AppError::UnauthorizedIdentity(
                "unauthorized email address".to_string(),
            ))
        }
    }
}

/// The hosted identity provider, behind a seam so the core never sees
/// network details.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<(), AppError>;
}

/// In-repo stand-in for the hosted email+password provider.
pub struct SharedSecretProvider {
    secret: String,
}

impl SharedSecretProvider {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }
}

#[async_trait]
impl IdentityProvider for SharedSecretProvider {
    async fn sign_in(&self, _email: &str, password: &str) -> Result<(), AppError> {
        if password == self.secret {
            Ok(())
        } else {
            Err(AppError::UnauthorizedIdentity(
                "invalid credentials".to_string(),
            ))
        }
    }
}

/// The login gate: the allow-list is checked first and short-circuits, so a
/// disallowed email never reaches the identity provider.
pub async fn sign_in(
    policy: &dyn AccessPolicy,
    provider: &dyn IdentityProvider,
    email: &str,
    password: &str,
) -> Result<(), AppError> {
    policy.authorize(email)?;
    provider.sign_in(email, password).await
}
