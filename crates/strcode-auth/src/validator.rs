//! Authentication validator trait for pluggable token strategies
//!
//! [`StrCode`] implements [`AuthValidator`], so services that accept a bearer
//! token can verify strcode tokens behind the same interface as any other
//! strategy (API keys, database lookups, ...).

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;

use crate::codec::{StrCode, StrcodeError};

/// Authentication result containing the validated identity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthResult {
    /// Authenticated subject (the decoded token payload)
    pub subject: String,

    /// Extra facts about the token (expiry, ...)
    pub metadata: HashMap<String, String>,
}

impl AuthResult {
    pub fn new(subject: String) -> Self {
        Self {
            subject,
            metadata: HashMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: String, value: String) -> Self {
        self.metadata.insert(key, value);
        self
    }

    pub fn get_metadata(&self, key: &str) -> Option<&String> {
        self.metadata.get(key)
    }
}

/// Authentication errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AuthError {
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Token expired")]
    TokenExpired,

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<StrcodeError> for AuthError {
    fn from(err: StrcodeError) -> Self {
        match err {
            StrcodeError::Expired => AuthError::TokenExpired,
            StrcodeError::ExpiresInIsZero => AuthError::InternalError(err.to_string()),
            StrcodeError::IncorrectParameters
            | StrcodeError::IncorrectHash
            | StrcodeError::InvalidNumber(_) => AuthError::InvalidToken(err.to_string()),
        }
    }
}

/// Authentication validator trait
///
/// Takes a bearer token and returns the authenticated identity, or the reason
/// the token was rejected. Callers should treat every error as "reject".
#[async_trait]
pub trait AuthValidator: Send + Sync {
    async fn validate(&self, token: &str) -> Result<AuthResult, AuthError>;
}

#[async_trait]
impl AuthValidator for StrCode {
    async fn validate(&self, token: &str) -> Result<AuthResult, AuthError> {
        let now = Utc::now().timestamp();

        let (payload, expires_at) = self.verify_at(token, now).map_err(|e| {
            debug!(reason = %e, "rejected strcode token");
            AuthError::from(e)
        })?;

        debug!(
            payload_len = payload.len(),
            expires_at, "accepted strcode token"
        );

        Ok(AuthResult::new(payload.to_string())
            .with_metadata("exp".to_string(), expires_at.to_string()))
    }
}
