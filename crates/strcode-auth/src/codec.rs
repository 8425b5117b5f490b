//! Time-limited string tokens with an embedded checksum
//!
//! A token is three fields joined by a separator:
//!
//! ```text
//! <payload><sep><checksum><sep><expires_at>
//! ```
//!
//! `expires_at` is a Unix timestamp in seconds and `checksum` mixes the payload,
//! the secret and the expiry with 64-bit wrapping arithmetic. The checksum
//! detects casual edits; it is not a MAC and must not be treated as one.

use std::fmt;
use std::num::ParseIntError;
use std::time::Duration;

use chrono::Utc;
use thiserror::Error;

/// Codec errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StrcodeError {
    #[error("expires in cannot be zero")]
    ExpiresInIsZero,

    #[error("incorrect parameters: expected payload, checksum and expiration")]
    IncorrectParameters,

    #[error("the expiration date has expired")]
    Expired,

    #[error("the code has been edited")]
    IncorrectHash,

    #[error("invalid integer field: {0}")]
    InvalidNumber(#[from] ParseIntError),
}

pub type Result<T> = std::result::Result<T, StrcodeError>;

/// Sum of the code points of `s`, seeded at 1. Wraps on overflow.
fn digest(s: &str) -> i64 {
    s.chars()
        .fold(1i64, |sum, c| sum.wrapping_add(i64::from(u32::from(c))))
}

fn unix_now() -> i64 {
    Utc::now().timestamp()
}

/// Borrowed view of the three fields of a token
///
/// Produced by a purely structural split: neither number is parsed until
/// [`TokenParts::expires_at`] or [`TokenParts::checksum`] is called.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenParts<'a> {
    pub payload: &'a str,
    pub checksum: &'a str,
    pub expires_at: &'a str,
}

impl<'a> TokenParts<'a> {
    /// Split `token` on every occurrence of `separator`
    ///
    /// Fails with [`StrcodeError::IncorrectParameters`] unless there are exactly
    /// three fields. An empty separator splits the token into single characters.
    pub fn split(token: &'a str, separator: &str) -> Result<Self> {
        let fields: Vec<&'a str> = if separator.is_empty() {
            token
                .char_indices()
                .map(|(i, c)| &token[i..i + c.len_utf8()])
                .collect()
        } else {
            token.split(separator).collect()
        };

        match fields.as_slice() {
            &[payload, checksum, expires_at] => Ok(Self {
                payload,
                checksum,
                expires_at,
            }),
            _ => Err(StrcodeError::IncorrectParameters),
        }
    }

    pub fn expires_at(&self) -> Result<i64> {
        Ok(self.expires_at.parse::<i64>()?)
    }

    pub fn checksum(&self) -> Result<i64> {
        Ok(self.checksum.parse::<i64>()?)
    }
}

/// Token encoder/decoder bound to one secret, separator and validity window
///
/// Immutable after construction, so a single instance can be shared between
/// threads and reused for any number of tokens.
#[derive(Clone)]
pub struct StrCode {
    secret: i64,
    separator: String,
    expires_in: i64,
}

impl StrCode {
    /// Create a codec
    ///
    /// `expires_in` is truncated to whole seconds. A zero duration is rejected
    /// with [`StrcodeError::ExpiresInIsZero`]; a non-zero duration shorter than
    /// one second is accepted and yields tokens that are already expired.
    pub fn new(
        secret: &str,
        separator: impl Into<String>,
        expires_in: Duration,
    ) -> Result<Self> {
        if expires_in.is_zero() {
            return Err(StrcodeError::ExpiresInIsZero);
        }

        Ok(Self {
            secret: digest(secret),
            separator: separator.into(),
            expires_in: i64::try_from(expires_in.as_secs()).unwrap_or(i64::MAX),
        })
    }

    pub fn separator(&self) -> &str {
        &self.separator
    }

    /// Validity window in whole seconds
    pub fn expires_in(&self) -> Duration {
        Duration::from_secs(self.expires_in.unsigned_abs())
    }

    fn checksum(&self, payload: &str, expires_at: i64) -> i64 {
        // i64::MIN has no positive counterpart and is kept as-is
        digest(payload)
            .wrapping_mul(self.secret)
            .wrapping_mul(expires_at)
            .wrapping_abs()
    }

    /// Encode `payload` into a token that expires `expires_in` from now
    pub fn encode(&self, payload: &str) -> String {
        self.encode_at(payload, unix_now())
    }

    /// Encode `payload` as if the current Unix time were `now`
    pub fn encode_at(&self, payload: &str, now: i64) -> String {
        let expires_at = now.saturating_add(self.expires_in);
        let checksum = self.checksum(payload, expires_at);

        format!(
            "{payload}{sep}{checksum}{sep}{expires_at}",
            sep = self.separator
        )
    }

    /// Decode `token` and return its payload
    pub fn decode(&self, token: &str) -> Result<String> {
        self.decode_at(token, unix_now())
    }

    /// Decode `token` as if the current Unix time were `now`
    pub fn decode_at(&self, token: &str, now: i64) -> Result<String> {
        self.verify_at(token, now)
            .map(|(payload, _)| payload.to_string())
    }

    /// Run every validation gate and return the payload with its expiry
    ///
    /// Gates run in order: structure, expiry parse, expiry check, checksum
    /// parse, checksum compare. The first failure is returned.
    pub(crate) fn verify_at<'a>(&self, token: &'a str, now: i64) -> Result<(&'a str, i64)> {
        let parts = TokenParts::split(token, &self.separator)?;

        let expires_at = parts.expires_at()?;
        if now >= expires_at {
            return Err(StrcodeError::Expired);
        }

        let checksum = parts.checksum()?;
        if checksum != self.checksum(parts.payload, expires_at) {
            return Err(StrcodeError::IncorrectHash);
        }

        Ok((parts.payload, expires_at))
    }
}

impl fmt::Debug for StrCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StrCode")
            .field("secret", &"<redacted>")
            .field("separator", &self.separator)
            .field("expires_in", &self.expires_in)
            .finish()
    }
}
