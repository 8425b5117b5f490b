//! Self-verifying, time-limited string tokens
//!
//! ```
//! use std::time::Duration;
//! use strcode_auth::{StrCode, StrcodeError};
//!
//! let codec = StrCode::new("secretKey123", ":", Duration::from_secs(3600)).unwrap();
//! let token = codec.encode("strcode123@gmail.com");
//! assert_eq!(codec.decode(&token).unwrap(), "strcode123@gmail.com");
//!
//! let edited = &token[1..];
//! assert_eq!(codec.decode(edited), Err(StrcodeError::IncorrectHash));
//! ```

pub mod codec;
pub mod validator;

pub use codec::{StrCode, StrcodeError, TokenParts};
pub use validator::{AuthError, AuthResult, AuthValidator};

// Re-export useful types
pub use async_trait::async_trait;
