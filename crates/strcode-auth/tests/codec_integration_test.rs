/// Integration tests for strcode token issuing and verification
///
/// Exercises the public API against the real clock: round trips, expiry after
/// sleeping, tamper detection and sharing one codec between threads.
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use strcode_auth::{StrCode, StrcodeError, TokenParts};

const SECRET: &str = "secretKey123";
const PAYLOAD: &str = "strcode123@gmail.com";

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

#[test]
fn test_init() {
    assert!(StrCode::new(SECRET, ":", Duration::from_secs(3600)).is_ok());
    assert_eq!(
        StrCode::new(SECRET, ":", Duration::ZERO).unwrap_err(),
        StrcodeError::ExpiresInIsZero
    );
}

#[test]
fn test_token_shape() {
    let codec = StrCode::new(SECRET, ":", Duration::from_secs(1)).unwrap();
    let token = codec.encode(PAYLOAD);

    let parts = TokenParts::split(&token, ":").unwrap();
    assert_eq!(parts.payload, PAYLOAD);
    assert!(is_digits(parts.checksum), "checksum {:?}", parts.checksum);
    assert!(is_digits(parts.expires_at), "expires_at {:?}", parts.expires_at);

    let expires_at = parts.expires_at().unwrap();
    let now = chrono::Utc::now().timestamp();
    assert!(expires_at > now - 1 && expires_at <= now + 1);
}

#[test]
fn test_decode_then_expire() {
    let codec = StrCode::new(SECRET, ":", Duration::from_secs(1)).unwrap();
    let token = codec.encode(PAYLOAD);
    let expires_at = TokenParts::split(&token, ":")
        .unwrap()
        .expires_at()
        .unwrap();

    // Immediate decode, pinned to the second the token was issued in
    assert_eq!(codec.decode_at(&token, expires_at - 1).unwrap(), PAYLOAD);

    // Truncating the first character breaks the checksum
    assert_eq!(
        codec.decode_at(&token[1..], expires_at - 1),
        Err(StrcodeError::IncorrectHash)
    );

    thread::sleep(Duration::from_millis(1100));
    assert_eq!(codec.decode(&token), Err(StrcodeError::Expired));
}

#[test]
fn test_round_trip_real_clock() {
    let codec = StrCode::new(SECRET, ":", Duration::from_secs(3600)).unwrap();

    for payload in [
        PAYLOAD,
        "",
        "user-42",
        "Ünïcödé ✓ 日本語",
        "with spaces and | pipes",
    ] {
        let token = codec.encode(payload);
        assert_eq!(codec.decode(&token).unwrap(), payload);
    }
}

#[test]
fn test_single_byte_edits_never_yield_other_payload() {
    let codec = StrCode::new(SECRET, ":", Duration::from_secs(3600)).unwrap();
    let token = codec.encode(PAYLOAD);
    let bytes = token.as_bytes();

    for i in 0..bytes.len() {
        let mut edited = bytes.to_vec();
        edited[i] = if edited[i] == b'0' { b'1' } else { b'0' };
        let edited = String::from_utf8(edited).unwrap();

        match codec.decode(&edited) {
            Ok(payload) => panic!("edit at {i} accepted: {edited} -> {payload}"),
            Err(
                StrcodeError::IncorrectHash
                | StrcodeError::IncorrectParameters
                | StrcodeError::InvalidNumber(_)
                | StrcodeError::Expired,
            ) => {}
            Err(e) => panic!("unexpected error for {edited}: {e}"),
        }
    }
}

#[test]
fn test_separator_mismatch() {
    let colon = StrCode::new(SECRET, ":", Duration::from_secs(3600)).unwrap();
    let semicolon = StrCode::new(SECRET, ";", Duration::from_secs(3600)).unwrap();

    let token = colon.encode(PAYLOAD);
    assert_eq!(
        semicolon.decode(&token),
        Err(StrcodeError::IncorrectParameters)
    );
}

#[test]
fn test_error_messages() {
    assert_eq!(
        StrcodeError::Expired.to_string(),
        "the expiration date has expired"
    );
    assert_eq!(
        StrcodeError::IncorrectHash.to_string(),
        "the code has been edited"
    );
    assert_eq!(
        StrcodeError::ExpiresInIsZero.to_string(),
        "expires in cannot be zero"
    );
}

#[test]
fn test_shared_between_threads() {
    let codec = Arc::new(StrCode::new(SECRET, ":", Duration::from_secs(3600)).unwrap());

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let codec = Arc::clone(&codec);
            thread::spawn(move || {
                let payload = format!("user-{i}");
                for _ in 0..100 {
                    let token = codec.encode(&payload);
                    assert_eq!(codec.decode(&token).unwrap(), payload);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}

#[test]
fn test_codec_is_send_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<StrCode>();
}
