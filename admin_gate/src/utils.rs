use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use http::header::{HeaderMap, SET_COOKIE};
use ring::rand::SecureRandom;
use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum UtilError {
    #[error("Crypto error: {0}")]
    Crypto(String),

    #[error("Cookie error: {0}")]
    Cookie(String),
}

fn random_bytes(len: usize) -> Result<Vec<u8>, UtilError> {
    let rng = ring::rand::SystemRandom::new();
    let mut buf = vec![0u8; len];
    rng.fill(&mut buf)
        .map_err(|_| UtilError::Crypto("Failed to generate random bytes".to_string()))?;
    Ok(buf)
}

/// Random base64url string built from `len` random bytes. Used for session ids.
pub(crate) fn gen_random_string(len: usize) -> Result<String, UtilError> {
    Ok(URL_SAFE_NO_PAD.encode(random_bytes(len)?))
}

/// Random lowercase hex string built from `len` random bytes. Used for CSRF tokens.
pub(crate) fn gen_random_hex(len: usize) -> Result<String, UtilError> {
    Ok(hex::encode(random_bytes(len)?))
}

pub(crate) fn header_set_cookie(
    headers: &mut HeaderMap,
    name: &str,
    value: &str,
    max_age: i64,
    secure: bool,
) -> Result<(), UtilError> {
    let mut cookie = format!("{name}={value}; SameSite=Strict; HttpOnly; Path=/; Max-Age={max_age}");
    if secure {
        cookie.push_str("; Secure");
    }
    headers.append(
        SET_COOKIE,
        cookie
            .parse()
            .map_err(|_| UtilError::Cookie("Failed to parse cookie".to_string()))?,
    );
    Ok(())
}
