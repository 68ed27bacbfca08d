//! Signed cookie carrying the username picked before an account exists.
//!
//! The value is `base64url(username).hex(hmac_sha256(secret, username))`, so
//! the client can hold it without being able to forge a different name.

use axum::http::{header, HeaderMap, HeaderValue};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

pub const USERNAME_COOKIE: &str = "devpage.username";
const COOKIE_MAX_AGE_SECS: i64 = 60 * 60;

#[derive(Clone)]
pub struct UsernameSession {
    secret: String,
    secure: bool,
}

impl UsernameSession {
    pub fn new(secret: String, secure: bool) -> Self {
        Self { secret, secure }
    }

    fn signature(&self, username: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(username.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    pub fn seal(&self, username: &str) -> String {
        format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(username.as_bytes()),
            self.signature(username)
        )
    }

    pub fn open(&self, value: &str) -> Option<String> {
        let (encoded, signature) = value.split_once('.')?;
        let bytes = URL_SAFE_NO_PAD.decode(encoded).ok()?;
        let username = String::from_utf8(bytes).ok()?;

        let expected = self.signature(&username);
        if !constant_time_eq(signature.as_bytes(), expected.as_bytes()) {
            return None;
        }

        Some(username)
    }

    /// Reads and verifies the username cookie from request headers.
    pub fn read(&self, headers: &HeaderMap) -> Option<String> {
        headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == USERNAME_COOKIE)
            .and_then(|(_, value)| self.open(value))
    }

    pub fn set_cookie(&self, username: &str) -> HeaderValue {
        self.cookie(&self.seal(username), COOKIE_MAX_AGE_SECS)
    }

    pub fn clear_cookie(&self) -> HeaderValue {
        self.cookie("", 0)
    }

    fn cookie(&self, value: &str, max_age: i64) -> HeaderValue {
        let mut cookie = format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
            USERNAME_COOKIE, value, max_age
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        // base64url, hex and the fixed attributes are all visible ASCII
        HeaderValue::from_str(&cookie).unwrap_or_else(|_| HeaderValue::from_static(""))
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }

    result == 0
}
