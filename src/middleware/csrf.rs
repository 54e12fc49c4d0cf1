//! Double-submit-cookie CSRF protection.
//!
//! A random secret lives in an HttpOnly cookie. Clients fetch a token derived
//! from it (`GET /account/csrf`) and echo the token back in a header on every
//! state-changing request. The token is `<salt>-<hex(hmac_sha256(secret, salt))>`,
//! so a fresh token can be minted per page without rotating the secret.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use uuid::Uuid;

use crate::config::SecurityConfig;
use crate::error::ApiError;
use crate::middleware::response::EnvelopeError;
use crate::state::AppState;

/// Request headers checked for the token, in order
pub const TOKEN_HEADERS: [&str; 4] = ["csrf-token", "xsrf-token", "x-csrf-token", "x-xsrf-token"];

type HmacSha256 = Hmac<Sha256>;

const SALT_LENGTH: usize = 8;

pub fn create_secret() -> String {
    Uuid::new_v4().simple().to_string()
}

pub fn create_token(secret: &str) -> Option<String> {
    let salt = Uuid::new_v4().simple().to_string();
    tokenize(&salt[..SALT_LENGTH], secret)
}

pub fn verify_token(secret: &str, token: &str) -> bool {
    let Some((salt, _)) = token.split_once('-') else {
        return false;
    };
    tokenize(salt, secret).is_some_and(|expected| token.as_bytes().ct_eq(expected.as_bytes()).into())
}

fn tokenize(salt: &str, secret: &str) -> Option<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(salt.as_bytes());
    Some(format!("{}-{}", salt, hex::encode(mac.finalize().into_bytes())))
}

/// Read a cookie value from every `Cookie` header on the request
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
}

/// `Set-Cookie` value carrying the CSRF secret
pub fn secret_cookie(security: &SecurityConfig, secret: &str) -> String {
    let mut cookie = format!("{}={}; Path=/; HttpOnly; SameSite=Strict", security.csrf_cookie_name, secret);
    if security.cookie_secure {
        cookie.push_str("; Secure");
    }
    cookie
}

fn read_token(headers: &HeaderMap) -> Option<&str> {
    TOKEN_HEADERS
        .iter()
        .find_map(|name| headers.get(*name))
        .and_then(|value| value.to_str().ok())
}

/// CSRF guard stage. Safe methods pass through untouched.
pub async fn csrf_protection(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if request.method().is_safe() {
        return next.run(request).await;
    }

    let headers = request.headers();
    let valid = match (read_cookie(headers, &state.security.csrf_cookie_name), read_token(headers)) {
        (Some(secret), Some(token)) => verify_token(&secret, token),
        _ => false,
    };

    if !valid {
        tracing::warn!("Rejected {} {}: invalid csrf token", request.method(), request.uri().path());
        return csrf_error_handler();
    }

    next.run(request).await
}

/// Shared response for a failed CSRF check
pub fn csrf_error_handler() -> Response {
    EnvelopeError(ApiError::forbidden("invalid csrf token")).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn tokens_verify_against_their_secret() {
        let secret = create_secret();
        let token = create_token(&secret).unwrap();

        assert!(verify_token(&secret, &token));
        assert!(!verify_token(&create_secret(), &token));
        assert!(!verify_token(&secret, "garbage"));
        assert!(!verify_token(&secret, ""));
    }

    #[test]
    fn tokens_are_salted() {
        let secret = create_secret();
        let first = create_token(&secret).unwrap();
        let second = create_token(&secret).unwrap();

        assert_ne!(first, second);
        assert!(verify_token(&secret, &second));
    }

    #[test]
    fn tampered_signature_is_rejected() {
        let secret = create_secret();
        let token = create_token(&secret).unwrap();
        let (salt, signature) = token.split_once('-').unwrap();

        let mut forged = signature.to_string();
        forged.replace_range(..1, if signature.starts_with('0') { "1" } else { "0" });

        assert!(!verify_token(&secret, &format!("{}-{}", salt, forged)));
        assert!(!verify_token(&secret, &format!("{}-{}", salt, &signature[1..])));
        assert!(!verify_token(&secret, salt));
    }

    #[test]
    fn reads_cookie_among_others() {
        let mut headers = HeaderMap::new();
        headers.append(header::COOKIE, HeaderValue::from_static("theme=dark; _csrf=abc123"));
        headers.append(header::COOKIE, HeaderValue::from_static("other=1"));

        assert_eq!(read_cookie(&headers, "_csrf").as_deref(), Some("abc123"));
        assert_eq!(read_cookie(&headers, "other").as_deref(), Some("1"));
        assert_eq!(read_cookie(&headers, "missing"), None);
    }

    #[test]
    fn token_is_read_from_any_known_header() {
        let mut headers = HeaderMap::new();
        headers.insert("x-xsrf-token", HeaderValue::from_static("t"));
        assert_eq!(read_token(&headers), Some("t"));
    }
}
