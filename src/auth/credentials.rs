//! Extraction of credential material from request headers

use axum::http::{header, HeaderMap};
use base64::{engine::general_purpose::STANDARD, Engine};

use crate::error::AuthError;

/// Header carrying the API key
pub const API_KEY_HEADER: &str = "x-api-key";

/// Read the `x-api-key` header
pub fn api_key(headers: &HeaderMap) -> Result<&str, AuthError> {
    headers
        .get(API_KEY_HEADER)
        .ok_or(AuthError::MissingCredential)?
        .to_str()
        .map_err(|_| AuthError::MalformedCredential)
}

/// Split an `Authorization` header into its scheme and parameters
fn authorization<'a>(headers: &'a HeaderMap, scheme: &str) -> Result<&'a str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingCredential)?
        .to_str()
        .map_err(|_| AuthError::MalformedCredential)?;

    let (given, params) = value
        .split_once(' ')
        .ok_or(AuthError::MalformedCredential)?;

    if !given.eq_ignore_ascii_case(scheme) {
        return Err(AuthError::MalformedCredential);
    }

    Ok(params.trim())
}

/// Decode `Authorization: Basic base64(username:password)`
///
/// The password may contain `:`; the username may not.
pub fn basic(headers: &HeaderMap) -> Result<(String, String), AuthError> {
    let encoded = authorization(headers, "Basic")?;
    let decoded = STANDARD
        .decode(encoded)
        .map_err(|_| AuthError::MalformedCredential)?;
    let decoded = String::from_utf8(decoded).map_err(|_| AuthError::MalformedCredential)?;

    let (username, password) = decoded
        .split_once(':')
        .ok_or(AuthError::MalformedCredential)?;

    Ok((username.to_string(), password.to_string()))
}

/// Read the token from `Authorization: Bearer <token>`
pub fn bearer(headers: &HeaderMap) -> Result<&str, AuthError> {
    let token = authorization(headers, "Bearer")?;

    if token.is_empty() || token.contains(char::is_whitespace) {
        return Err(AuthError::MalformedCredential);
    }

    Ok(token)
}
