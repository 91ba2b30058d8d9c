//! CSRF token issuance for the portal form.
//!
//! The page fetches a token at load time and posts it back with the
//! credentials. There is no server-side ledger; the login handler checks
//! the shape only. The token keeps casual form replays out, nothing more.

use axum::{
    http::{header::CACHE_CONTROL, HeaderMap, HeaderValue, StatusCode},
    response::Json,
};
use rand::{rngs::OsRng, RngCore};
use tracing::error;

use crate::portal::types::Token;

pub const TOKEN_BYTES: usize = 16;

/// 16 random bytes, lowercase hex.
pub async fn token() -> Result<(HeaderMap, Json<Token>), (StatusCode, String)> {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.try_fill_bytes(&mut bytes).map_err(|err| {
        error!("Failed to generate form token: {err}");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to generate token".to_string(),
        )
    })?;

    let mut headers = HeaderMap::new();
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));

    Ok((
        headers,
        Json(Token {
            token: hex::encode(bytes),
        }),
    ))
}

/// Shape check applied to submitted tokens.
#[must_use]
pub fn valid_token_shape(token: &str) -> bool {
    token.len() == TOKEN_BYTES * 2 && token.chars().all(|c| c.is_ascii_hexdigit())
}
