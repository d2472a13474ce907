use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Claims carried by the signed credential: the subject's user id plus
/// issue and expiry timestamps. Tokens are never persisted server-side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaim {
    pub sub: i32,
    pub iat: usize,
    pub exp: usize,
}

/// Why a credential failed verification. `Expired` means the signature was
/// fine but the token outlived its `exp`; everything else is `Invalid`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    Invalid,
    Expired,
}

/// Issue a signed token for `user_id` valid for `ttl_days`.
pub fn sign(user_id: i32, secret: &str, ttl_days: i64) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let claims = TokenClaim {
        sub: user_id,
        iat: now.timestamp() as usize,
        exp: (now + Duration::days(ttl_days)).timestamp() as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Verify a token against `secret`. Pure over input, secret and the clock.
pub fn verify(token: &str, secret: &str) -> Result<TokenClaim, TokenError> {
    decode::<TokenClaim>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::Invalid,
    })
}
