use anyhow::Result;
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::models::role::Role;

/// JWT Claims structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Email
    pub uid: i32,    // User ID
    pub name: String,
    pub role: Role,
    /// `ROLE_<ROLE>`, used for role gating.
    pub authorities: String,
    pub iat: usize,
    pub exp: usize,
}

/// Identity encoded into a token.
pub struct TokenSubject<'a> {
    pub user_id: i32,
    pub email: &'a str,
    pub name: &'a str,
    pub role: Role,
}

/// Sign a new JWT token for a user.
pub fn sign(subject: &TokenSubject<'_>, secret: &str, ttl_secs: i64) -> Result<String> {
    let now = Utc::now();
    let expiration = now
        .checked_add_signed(Duration::seconds(ttl_secs))
        .ok_or_else(|| anyhow::anyhow!("token expiry out of range"))?;

    let claims = Claims {
        sub: subject.email.to_owned(),
        uid: subject.user_id,
        name: subject.name.to_owned(),
        role: subject.role,
        authorities: subject.role.authority(),
        iat: now.timestamp() as usize,
        exp: expiration.timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

/// Verify and decode a JWT token.
pub fn verify(token: &str, secret: &str) -> Result<Claims> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(token_data.claims)
}

/// Returns whether `token` carries a valid signature and has not expired.
pub fn validate(token: &str, secret: &str) -> bool {
    verify(token, secret).is_ok()
}
