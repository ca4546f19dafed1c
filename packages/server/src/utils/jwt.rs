use anyhow::Result;
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::config::AuthConfig;

/// JWT claims carried by every session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub id: i32,
    pub avatar: String,
    pub user_name: String,
    pub login_name: String,
    pub phone: String,
    pub email: String,
    /// Role ids.
    pub roles: Vec<i32>,
    /// Flattened permission codes of all roles.
    pub permissions: Vec<String>,
    pub exp: usize,
    pub iss: String,
}

/// Token subject before expiry and issuer are stamped on.
#[derive(Debug, Clone)]
pub struct TokenSubject {
    pub id: i32,
    pub avatar: String,
    pub user_name: String,
    pub login_name: String,
    pub phone: String,
    pub email: String,
    pub roles: Vec<i32>,
    pub permissions: Vec<String>,
}

/// Sign a new HS256 token valid for `auth.token_ttl_hours`.
pub fn sign(subject: TokenSubject, auth: &AuthConfig) -> Result<String> {
    let expiration = Utc::now()
        .checked_add_signed(Duration::hours(auth.token_ttl_hours))
        .ok_or_else(|| anyhow::anyhow!("token expiry overflows"))?
        .timestamp();

    let claims = Claims {
        id: subject.id,
        avatar: subject.avatar,
        user_name: subject.user_name,
        login_name: subject.login_name,
        phone: subject.phone,
        email: subject.email,
        roles: subject.roles,
        permissions: subject.permissions,
        exp: expiration as usize,
        iss: auth.issuer.clone(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(auth.jwt_secret.as_bytes()),
    )?;

    Ok(token)
}

/// Verify signature, expiry and issuer, then decode the claims.
pub fn verify(token: &str, auth: &AuthConfig) -> Result<Claims> {
    let mut validation = Validation::default();
    validation.set_issuer(&[auth.issuer.as_str()]);
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(auth.jwt_secret.as_bytes()),
        &validation,
    )?;
    Ok(token_data.claims)
}
