//! HS256 bearer tokens issued at login and verified on every `/api` call.

use crate::domain::model::Account;
use crate::domain::ports::Authenticator;
use crate::utils::error::{FakerError, Result};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

pub const DEFAULT_TOKEN_TTL_SECONDS: u64 = 3_600;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub account_id: i64,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Clone)]
pub struct JwtAuthenticator {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl_seconds: i64,
}

impl JwtAuthenticator {
    pub fn new(secret: &str, ttl_seconds: u64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl_seconds: i64::try_from(ttl_seconds).unwrap_or(i64::MAX),
        }
    }

    pub fn issue(&self, account: &Account) -> Result<String> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            account_id: account.id,
            email: account.email.clone(),
            iat: now,
            exp: now.saturating_add(self.ttl_seconds),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(|e| {
            FakerError::CredentialError {
                message: format!("failed to sign token: {}", e),
            }
        })
    }

    pub fn claims(&self, token: &str) -> Result<Claims> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| FakerError::unauthorized(format!("invalid token: {}", e)))
    }
}

impl Authenticator for JwtAuthenticator {
    fn verify(&self, token: &str) -> Result<i64> {
        let claims = self.claims(token)?;
        if claims.account_id <= 0 {
            return Err(FakerError::unauthorized("token carries no account"));
        }
        Ok(claims.account_id)
    }
}
