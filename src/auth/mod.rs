//! Bearer token issuance and verification.
//!
//! Tokens are HS256 JWTs carrying the student id; handlers trust that id as
//! given once the signature and expiry check out.

use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult, AuthError};

pub mod extract;
pub mod password;

pub use extract::AuthenticatedStudent;

/// Payload stored in the token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub student_id: String,
    pub student_name: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// Signs and verifies bearer tokens
#[derive(Clone)]
pub struct TokenAuthority {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenAuthority {
    pub fn new(secret: &str, ttl_secs: i64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl: Duration::seconds(ttl_secs),
        }
    }

    pub fn issue(&self, student_id: &str, student_name: &str) -> AppResult<String> {
        let now = Utc::now();
        let claims = Claims {
            student_id: student_id.to_string(),
            student_name: student_name.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        self.sign(&claims)
    }

    pub fn sign(&self, claims: &Claims) -> AppResult<String> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| AppError::Internal(format!("Failed to sign token: {}", e)))
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::Expired,
                _ => AuthError::Invalid,
            })
    }
}

/// Extracts the raw token from an `Authorization` header value
///
/// The `Bearer ` prefix is optional; an empty value counts as missing.
pub fn bearer_token(header: Option<&str>) -> Result<&str, AuthError> {
    let raw = header.map(str::trim).unwrap_or_default();
    let token = match raw.strip_prefix("Bearer") {
        Some(rest) if rest.is_empty() || rest.starts_with(' ') => rest.trim(),
        _ => raw,
    };

    if token.is_empty() {
        Err(AuthError::Missing)
    } else {
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-that-is-long-enough-123";

    #[test]
    fn test_issue_and_verify() {
        let authority = TokenAuthority::new(SECRET, 3600);
        let token = authority.issue("2110631170001", "Ayu Lestari").unwrap();

        let claims = authority.verify(&token).unwrap();
        assert_eq!(claims.student_id, "2110631170001");
        assert_eq!(claims.student_name, "Ayu Lestari");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_expired_token() {
        let authority = TokenAuthority::new(SECRET, 3600);
        let past = Utc::now().timestamp() - 7200;
        let token = authority
            .sign(&Claims {
                student_id: "1".into(),
                student_name: "Budi".into(),
                iat: past - 3600,
                exp: past,
            })
            .unwrap();

        assert_eq!(authority.verify(&token), Err(AuthError::Expired));
    }

    #[test]
    fn test_wrong_secret_is_invalid() {
        let issuer = TokenAuthority::new(SECRET, 3600);
        let verifier = TokenAuthority::new("another-secret-entirely-0123456789", 3600);
        let token = issuer.issue("1", "Budi").unwrap();

        assert_eq!(verifier.verify(&token), Err(AuthError::Invalid));
    }

    #[test]
    fn test_garbage_is_invalid() {
        let authority = TokenAuthority::new(SECRET, 3600);
        assert_eq!(authority.verify("not.a.jwt"), Err(AuthError::Invalid));
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token(Some("Bearer abc")), Ok("abc"));
        assert_eq!(bearer_token(Some("abc")), Ok("abc"));
        assert_eq!(bearer_token(Some("Bearer ")), Err(AuthError::Missing));
        assert_eq!(bearer_token(Some("")), Err(AuthError::Missing));
        assert_eq!(bearer_token(None), Err(AuthError::Missing));
    }
}
