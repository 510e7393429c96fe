use chrono::Utc;
use error_stack::{Result, ResultExt};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::Notice;
use crate::config;

/// Claims of the token stored in the session cookie.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SessionClaims {
    /// Username of the logged in user, absent for anonymous sessions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    /// Notices waiting to be shown on the next rendered page.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notices: Vec<Notice>,
    pub iat: i64,
    pub exp: i64,
}

impl SessionClaims {
    #[must_use]
    pub fn new(sub: Option<String>, notices: Vec<Notice>, max_age_secs: u64) -> Self {
        let iat = Utc::now().timestamp();
        let max_age = i64::try_from(max_age_secs).unwrap_or(i64::MAX);
        Self {
            sub,
            notices,
            iat,
            exp: iat.saturating_add(max_age),
        }
    }
}

#[derive(Debug, Error)]
#[error("Failed to encode session token")]
pub struct EncodeTokenError;

#[derive(Debug, Error)]
#[error("Invalid session token")]
pub struct DecodeTokenError;

/// Signs and checks session tokens with the configured secret.
#[derive(Clone)]
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    max_age_secs: u64,
}

impl SessionKeys {
    const ALGORITHM: Algorithm = Algorithm::HS512;

    #[must_use]
    pub fn new(cfg: &config::Session) -> Self {
        let secret = cfg.secret.as_bytes();
        let mut validation = Validation::new(Self::ALGORITHM);
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            max_age_secs: cfg.max_age_secs.get(),
        }
    }

    #[must_use]
    pub fn claims(&self, sub: Option<String>, notices: Vec<Notice>) -> SessionClaims {
        SessionClaims::new(sub, notices, self.max_age_secs)
    }

    pub fn encode(&self, claims: &SessionClaims) -> Result<String, EncodeTokenError> {
        let header = Header::new(Self::ALGORITHM);
        jsonwebtoken::encode(&header, claims, &self.encoding).change_context(EncodeTokenError)
    }

    /// Tampered, expired and otherwise malformed tokens are all rejected.
    pub fn decode(&self, token: &str) -> Result<SessionClaims, DecodeTokenError> {
        jsonwebtoken::decode::<SessionClaims>(token, &self.decoding, &self.validation)
            .map(|v| v.claims)
            .change_context(DecodeTokenError)
    }
}

impl std::fmt::Debug for SessionKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionKeys")
            .field("algorithm", &Self::ALGORITHM)
            .field("max_age_secs", &self.max_age_secs)
            .finish_non_exhaustive()
    }
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::NoticeCategory;

    fn keys(secret: &str) -> SessionKeys {
        SessionKeys::new(&config::Session::new(secret))
    }

    #[test]
    fn test_roundtrip() {
        let keys = keys("a-very-secret-testing-key");
        let claims = keys.claims(
            Some("alice".into()),
            vec![Notice::new(NoticeCategory::Success, "Bye!")],
        );

        let token = keys.encode(&claims).unwrap();
        assert_eq!(keys.decode(&token).unwrap(), claims);
    }

    #[test]
    fn test_rejects_foreign_tokens() {
        let claims = keys("a-very-secret-testing-key").claims(Some("alice".into()), Vec::new());
        let token = keys("a-very-secret-testing-key").encode(&claims).unwrap();

        assert!(keys("another-secret-testing-key").decode(&token).is_err());
        assert!(keys("a-very-secret-testing-key").decode("garbage").is_err());
    }

    #[test]
    fn test_rejects_expired_tokens() {
        let keys = keys("a-very-secret-testing-key");
        let mut claims = keys.claims(Some("alice".into()), Vec::new());
        claims.iat -= 120;
        claims.exp = claims.iat + 60;

        let token = keys.encode(&claims).unwrap();
        assert!(keys.decode(&token).is_err());
    }
}
