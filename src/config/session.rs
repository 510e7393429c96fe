use serde::Deserialize;
use std::borrow::Cow;
use std::num::NonZeroU64;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::util::Sensitive;

/// Configuration for the signed session cookie.
#[derive(Debug, Deserialize)]
pub struct Session {
    /// Secret key used to sign session cookies. Changing it
    /// logs everyone out.
    ///
    /// **Environment variables**:
    /// - `FEEDBACK_SESSION_SECRET` or `SECRET_KEY`
    pub secret: Sensitive<String>,
    /// **Environment variables**:
    /// - `FEEDBACK_SESSION_COOKIE_NAME`
    #[serde(default = "Session::default_cookie_name")]
    pub cookie_name: String,
    /// How long a session stays valid after it was last written.
    ///
    /// **Environment variables**:
    /// - `FEEDBACK_SESSION_MAX_AGE_SECS`
    #[serde(default = "Session::default_max_age_secs")]
    pub max_age_secs: NonZeroU64,
    /// Only send the session cookie over HTTPS.
    ///
    /// **Environment variables**:
    /// - `FEEDBACK_SESSION_SECURE_COOKIE`
    #[serde(default)]
    pub secure_cookie: bool,
}

impl Session {
    const SECRET_MIN: usize = 12;
    const SECRET_MAX: usize = 1024;
    const DEFAULT_MAX_AGE_SECS: u64 = 60 * 60 * 24 * 7;

    fn default_cookie_name() -> String {
        "session".into()
    }

    const fn default_max_age_secs() -> NonZeroU64 {
        match NonZeroU64::new(Self::DEFAULT_MAX_AGE_SECS) {
            Some(n) => n,
            None => panic!("DEFAULT_MAX_AGE_SECS is accidentally set to 0"),
        }
    }

    #[must_use]
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: Sensitive::new(secret.into()),
            cookie_name: Self::default_cookie_name(),
            max_age_secs: Self::default_max_age_secs(),
            secure_cookie: false,
        }
    }
}

impl Validate for Session {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if !(Self::SECRET_MIN..=Self::SECRET_MAX).contains(&self.secret.chars().count()) {
            let mut error = ValidationError::new("length");
            error.message = Some(Cow::Borrowed("Invalid session secret key"));
            errors.add("secret", error);
        }

        if self.cookie_name.is_empty() {
            let mut error = ValidationError::new("length");
            error.message = Some(Cow::Borrowed("Cookie name must not be empty"));
            errors.add("cookie_name", error);
        }

        if errors.errors().is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
