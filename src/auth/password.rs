use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use error_stack::{Result, ResultExt};
use once_cell::sync::Lazy;
use thiserror::Error;

static CONTEXT: Lazy<Argon2<'static>> = Lazy::new(|| {
    Argon2::new(
        argon2::Algorithm::Argon2id,
        argon2::Version::V0x13,
        argon2::Params::DEFAULT,
    )
});

/// Verified against when the account being logged into does not
/// exist, so both outcomes cost the same amount of work.
static DUMMY_HASH: Lazy<Option<String>> =
    Lazy::new(|| hash("not the password you are looking for").ok());

#[derive(Debug, Error)]
#[error("Failed to generate password hash")]
pub struct HashPasswordError;

/// Hashes the password with Argon2id and a random salt. The result
/// is a PHC string carrying the parameters and the salt.
///
/// This is CPU heavy, call it from a blocking thread.
pub fn hash(password: impl AsRef<[u8]>) -> Result<String, HashPasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = CONTEXT
        .hash_password(password.as_ref(), &salt)
        .change_context(HashPasswordError)?;

    Ok(password_hash.to_string())
}

/// Checks the password against a stored hash.
///
/// A malformed hash never matches anything, it is logged and
/// treated like a wrong password.
pub fn verify(password: impl AsRef<[u8]>, hash: &str) -> bool {
    let hash = match PasswordHash::new(hash) {
        Ok(hash) => hash,
        Err(error) => {
            tracing::warn!(%error, "could not parse stored password hash");
            return false;
        }
    };

    match CONTEXT.verify_password(password.as_ref(), &hash) {
        Ok(..) => true,
        Err(argon2::password_hash::Error::Password) => false,
        Err(error) => {
            tracing::warn!(%error, "could not verify password");
            false
        }
    }
}

/// Burns the same amount of time as [`verify`] for a password
/// that has no account behind it. Always `false`.
pub fn verify_dummy(password: impl AsRef<[u8]>) -> bool {
    if let Some(hash) = DUMMY_HASH.as_deref() {
        verify(password, hash);
    }
    false
}
