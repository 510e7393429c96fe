use serde::Deserialize;
use validator::{Validate, ValidationErrors};

use super::check_required;
use crate::util::Sensitive;

/// Input of the login form. Only presence is checked here,
/// whether the credentials are correct is up to the user store.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginInput {
    pub username: String,
    pub password: Sensitive<String>,
}

impl Validate for LoginInput {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Some(error) = check_required(&self.username) {
            errors.add("username", error);
        }
        if let Some(error) = check_required(self.password.as_str()) {
            errors.add("password", error);
        }

        if errors.errors().is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
