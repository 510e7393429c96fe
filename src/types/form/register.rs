use serde::Deserialize;
use validator::{Validate, ValidateEmail, ValidationErrors};

use super::{check_length, check_required, error};
use crate::util::{validation, Sensitive};

/// Input of the register form.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RegisterInput {
    pub username: String,
    pub password: Sensitive<String>,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl Validate for RegisterInput {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Some(error) = check_length(&self.username, validation::USERNAME_MAX) {
            errors.add("username", error);
        } else if !validation::is_valid_username(&self.username) {
            errors.add(
                "username",
                error(
                    "username",
                    "Usernames may only contain letters, numbers, dots, dashes and underscores.",
                ),
            );
        }

        if let Some(error) = check_required(self.password.as_str()) {
            errors.add("password", error);
        }

        if let Some(error) = check_length(&self.email, validation::EMAIL_MAX) {
            errors.add("email", error);
        } else if !self.email.validate_email() {
            errors.add("email", error("email", "Invalid email address."));
        }

        if let Some(error) = check_length(&self.first_name, validation::NAME_MAX) {
            errors.add("first_name", error);
        }
        if let Some(error) = check_length(&self.last_name, validation::NAME_MAX) {
            errors.add("last_name", error);
        }

        if errors.errors().is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
