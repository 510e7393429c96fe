use serde::Serialize;
use std::{borrow::Cow, collections::BTreeMap};
use validator::{ValidationError, ValidationErrors, ValidationErrorsKind};

mod feedback;
mod login;
mod register;

pub use feedback::FeedbackInput;
pub use login::LoginInput;
pub use register::RegisterInput;

/// Field-level messages shown next to the inputs of a
/// re-rendered form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<&'static str, Vec<Cow<'static, str>>>);

impl FormErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn single(field: &'static str, message: impl Into<Cow<'static, str>>) -> Self {
        let mut errors = Self::new();
        errors.push(field, message);
        errors
    }

    pub fn push(&mut self, field: &'static str, message: impl Into<Cow<'static, str>>) {
        self.0.entry(field).or_default().push(message.into());
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&[Cow<'static, str>]> {
        self.0.get(field).map(Vec::as_slice)
    }
}

impl From<ValidationErrors> for FormErrors {
    fn from(value: ValidationErrors) -> Self {
        let mut errors = Self::new();
        for (field, kind) in value.into_errors() {
            // Inputs are flat, nothing nested to walk through.
            let ValidationErrorsKind::Field(list) = kind else {
                continue;
            };
            for error in list {
                let message = error.message.unwrap_or(error.code);
                errors.push(field, message);
            }
        }
        errors
    }
}

pub(crate) fn error(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

/// Checks whether the value is filled and within the maximum
/// amount of characters, returning the matching error if not.
pub(crate) fn check_length(value: &str, max: u64) -> Option<ValidationError> {
    if value.trim().is_empty() {
        Some(error("required", "This field is required."))
    } else if value.chars().count() as u64 > max {
        let mut error = ValidationError::new("length");
        error.message = Some(format!("Field cannot be longer than {max} characters.").into());
        error.add_param(Cow::Borrowed("max"), &max);
        Some(error)
    } else {
        None
    }
}

pub(crate) fn check_required(value: &str) -> Option<ValidationError> {
    value
        .trim()
        .is_empty()
        .then(|| error("required", "This field is required."))
}
