use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

use super::{check_length, check_required};
use crate::util::validation;

/// Input of both the add and update feedback forms.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct FeedbackInput {
    pub title: String,
    pub content: String,
}

impl Validate for FeedbackInput {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Some(error) = check_length(&self.title, validation::FEEDBACK_TITLE_MAX) {
            errors.add("title", error);
        }
        if let Some(error) = check_required(&self.content) {
            errors.add("content", error);
        }

        if errors.errors().is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate() {
        let input = FeedbackInput {
            title: "T".into(),
            content: "C".into(),
        };
        assert!(input.validate().is_ok());

        let input = FeedbackInput {
            title: "x".repeat(101),
            content: "\n".into(),
        };
        let errors = input.validate().unwrap_err();
        assert!(errors.errors().contains_key("title"));
        assert!(errors.errors().contains_key("content"));
    }
}
