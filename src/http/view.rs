use actix_web::http::StatusCode;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

use crate::types::form::FormErrors;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeCategory {
    Success,
    Danger,
    Info,
}

/// One-off message shown on the next rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Notice {
    pub category: NoticeCategory,
    pub message: Cow<'static, str>,
}

impl Notice {
    #[must_use]
    pub fn new(category: NoticeCategory, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            category,
            message: message.into(),
        }
    }
}

/// Data handed to the view collaborator.
#[derive(Debug)]
pub struct Page<T> {
    pub(crate) view: &'static str,
    pub(crate) status: StatusCode,
    pub(crate) data: T,
    pub(crate) errors: FormErrors,
}

impl<T: Serialize> Page<T> {
    #[must_use]
    pub fn new(view: &'static str, data: T) -> Self {
        Self {
            view,
            status: StatusCode::OK,
            data,
            errors: FormErrors::default(),
        }
    }

    /// Re-renders a submitted form with its field errors.
    #[must_use]
    pub fn with_errors(mut self, errors: impl Into<FormErrors>) -> Self {
        self.errors = errors.into();
        self.status = StatusCode::BAD_REQUEST;
        self
    }
}

#[derive(Serialize)]
pub(crate) struct PageBody<'a, T> {
    pub view: &'static str,
    pub notices: &'a [Notice],
    pub data: &'a T,
    pub errors: &'a FormErrors,
}
