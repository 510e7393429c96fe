use actix_web::{body::BoxBody, http::StatusCode, HttpResponse};
use error_stack::{Context, Report};
use serde_json::json;

use super::Error;
use crate::{database, types::Error as ErrorType};

impl actix_web::ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self.error_type {
            ErrorType::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorType::NotFound => StatusCode::NOT_FOUND,
            ErrorType::ReadonlyMode => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn error_response(&self) -> HttpResponse<BoxBody> {
        if self.error_type == ErrorType::Internal {
            tracing::error!(report = ?self.report, trace = %self.trace, "request failed");
        } else {
            tracing::debug!(report = ?self.report, "request ended with {}", self.error_type);
        }

        HttpResponse::build(self.status_code()).json(json!({
            "code": self.error_type,
            "message": self.error_type.message(),
        }))
    }
}

/// Any report becomes an internal error unless the database
/// refused to write somewhere down the stack.
impl<C: Context> From<Report<C>> for Error {
    fn from(value: Report<C>) -> Self {
        let readonly = matches!(
            value.downcast_ref::<database::Error>(),
            Some(database::Error::Readonly)
        );
        let error_type = if readonly {
            ErrorType::ReadonlyMode
        } else {
            ErrorType::Internal
        };
        Error::from_report(error_type, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::CreateUserError;
    use actix_web::{body::MessageBody, ResponseError};

    #[test]
    fn test_from_report() {
        let error = Error::from(Report::new(database::Error::Internal));
        assert_eq!(error.as_type(), &ErrorType::Internal);

        let report =
            Report::new(database::Error::Readonly).change_context(CreateUserError::Internal);
        let error = Error::from(report);
        assert_eq!(error.as_type(), &ErrorType::ReadonlyMode);
        assert_eq!(error.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(error.downcast_ref::<CreateUserError>().is_some());
    }

    #[test]
    fn test_response_hides_report() {
        let report = Report::new(database::Error::Internal).attach_printable("secret detail");
        let response = Error::from(report).error_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = response.into_body().try_into_bytes().unwrap_or_default();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap_or_default();
        assert_eq!(body["code"], "internal");
        assert!(!body.to_string().contains("secret detail"));
    }

    #[test]
    fn test_not_found() {
        let error = Error::not_found();
        assert_eq!(error.status_code(), StatusCode::NOT_FOUND);
    }
}
