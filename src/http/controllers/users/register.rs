use actix_web::{web, HttpResponse};
use serde_json::json;
use validator::Validate;

use crate::{
    http::{controllers::own_page, Error, NoticeCategory, Page, Session},
    schema::{CreateUserError, DuplicateField, User},
    types::{form::FormErrors, RegisterInput},
};

const VIEW: &str = "register";

#[tracing::instrument(skip_all)]
pub async fn register_form(session: Session) -> Result<HttpResponse, Error> {
    session.render(Page::new(VIEW, ()))
}

#[tracing::instrument(skip_all, fields(username = tracing::field::Empty))]
pub async fn register(
    mut session: Session,
    form: Option<web::Form<RegisterInput>>,
) -> Result<HttpResponse, Error> {
    let input = form.map(web::Form::into_inner).unwrap_or_default();
    tracing::Span::current().record("username", input.username.as_str());
    // everything except the password goes back into the form
    let echo = json!({
        "username": input.username,
        "email": input.email,
        "first_name": input.first_name,
        "last_name": input.last_name,
    });

    if let Err(errors) = input.validate() {
        return session.render(Page::new(VIEW, echo).with_errors(errors));
    }

    let user = match User::register(session.app().store(), &input).await {
        Ok(user) => user,
        Err(report) => {
            let errors = match report.current_context() {
                CreateUserError::Duplicate(DuplicateField::Username) => {
                    FormErrors::single("username", "Username taken. Please pick another")
                }
                CreateUserError::Duplicate(DuplicateField::Email) => {
                    FormErrors::single("email", "Email is already registered. Please pick another")
                }
                CreateUserError::Internal => return Err(report.into()),
            };
            return session.render(Page::new(VIEW, echo).with_errors(errors));
        }
    };

    tracing::info!("registered a new user");
    session.start(&user.username);
    session.notice(
        NoticeCategory::Success,
        "Welcome! Successfully Created Your Account!",
    );
    session.redirect(own_page(&user.username))
}
