use actix_web::{web, HttpResponse};
use serde_json::json;
use validator::Validate;

use crate::{
    http::{controllers::own_page, Error, NoticeCategory, Page, Session},
    schema::User,
    types::{form::FormErrors, LoginInput},
};

const VIEW: &str = "login";

#[tracing::instrument(skip_all)]
pub async fn login_form(session: Session) -> Result<HttpResponse, Error> {
    session.render(Page::new(VIEW, ()))
}

#[tracing::instrument(skip_all, fields(username = tracing::field::Empty))]
pub async fn login(
    mut session: Session,
    form: Option<web::Form<LoginInput>>,
) -> Result<HttpResponse, Error> {
    let input = form.map(web::Form::into_inner).unwrap_or_default();
    tracing::Span::current().record("username", input.username.as_str());
    let echo = json!({ "username": input.username });

    if let Err(errors) = input.validate() {
        return session.render(Page::new(VIEW, echo).with_errors(errors));
    }

    let store = session.app().store();
    let user = User::authenticate(store, &input.username, &input.password).await?;
    let Some(user) = user else {
        // The same message for unknown users and wrong passwords.
        let errors = FormErrors::single("username", "Invalid username/password.");
        return session.render(Page::new(VIEW, echo).with_errors(errors));
    };

    session.start(&user.username);
    session.notice(
        NoticeCategory::Success,
        format!("Welcome back, {}!", user.username),
    );
    session.redirect(own_page(&user.username))
}
