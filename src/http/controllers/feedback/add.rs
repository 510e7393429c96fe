use actix_web::{web, HttpResponse};
use validator::Validate;

use super::VIEW;
use crate::{
    database,
    http::{controllers::own_page, Error, NoticeCategory, Page, Session},
    schema::Feedback,
    types::FeedbackInput,
};

const OWN_PATH: &str = "/feedback/add";

#[tracing::instrument(skip_all, fields(target = %path))]
pub async fn add_form(session: Session, path: web::Path<String>) -> Result<HttpResponse, Error> {
    if let Err(denied) = session.authorize(path.as_str()) {
        return session.deny_to(denied, OWN_PATH);
    }
    session.render(Page::new(VIEW, FeedbackInput::default()))
}

/// A missing or unreadable form is treated as an empty one so the
/// caller is authorized before anything else.
#[tracing::instrument(skip_all, fields(target = %path))]
pub async fn add(
    mut session: Session,
    path: web::Path<String>,
    form: Option<web::Form<FeedbackInput>>,
) -> Result<HttpResponse, Error> {
    let username = match session.authorize(path.as_str()) {
        Ok(username) => username,
        Err(denied) => return session.deny_to(denied, OWN_PATH),
    };

    let input = form.map(web::Form::into_inner).unwrap_or_default();
    if let Err(errors) = input.validate() {
        return session.render(Page::new(VIEW, input).with_errors(errors));
    }

    let feedback = match Feedback::create(session.app().store(), &username, &input).await {
        Ok(feedback) => feedback,
        // the session outlived its account
        Err(report) if matches!(report.current_context(), database::Error::MissingReference) => {
            return Err(Error::from_report(crate::types::Error::NotFound, report));
        }
        Err(report) => return Err(report.into()),
    };
    tracing::info!(id = %feedback.id, "created feedback");

    session.notice(NoticeCategory::Success, "Feedback Created!");
    session.redirect(own_page(&feedback.username))
}
