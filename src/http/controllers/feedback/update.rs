use actix_web::{web, HttpResponse};
use validator::Validate;

use super::VIEW;
use crate::{
    http::{
        controllers::{own_page, parse_id},
        Error, NoticeCategory, Page, Session,
    },
    schema::Feedback,
    types::FeedbackInput,
};

#[tracing::instrument(skip_all, fields(id = %path))]
pub async fn update_form(session: Session, path: web::Path<String>) -> Result<HttpResponse, Error> {
    let id = parse_id(&path)?;
    let Some(feedback) = Feedback::find_by_id(session.app().store(), id).await? else {
        return Err(Error::not_found());
    };

    if let Err(denied) = session.authorize(&feedback) {
        return session.deny(denied);
    }

    let prefilled = FeedbackInput {
        title: feedback.title,
        content: feedback.content,
    };
    session.render(Page::new(VIEW, prefilled))
}

/// The owner is checked before the submitted form is even looked at.
/// A missing or unreadable form is treated as an empty one.
#[tracing::instrument(skip_all, fields(id = %path))]
pub async fn update(
    mut session: Session,
    path: web::Path<String>,
    form: Option<web::Form<FeedbackInput>>,
) -> Result<HttpResponse, Error> {
    let id = parse_id(&path)?;
    let Some(mut feedback) = Feedback::find_by_id(session.app().store(), id).await? else {
        return Err(Error::not_found());
    };

    if let Err(denied) = session.authorize(&feedback) {
        return session.deny(denied);
    }

    let input = form.map(web::Form::into_inner).unwrap_or_default();
    if let Err(errors) = input.validate() {
        return session.render(Page::new(VIEW, input).with_errors(errors));
    }

    if !feedback.update(session.app().store(), &input).await? {
        return Err(Error::not_found());
    }

    session.notice(NoticeCategory::Success, "Feedback is updated");
    session.redirect(own_page(&feedback.username))
}
