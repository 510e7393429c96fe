use actix_web::{web, HttpResponse};

use crate::{
    http::{
        controllers::{own_page, parse_id},
        Error, NoticeCategory, Session,
    },
    schema::Feedback,
};

#[tracing::instrument(skip_all, fields(id = %path))]
pub async fn delete(mut session: Session, path: web::Path<String>) -> Result<HttpResponse, Error> {
    let id = parse_id(&path)?;
    let Some(feedback) = Feedback::find_by_id(session.app().store(), id).await? else {
        return Err(Error::not_found());
    };

    if let Err(denied) = session.authorize(&feedback) {
        return session.deny(denied);
    }

    // deleted in the meantime, the outcome is the same
    feedback.delete(session.app().store()).await?;

    session.notice(NoticeCategory::Success, "Feedback deleted");
    session.redirect(own_page(&feedback.username))
}
