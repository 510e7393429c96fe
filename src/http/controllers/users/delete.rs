use actix_web::{web, HttpResponse};

use crate::{
    http::{Error, NoticeCategory, Session},
    schema::User,
};

#[tracing::instrument(skip_all, fields(target = %path))]
pub async fn delete(mut session: Session, path: web::Path<String>) -> Result<HttpResponse, Error> {
    let username = match session.authorize(path.as_str()) {
        Ok(username) => username,
        Err(denied) => return session.deny(denied),
    };

    let store = session.app().store();
    let Some(user) = User::find_by_username(store, &username).await? else {
        return Err(Error::not_found());
    };
    user.delete(store).await?;
    tracing::info!("deleted user with their feedback");

    session.end();
    session.notice(NoticeCategory::Success, "Your account has been deleted");
    session.redirect("/")
}
