use actix_web::{web, HttpResponse};
use serde::Serialize;

use crate::{
    http::{Error, Page, Session},
    schema::{Feedback, User},
};

#[derive(Debug, Serialize)]
struct UserPage {
    user: User,
    feedback: Vec<Feedback>,
}

#[tracing::instrument(skip_all, fields(target = %path))]
pub async fn show(session: Session, path: web::Path<String>) -> Result<HttpResponse, Error> {
    // The check only needs the path, whether the target exists is
    // never revealed to someone who may not see it.
    let username = match session.authorize(path.as_str()) {
        Ok(username) => username,
        Err(denied) => return session.deny(denied),
    };

    let store = session.app().store();
    let Some(user) = User::find_by_username(store, &username).await? else {
        return Err(Error::not_found());
    };
    let feedback = Feedback::list_by_owner(store, &user.username).await?;

    session.render(Page::new("user", UserPage { user, feedback }))
}
