use actix_web::HttpResponse;

use crate::{
    auth::Denied,
    http::{Error, Page, Session},
};

#[tracing::instrument(skip_all)]
pub async fn secret(session: Session) -> Result<HttpResponse, Error> {
    if session.identity().current().is_none() {
        return session.deny(Denied::Anonymous);
    }
    session.render(Page::new("secret", ()))
}
