use actix_web::HttpResponse;

use crate::http::{Error, NoticeCategory, Session};

#[tracing::instrument(skip_all)]
pub async fn logout(mut session: Session) -> Result<HttpResponse, Error> {
    session.end();
    session.notice(NoticeCategory::Info, "Bye!");
    session.redirect("/login")
}
