use actix_web::{web, HttpResponse};

use super::{Error, Session};
use crate::types::id::FeedbackId;

pub mod feedback;
pub mod users;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(home))
        .service(
            web::resource("/register")
                .route(web::get().to(users::register_form))
                .route(web::post().to(users::register)),
        )
        .service(
            web::resource("/login")
                .route(web::get().to(users::login_form))
                .route(web::post().to(users::login)),
        )
        .route("/logout", web::post().to(users::logout))
        .route("/secret", web::get().to(users::secret))
        .service(
            web::scope("/users/{username}")
                .route("", web::get().to(users::show))
                .route("/delete", web::post().to(users::delete))
                .service(
                    web::resource("/feedback/add")
                        .route(web::get().to(feedback::add_form))
                        .route(web::post().to(feedback::add)),
                ),
        )
        .service(
            web::scope("/feedback/{id}")
                .service(
                    web::resource("/update")
                        .route(web::get().to(feedback::update_form))
                        .route(web::post().to(feedback::update)),
                )
                .route("/delete", web::post().to(feedback::delete)),
        );
}

#[tracing::instrument(skip_all)]
pub async fn home(session: Session) -> Result<HttpResponse, Error> {
    let location = match session.identity().current() {
        Some(username) => own_page(username),
        None => "/register".to_string(),
    };
    session.redirect(location)
}

pub(crate) fn own_page(username: &str) -> String {
    format!("/users/{username}")
}

/// Ids that are not positive integers cannot exist.
pub(crate) fn parse_id(value: &str) -> Result<FeedbackId, Error> {
    value
        .parse::<u64>()
        .ok()
        .and_then(FeedbackId::new_checked)
        .ok_or_else(Error::not_found)
}
