use actix_web::{
    cookie::{time::Duration as CookieDuration, Cookie, SameSite},
    http::header,
    web, FromRequest, HttpRequest, HttpResponse,
};
use futures::future::{ready, Ready};
use serde::Serialize;
use thiserror::Error as ThisError;

use super::{view::PageBody, Error, Notice, NoticeCategory, Page};
use crate::{
    auth::{self, Denied, Owned, SessionIdentity},
    App,
};

/// State of the client interaction carried in the session cookie.
///
/// It is extracted at the start of every handler and written back
/// into the cookie of whatever response the handler produces.
pub struct Session {
    app: web::Data<App>,
    identity: SessionIdentity,
    notices: Vec<Notice>,
}

impl Session {
    #[must_use]
    pub fn identity(&self) -> &SessionIdentity {
        &self.identity
    }

    #[must_use]
    pub fn app(&self) -> &App {
        &self.app
    }

    /// Ownership check of the resource against this session. The
    /// username is returned owned so the session can be consumed
    /// right after.
    pub fn authorize<R: Owned + ?Sized>(&self, resource: &R) -> Result<String, Denied> {
        auth::authorize(&self.identity, resource).map(ToString::to_string)
    }

    pub fn start(&mut self, username: impl Into<String>) {
        self.identity.start(username);
    }

    pub fn end(&mut self) {
        self.identity.end();
    }

    pub fn notice(
        &mut self,
        category: NoticeCategory,
        message: impl Into<std::borrow::Cow<'static, str>>,
    ) {
        self.notices.push(Notice::new(category, message));
    }

    /// Responds with `303 See Other`. Pending notices stay in the
    /// cookie until some page gets rendered.
    pub fn redirect(mut self, location: impl AsRef<str>) -> Result<HttpResponse, Error> {
        let notices = std::mem::take(&mut self.notices);
        let cookie = self.cookie(notices)?;
        Ok(HttpResponse::SeeOther()
            .insert_header((header::LOCATION, location.as_ref()))
            .cookie(cookie)
            .finish())
    }

    /// Renders the page together with every pending notice.
    pub fn render<T: Serialize>(mut self, page: Page<T>) -> Result<HttpResponse, Error> {
        let notices = std::mem::take(&mut self.notices);
        let cookie = self.cookie(Vec::new())?;
        Ok(HttpResponse::build(page.status)
            .cookie(cookie)
            .json(PageBody {
                view: page.view,
                notices: &notices,
                data: &page.data,
                errors: &page.errors,
            }))
    }

    /// Sends the caller to the login page or back to their own
    /// page, depending on why they were denied.
    pub fn deny(self, denied: Denied) -> Result<HttpResponse, Error> {
        self.deny_to(denied, "")
    }

    /// Same as [`Session::deny`] but an owner mismatch redirects to
    /// `/users/{current}{own_path}`.
    pub fn deny_to(mut self, denied: Denied, own_path: &str) -> Result<HttpResponse, Error> {
        let location = match &denied {
            Denied::Anonymous => "/login".to_string(),
            Denied::NotOwner { current } => format!("/users/{current}{own_path}"),
        };
        tracing::debug!(%location, "{denied}");

        self.notice(NoticeCategory::Danger, denied.to_string());
        self.redirect(location)
    }

    fn cookie(&self, notices: Vec<Notice>) -> Result<Cookie<'static>, Error> {
        let keys = &self.app.sessions;
        let claims = keys.claims(self.identity.current().map(ToString::to_string), notices);
        let token = keys.encode(&claims)?;

        let cfg = &self.app.config.session;
        let max_age = i64::try_from(cfg.max_age_secs.get()).unwrap_or(i64::MAX);
        Ok(Cookie::build(cfg.cookie_name.clone(), token)
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(cfg.secure_cookie)
            .max_age(CookieDuration::seconds(max_age))
            .finish())
    }

    fn extract(req: &HttpRequest) -> Result<Self, Error> {
        let Some(app) = req.app_data::<web::Data<App>>() else {
            #[derive(Debug, ThisError)]
            #[error("The web app has no available configuration")]
            struct NoConfig;
            return Err(Error::from_context(crate::types::Error::Internal, NoConfig));
        };

        let claims = req
            .cookie(&app.config.session.cookie_name)
            .and_then(|cookie| match app.sessions.decode(cookie.value()) {
                Ok(claims) => Some(claims),
                Err(error) => {
                    tracing::debug!(?error, "ignoring invalid session cookie");
                    None
                }
            });

        let (identity, notices) = match claims {
            Some(claims) => (
                claims.sub.map_or_else(SessionIdentity::anonymous, SessionIdentity::of),
                claims.notices,
            ),
            None => (SessionIdentity::anonymous(), Vec::new()),
        };

        if let Some(username) = identity.current() {
            tracing::Span::current().record("session.username", username);
        }

        Ok(Self {
            app: app.clone(),
            identity,
            notices,
        })
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("identity", &self.identity)
            .field("notices", &self.notices)
            .finish_non_exhaustive()
    }
}

impl FromRequest for Session {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        ready(Self::extract(req))
    }
}
