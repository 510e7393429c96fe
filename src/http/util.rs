use actix_web::{
    body::MessageBody,
    dev::{ServiceRequest, ServiceResponse},
    Error,
};
use tracing::Span;
use tracing_actix_web::{root_span, DefaultRootSpanBuilder, RootSpanBuilder};

/// Root span of every request with room for the username of
/// the session, recorded once the session cookie is read.
pub struct SessionRootSpanBuilder;

impl RootSpanBuilder for SessionRootSpanBuilder {
    fn on_request_start(request: &ServiceRequest) -> Span {
        root_span!(request, session.username = tracing::field::Empty)
    }

    fn on_request_end<B: MessageBody>(span: Span, outcome: &Result<ServiceResponse<B>, Error>) {
        DefaultRootSpanBuilder::on_request_end(span, outcome);
    }
}
