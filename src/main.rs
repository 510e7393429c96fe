use actix_web::{web, HttpServer};
use error_stack::{Result, ResultExt};
use feedback_board::{config, http, logging, App};
use thiserror::Error;
use tracing_actix_web::TracingLogger;

#[derive(Debug, Error)]
#[error("Failed to run the server")]
struct ServerError;

#[actix_web::main]
async fn main() -> Result<(), ServerError> {
    let config = config::Server::load().change_context(ServerError)?;
    logging::init(&config.logging).change_context(ServerError)?;

    let addr = (config.http.ip, config.http.port);
    let workers = config.http.workers.get();

    let app = App::new(config).await.change_context(ServerError)?;
    tracing::info!(?addr, workers, "starting server");

    HttpServer::new(move || {
        actix_web::App::new()
            .app_data(web::Data::new(app.clone()))
            .wrap(TracingLogger::<http::util::SessionRootSpanBuilder>::new())
            .configure(http::controllers::configure)
    })
    .workers(workers)
    .bind(addr)
    .change_context(ServerError)
    .attach_printable_lazy(|| format!("could not bind to {addr:?}"))?
    .run()
    .await
    .change_context(ServerError)
}
