use thiserror::Error;

mod database;
mod http;
mod logging;
mod server;
mod session;

pub use database::Database;
pub use http::Http;
pub use logging::{InvalidLoggingStyle, Logging, LoggingStyle};
pub use server::Server;
pub use session::Session;

#[derive(Debug, Error)]
#[error("Failed to load configuration")]
pub struct ParseError;
