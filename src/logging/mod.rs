use error_stack::{Result, ResultExt};
use std::io::IsTerminal;
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use tracing::Subscriber;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter, Layer};

use crate::config::{self, LoggingStyle};

mod formatter;

pub(crate) use self::formatter::Formatter;

#[derive(Debug, Error)]
#[error("Failed to initialize tracing")]
pub struct TracingInitError;

pub fn init(config: &config::Logging) -> Result<(), TracingInitError> {
    let ansi = std::io::stderr().is_terminal();
    let registry = tracing_subscriber::Registry::default()
        .with(console_layer(ansi, config.style, &config.filter))
        .with(tracing_error::ErrorLayer::default());

    tracing::subscriber::set_global_default(registry)
        .change_context(TracingInitError)
        .attach_printable("already initialized tracing")?;

    Ok(())
}

pub(crate) fn console_layer<S>(ansi: bool, style: LoggingStyle, targets: &str) -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a> + 'static,
{
    if let Some(formatter) = Formatter::from_style(style, ansi) {
        tracing_subscriber::fmt::layer()
            .with_ansi(ansi)
            .with_writer(std::io::stderr)
            .event_format(formatter)
            .with_filter(make_env_filter(targets))
            .boxed()
    } else {
        debug_assert_eq!(style, LoggingStyle::JSON);
        tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_writer(std::io::stderr)
            .with_filter(make_env_filter(targets))
            .boxed()
    }
}

fn make_env_filter(targets: &str) -> EnvFilter {
    let default_level = if cfg!(debug_assertions) {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };

    EnvFilter::builder()
        .with_default_directive(default_level.into())
        .parse_lossy(targets)
}
