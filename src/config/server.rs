use error_stack::{Report, Result, ResultExt};
use serde::Deserialize;
use validator::Validate;

use super::ParseError;
use crate::util::{figment::FigmentErrorAttachable, validator::IntoValidatorReport};

#[derive(Debug, Deserialize, Validate)]
pub struct Server {
    #[validate(nested)]
    pub db: super::Database,
    #[validate(nested)]
    pub session: super::Session,
    #[serde(default)]
    pub http: super::Http,
    #[serde(default)]
    pub logging: super::Logging,
}

impl Server {
    pub fn load() -> Result<Self, ParseError> {
        dotenvy::dotenv().ok();

        let config = Self::figment()
            .extract::<Self>()
            .map_err(|e| Report::new(ParseError).attach_figment_error(e))?;

        config
            .validate()
            .into_validator_report()
            .change_context(ParseError)?;

        Ok(config)
    }

    /// Server configuration with every optional field set to its
    /// default. Nothing is read from the environment.
    #[must_use]
    pub fn for_tests() -> Self {
        Self {
            db: super::Database::new("postgres://localhost/feedback"),
            session: super::Session::new("a-very-secret-testing-key"),
            http: super::Http::default(),
            logging: super::Logging::default(),
        }
    }
}

impl Server {
    const DEFAULT_CONFIG_FILE: &'static str = "feedback.toml";

    /// Creates a default [`Figment`] object to load server
    /// configuration. This function is there for implementing
    /// [`Server::load`] and testing.
    ///
    /// [`Figment`]: figment::Figment
    pub(crate) fn figment() -> figment::Figment {
        use figment::{
            providers::{Env, Format, Toml},
            Figment,
        };

        Figment::new()
            .merge(Toml::file(Self::DEFAULT_CONFIG_FILE))
            // Environment variable aliases used by older deployments
            .merge(
                Env::raw()
                    .only(&["DATABASE_URL", "SECRET_KEY"])
                    .map(|v| match v.as_str().to_ascii_uppercase().as_str() {
                        "DATABASE_URL" => "db.url".into(),
                        _ => "session.secret".into(),
                    }),
            )
            // Section names never contain underscores so only the first
            // one separates the section from the key.
            .merge(
                Env::prefixed("FEEDBACK_")
                    .map(|v| v.as_str().to_ascii_lowercase().replacen('_', ".", 1).into()),
            )
    }
}
