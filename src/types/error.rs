use serde::Serialize;
use std::fmt::Display;

/// Publicly visible error of a failed request. It only carries
/// what the client is allowed to know about the failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Error {
    Internal,
    NotFound,
    ReadonlyMode,
}

impl Error {
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::Internal => "Internal server error occurred. Please try again later.",
            Self::NotFound => "The page you're looking for does not exist.",
            Self::ReadonlyMode => {
                "This site is currently in read-only mode. Please try again later."
            }
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}
