use serde::{Deserialize, Serialize};

/// Who is behind the current client interaction, if anyone.
///
/// It only remembers the username. Handlers look the user up
/// whenever they actually need the record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct SessionIdentity {
    username: Option<String>,
}

impl SessionIdentity {
    #[must_use]
    pub const fn anonymous() -> Self {
        Self { username: None }
    }

    #[must_use]
    pub fn of(username: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
        }
    }

    /// Binds the interaction to the user. Called after a successful
    /// login or registration.
    pub fn start(&mut self, username: impl Into<String>) {
        self.username = Some(username.into());
    }

    #[must_use]
    pub fn current(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// Clears the binding. Ending an anonymous session does nothing.
    pub fn end(&mut self) {
        self.username = None;
    }
}
