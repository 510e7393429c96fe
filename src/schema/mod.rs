pub mod feedback;
pub mod user;

pub use feedback::{Feedback, NewFeedback};
pub use user::{AuthenticateError, CreateUserError, DuplicateField, NewUser, User};
