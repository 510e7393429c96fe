mod delete;
mod login;
mod logout;
mod profile;
mod register;
mod secret;

pub use delete::delete;
pub use login::{login, login_form};
pub use logout::logout;
pub use profile::show;
pub use register::{register, register_form};
pub use secret::secret;
