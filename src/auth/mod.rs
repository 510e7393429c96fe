pub mod gate;
pub mod password;
pub mod session;

pub use gate::{authorize, Access, Denied, Owned};
pub use session::SessionIdentity;
