pub mod controllers;
pub mod error;
pub mod jwt;
pub mod session;
pub mod util;
pub mod view;

pub use error::Error;
pub use jwt::{SessionClaims, SessionKeys};
pub use session::Session;
pub use view::{Notice, NoticeCategory, Page};
