pub mod figment;
pub mod sensitive;
pub mod validation;
pub mod validator;

pub use sensitive::Sensitive;
