mod add;
mod delete;
mod update;

pub use add::{add, add_form};
pub use delete::delete;
pub use update::{update, update_form};

const VIEW: &str = "feedback";
