use once_cell::sync::Lazy;
use regex::Regex;

pub const USERNAME_MAX: u64 = 20;
pub const EMAIL_MAX: u64 = 50;
pub const NAME_MAX: u64 = 50;
pub const FEEDBACK_TITLE_MAX: u64 = 100;

// Usernames end up in URL paths like `/users/{username}`,
// so anything that needs escaping is rejected up front. The first
// character cannot be a dot or `.` and `..` would be path segments.
static USERNAME_REGEX: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"^[A-Za-z0-9_][A-Za-z0-9_.\-]*$").unwrap()
});

pub fn is_valid_username(name: &str) -> bool {
    USERNAME_REGEX.is_match(name) && name.chars().count() as u64 <= USERNAME_MAX
}
