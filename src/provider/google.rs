pub const AUTH_URL: &str = "https://accounts.google.com/o/oauth2/auth";
pub const TOKEN_URL: &str = "https://accounts.google.com/o/oauth2/token";
pub const USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v1/userinfo";

pub const SCOPE_PROFILE: &str = "https://www.googleapis.com/auth/userinfo.profile";
pub const SCOPE_EMAIL: &str = "https://www.googleapis.com/auth/userinfo.email";

/// Appended to the strategy URL to form the default `redirect_uri`.
pub const CALLBACK_PATH: &str = "oauth2callback";

/// Config keys passed through to the authorization request when non-empty,
/// in the order they are applied.
pub const OPTIONAL_KEYS: &[&str] = &[
    "redirect_uri",
    "scope",
    "state",
    "access_type",
    "approval_prompt",
];

/// Google user-info field -> dotted path in the auth result envelope.
pub const PROFILE_MAPPING: &[(&str, &str)] = &[
    ("name", "info.name"),
    ("email", "info.email"),
    ("given_name", "info.first_name"),
    ("family_name", "info.last_name"),
    ("picture", "info.image"),
];

pub fn default_scope() -> String {
    format!("{} {}", SCOPE_PROFILE, SCOPE_EMAIL)
}
