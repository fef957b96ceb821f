pub mod callback;
pub mod profile;
pub mod request;
pub mod types;

pub use callback::CallbackExchanger;
pub use request::{build_authorization_url, redirect, Redirect};
pub use types::{AuthError, AuthErrorCode, AuthResult, CallbackQuery, Credentials};

/// The host's exit points. Exactly one is called per callback.
pub trait AuthCallbacks {
    fn on_success(&mut self, result: AuthResult);
    fn on_error(&mut self, error: AuthError);
}
