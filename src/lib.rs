//! Google sign-in over the OAuth2 authorization code grant.
//!
//! [`auth::redirect`] sends the browser to Google; [`auth::CallbackExchanger`]
//! turns the callback into an [`auth::AuthResult`] or an [`auth::AuthError`].

pub mod auth;
pub mod cli;
pub mod config;
pub mod logging;
pub mod provider;
pub mod transport;

pub use auth::{AuthCallbacks, AuthError, AuthErrorCode, AuthResult, CallbackExchanger};
pub use config::{ConfigError, ConfigStore, StrategyConfig};
pub use transport::{HttpTransport, ReqwestTransport, TransportOptions};
