use std::path::Path;

use anyhow::{Context, Result};
use tiny_http::Server;

use super::server::{self, Host};
use crate::auth;
use crate::config::{ConfigStore, StrategyConfig};
use crate::transport::ReqwestTransport;

pub const DEFAULT_BIND: &str = "127.0.0.1:8484";
pub const DEFAULT_STRATEGY_URL: &str = "http://localhost:8484/google/";

fn load_config(config_path: Option<&Path>, strategy_url: &str) -> Result<StrategyConfig> {
    let store = match config_path {
        Some(path) => ConfigStore::at(path),
        None => ConfigStore::new()?,
    };

    store
        .load(strategy_url)
        .with_context(|| format!("Failed to load config from {}", store.path().display()))
}

pub fn cmd_authorize_url(config_path: Option<&Path>, strategy_url: Option<&str>) -> Result<()> {
    let strategy_url = strategy_url.unwrap_or(DEFAULT_STRATEGY_URL);
    let config = load_config(config_path, strategy_url)?;

    let url = auth::build_authorization_url(&config)?;
    println!("{}", url);

    Ok(())
}

pub fn cmd_serve(
    config_path: Option<&Path>,
    bind: &str,
    strategy_url: Option<&str>,
    once: bool,
) -> Result<()> {
    let strategy_url = strategy_url
        .map(str::to_string)
        .unwrap_or_else(|| format!("http://{}/google/", bind));
    let config = load_config(config_path, &strategy_url)?;

    let transport = ReqwestTransport::new();
    let host = Host::new(&config, &transport, &strategy_url)?;

    let listener = Server::http(bind)
        .map_err(|e| anyhow::anyhow!("Failed to start server on {}: {}", bind, e))?;

    tracing::info!(
        bind,
        sign_in = %strategy_url,
        callback = %config.redirect_uri(),
        "serving Google sign-in"
    );
    eprintln!("Open {} in a browser to sign in.", strategy_url);

    server::run(&listener, &host, once)
}
