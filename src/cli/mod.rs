//! Command-line interface modules
//!
//! Contains the logic behind the `bili-session` subcommands.

pub mod bootstrap;
pub mod request;

use std::path::Path;

use anyhow::Result;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::{BiliClient, ClientOptions, ConfigLoader, Cookie, Settings};

/// Initialize stderr logging; `RUST_LOG` wins over `level`
pub fn init_logging(verbose: bool, level: &str) {
    let default_level = if verbose { "debug" } else { level };
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_level.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

/// Load settings from `--config`, `BILI_SESSION_CONFIG` or the default path
pub fn load_settings(config: Option<&str>) -> Result<Settings> {
    let loader = ConfigLoader::new();
    let path = match config {
        Some(path) => Some(Path::new(path).to_path_buf()),
        None => ConfigLoader::get_config_path(),
    };
    Ok(loader.load(path.as_deref())?)
}

/// Build a client from settings plus extra cookies, cancelled on Ctrl-C
pub fn build_client(settings: &Settings, extra_cookies: Vec<Cookie>) -> Result<BiliClient> {
    let options = ClientOptions::from_settings(settings)?;

    let token = options.cancellation.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            debug!("interrupt received, cancelling session");
            token.cancel();
        }
    });

    let mut cookies = settings.session.cookies.clone();
    cookies.extend(extra_cookies);
    Ok(BiliClient::new(cookies, options))
}
