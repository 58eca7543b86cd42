//! Bootstrap mode
//!
//! Fetches the landing page once and prints the derived session cookie.

use anyhow::Result;
use tracing::info;

use super::{build_client, init_logging, load_settings};

/// Arguments for bootstrap mode
#[derive(Debug)]
pub struct BootstrapArgs {
    pub config: Option<String>,
    pub verbose: bool,
}

/// Run bootstrap mode with the given arguments
pub async fn run_bootstrap_mode(args: BootstrapArgs) -> Result<()> {
    let settings = load_settings(args.config.as_deref())?;
    init_logging(args.verbose || settings.logging.verbose, &settings.logging.level);

    let client = build_client(&settings, Vec::new())?;
    let cookie = client.bootstrap().await?;

    info!(name = %cookie.name, "session cookie acquired");
    println!("{}", serde_json::to_string(&cookie)?);

    Ok(())
}
