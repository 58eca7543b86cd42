//! Request mode
//!
//! Assembles a request and either prints it or dispatches it.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use reqwest::Body;
use serde::Serialize;
use tracing::{debug, warn};

use super::{build_client, init_logging, load_settings};
use crate::{AssembledRequest, Cookie, RequestOptions};

/// Arguments for request mode
#[derive(Debug)]
pub struct RequestArgs {
    pub url: String,
    pub method: String,
    pub data: Option<String>,
    pub no_sign: bool,
    pub cookies: Vec<String>,
    pub bootstrap: bool,
    pub send: bool,
    pub config: Option<String>,
    pub verbose: bool,
}

/// Printed form of an assembled request
#[derive(Debug, Serialize)]
pub struct RequestSummary {
    pub method: String,
    pub url: String,
    pub headers: BTreeMap<String, String>,
}

impl From<&AssembledRequest> for RequestSummary {
    fn from(request: &AssembledRequest) -> Self {
        let headers = request
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();

        Self {
            method: request.method().to_string(),
            url: request.url().to_string(),
            headers,
        }
    }
}

/// Printed form of a dispatched request's response
#[derive(Debug, Serialize)]
struct ResponseSummary {
    status: u16,
    body: String,
}

/// Run request mode with the given arguments
pub async fn run_request_mode(args: RequestArgs) -> Result<()> {
    let settings = load_settings(args.config.as_deref())?;
    init_logging(args.verbose || settings.logging.verbose, &settings.logging.level);

    let cookies = parse_cookies(&args.cookies)?;
    let client = build_client(&settings, cookies)?;

    if args.bootstrap {
        // Proceed without the session cookie; the vendor may still answer.
        if let Err(e) = client.bootstrap().await {
            warn!("Session bootstrap failed: {}", e);
        }
    }

    let options = RequestOptions::new().with_sign(!args.no_sign);
    let request = client.build_request(
        &args.method,
        &args.url,
        args.data.map(Body::from),
        options,
    )?;

    if !args.send {
        println!("{}", serde_json::to_string(&RequestSummary::from(&request))?);
        return Ok(());
    }

    debug!(url = %request.url(), "dispatching request");
    let response = client.execute(request).await?;
    let status = response.status().as_u16();
    let body = response
        .text()
        .await
        .context("Failed to read response body")?;

    println!("{}", serde_json::to_string(&ResponseSummary { status, body })?);
    Ok(())
}

fn parse_cookies(raw: &[String]) -> Result<Vec<Cookie>> {
    raw.iter()
        .map(|s| s.parse::<Cookie>().map_err(anyhow::Error::from))
        .collect()
}
