//! `bili-session` command-line client
//!
//! Bootstraps a bilibili session and assembles (optionally dispatches)
//! signed requests against the web API.
//!
//! # Usage
//!
//! ## Bootstrap
//! ```bash
//! bili-session bootstrap
//! ```
//!
//! ## Request
//! ```bash
//! bili-session request "https://api.bilibili.com/x/space/wbi/acc/info?mid=2" --bootstrap --send
//! bili-session request "https://api.bilibili.com/x/web-interface/nav" --no-sign -c SESSDATA=...
//! ```

use clap::{Parser, Subcommand};

use bilibili_session::cli::{
    bootstrap::{BootstrapArgs, run_bootstrap_mode},
    request::{RequestArgs, run_request_mode},
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(name = "bili-session")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(long, global = true)]
    config: Option<String>,

    /// Enable verbose logging
    #[arg(long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the landing page and print the session cookie
    Bootstrap,

    /// Assemble a request and print it, or send it with --send
    Request {
        /// Target URL
        url: String,

        /// HTTP method
        #[arg(short = 'X', long, default_value = "GET")]
        method: String,

        /// Request body
        #[arg(short, long)]
        data: Option<String>,

        /// Do not WBI-sign the URL
        #[arg(long)]
        no_sign: bool,

        /// Extra cookie as NAME=VALUE (repeatable)
        #[arg(short, long = "cookie", value_name = "NAME=VALUE")]
        cookies: Vec<String>,

        /// Bootstrap the session cookie before assembling
        #[arg(short, long)]
        bootstrap: bool,

        /// Dispatch the request and print the response
        #[arg(short, long)]
        send: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Bootstrap => {
            run_bootstrap_mode(BootstrapArgs {
                config: cli.config,
                verbose: cli.verbose,
            })
            .await
        }
        Commands::Request {
            url,
            method,
            data,
            no_sign,
            cookies,
            bootstrap,
            send,
        } => {
            run_request_mode(RequestArgs {
                url,
                method,
                data,
                no_sign,
                cookies,
                bootstrap,
                send,
                config: cli.config,
                verbose: cli.verbose,
            })
            .await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_bootstrap_subcommand() {
        let cli = Cli::parse_from(["bili-session", "bootstrap", "--verbose"]);
        assert!(matches!(cli.command, Commands::Bootstrap));
        assert!(cli.verbose);
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_request_defaults() {
        let cli = Cli::parse_from(["bili-session", "request", "https://api.bilibili.com/x"]);

        match cli.command {
            Commands::Request {
                url,
                method,
                data,
                no_sign,
                cookies,
                bootstrap,
                send,
            } => {
                assert_eq!(url, "https://api.bilibili.com/x");
                assert_eq!(method, "GET");
                assert!(data.is_none());
                assert!(!no_sign);
                assert!(cookies.is_empty());
                assert!(!bootstrap);
                assert!(!send);
            }
            _ => panic!("Expected request subcommand"),
        }
    }

    #[test]
    fn test_request_repeated_cookies() {
        let cli = Cli::parse_from([
            "bili-session",
            "request",
            "https://api.bilibili.com/x",
            "-c",
            "A=1",
            "--cookie",
            "B=2",
            "-X",
            "POST",
            "--no-sign",
            "--config",
            "/tmp/bili.toml",
        ]);

        assert_eq!(cli.config.as_deref(), Some("/tmp/bili.toml"));
        match cli.command {
            Commands::Request {
                cookies,
                method,
                no_sign,
                ..
            } => {
                assert_eq!(cookies, vec!["A=1".to_string(), "B=2".to_string()]);
                assert_eq!(method, "POST");
                assert!(no_sign);
            }
            _ => panic!("Expected request subcommand"),
        }
    }

    #[test]
    fn test_missing_subcommand_is_error() {
        assert!(Cli::try_parse_from(["bili-session"]).is_err());
    }
}
