//! Configuration management for the session client
//!
//! This module handles loading and managing configuration settings
//! for both the library defaults and the `bili-session` binary.

pub mod loader;
pub mod settings;

pub use loader::{CONFIG_ENV_VAR, ConfigLoader};
pub use settings::{
    LoggingSettings, NetworkSettings, SessionSettings, Settings, SigningSettings, SiteSettings,
};

// Serializes tests that mutate process environment variables
#[cfg(test)]
pub(crate) static ENV_TEST_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());
