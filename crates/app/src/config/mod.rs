//! Application configuration

use std::path::PathBuf;

use clap::Args;

use crate::config::{api::ApiConfig, cart::CartConfig, logging::LoggingConfig};

pub mod api;
pub mod cart;
pub mod logging;

pub use logging::LogFormat;

/// Settings shared by every command.
#[derive(Debug, Args)]
pub struct AppConfig {
    /// Storefront API settings.
    #[command(flatten)]
    pub api: ApiConfig,

    /// Cart session settings.
    #[command(flatten)]
    pub cart: CartConfig,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,

    /// File holding the signed-in session
    #[arg(
        long,
        env = "STOREFRONT_SESSION_FILE",
        default_value = ".storefront-session.json",
        global = true
    )]
    pub session_file: PathBuf,
}
