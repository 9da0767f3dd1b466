//! API Config

use std::time::Duration;

use clap::Args;

/// Storefront API connection settings.
#[derive(Debug, Args)]
pub struct ApiConfig {
    /// Storefront API base URL
    #[arg(
        long,
        env = "STOREFRONT_API_URL",
        default_value = "http://localhost:3000",
        global = true
    )]
    pub api_url: String,

    /// Upper bound on each API request, in seconds
    #[arg(
        long,
        env = "STOREFRONT_REQUEST_TIMEOUT_SECONDS",
        default_value_t = 10_u64,
        global = true
    )]
    pub request_timeout_seconds: u64,
}

impl ApiConfig {
    /// Request timeout as a [`Duration`].
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}
