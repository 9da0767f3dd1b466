//! Cart Config

use std::path::PathBuf;

use clap::{Args, ValueEnum};
use storefront::prelude::{FailurePolicy, SessionConfig};

use crate::config::api::ApiConfig;

/// Handling of optimistic changes whose remote call failed.
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum FailurePolicyArg {
    /// Restore the line as it was.
    #[default]
    Rollback,

    /// Keep the local change until the next hydration.
    KeepOptimistic,
}

impl From<FailurePolicyArg> for FailurePolicy {
    fn from(arg: FailurePolicyArg) -> Self {
        match arg {
            FailurePolicyArg::Rollback => FailurePolicy::Rollback,
            FailurePolicyArg::KeepOptimistic => FailurePolicy::KeepOptimistic,
        }
    }
}

/// Cart session settings.
#[derive(Debug, Args)]
pub struct CartConfig {
    /// Product catalog YAML file
    #[arg(
        long,
        env = "STOREFRONT_CATALOG",
        default_value = "data/catalog.yaml",
        global = true
    )]
    pub catalog: PathBuf,

    /// Failure policy (rollback, keep-optimistic)
    #[arg(
        long,
        env = "STOREFRONT_FAILURE_POLICY",
        value_enum,
        default_value_t = FailurePolicyArg::Rollback,
        global = true
    )]
    pub failure_policy: FailurePolicyArg,
}

impl CartConfig {
    /// Session settings using the API request timeout.
    #[must_use]
    pub fn session_config(&self, api: &ApiConfig) -> SessionConfig {
        SessionConfig {
            request_timeout: api.request_timeout(),
            failure_policy: self.failure_policy.into(),
        }
    }
}
