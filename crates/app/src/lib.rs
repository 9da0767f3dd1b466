//! Storefront adapters: HTTP API client, remote cart store, authentication,
//! saved sessions, configuration and logging.

pub mod api;
pub mod auth;
pub mod carts;
pub mod config;
pub mod context;
pub mod observability;
pub mod session_file;
