//! Storefront
//!
//! Session-scoped shopping cart reconciliation: a local cart view kept
//! consistent with a remote cart of record across sign-in, sign-out,
//! concurrent mutations and network failure.

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod errors;
pub mod notices;
pub mod prelude;
pub mod products;
pub mod session;
pub mod store;
pub mod summary;
