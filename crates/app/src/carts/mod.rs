//! Remote carts

mod payloads;
mod store;

pub use store::HttpCartStore;
