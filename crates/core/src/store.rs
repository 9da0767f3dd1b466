//! Remote cart store

use std::{error::Error as StdError, time::Duration};

use async_trait::async_trait;
use mockall::automock;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{auth::UserId, products::ProductId};

/// Errors raised by a remote cart store.
#[derive(Debug, Error)]
pub enum CartStoreError {
    /// The store could not be reached or returned an unreadable body.
    #[error("cart store unavailable")]
    Unavailable(#[source] Box<dyn StdError + Send + Sync>),

    /// The store answered with a non-success status.
    #[error("cart store rejected the request with status {status}: {message}")]
    Rejected {
        /// HTTP status code
        status: u16,

        /// Server supplied message
        message: String,
    },

    /// The request did not complete within the configured timeout.
    #[error("cart store request timed out after {0:?}")]
    Timeout(Duration),
}

/// One line as persisted by the remote store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteCartLine {
    /// Product identifier
    pub product_id: ProductId,

    /// Quantity held remotely
    pub quantity: u32,
}

/// Cart of record, keyed by user.
#[automock]
#[async_trait]
pub trait CartStore: Send + Sync {
    /// Fetch every line held for `user`.
    async fn fetch_cart(&self, user: &UserId) -> Result<Vec<RemoteCartLine>, CartStoreError>;

    /// Add `quantity` to the user's line for `product`; the store accumulates.
    async fn add_item(
        &self,
        user: &UserId,
        product: ProductId,
        quantity: u32,
    ) -> Result<(), CartStoreError>;

    /// Set the absolute quantity of the user's line for `product`.
    async fn update_item(
        &self,
        user: &UserId,
        product: ProductId,
        quantity: u32,
    ) -> Result<(), CartStoreError>;

    /// Delete the user's line for `product`.
    async fn remove_item(&self, user: &UserId, product: ProductId) -> Result<(), CartStoreError>;
}
