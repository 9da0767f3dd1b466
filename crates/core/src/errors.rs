//! Cart errors

use std::fmt::{Display, Formatter, Result as FmtResult};

use thiserror::Error;

use crate::store::CartStoreError;

/// Errors returned by cart session operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// A mutation was attempted with nobody signed in.
    #[error("sign in to use the cart")]
    Unauthenticated,

    /// Quantities must be at least one.
    #[error("invalid quantity {0}; quantities must be at least 1")]
    InvalidQuantity(u32),

    /// Loading the remote cart failed.
    #[error("failed to load cart data")]
    FetchFailed(#[source] CartStoreError),

    /// The remote add call failed.
    #[error("failed to add item to cart")]
    AddFailed(#[source] CartStoreError),

    /// The remote update call failed.
    #[error("failed to update item quantity")]
    UpdateFailed(#[source] CartStoreError),

    /// The remote remove call failed.
    #[error("failed to remove item from cart")]
    RemoveFailed(#[source] CartStoreError),
}

impl CartError {
    /// The error's kind, as recorded in the session's last error.
    pub fn kind(&self) -> CartErrorKind {
        match self {
            CartError::Unauthenticated => CartErrorKind::Unauthenticated,
            CartError::InvalidQuantity(_) => CartErrorKind::InvalidQuantity,
            CartError::FetchFailed(_) => CartErrorKind::FetchFailed,
            CartError::AddFailed(_) => CartErrorKind::AddFailed,
            CartError::UpdateFailed(_) => CartErrorKind::UpdateFailed,
            CartError::RemoveFailed(_) => CartErrorKind::RemoveFailed,
        }
    }
}

/// Copyable classification of a [`CartError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CartErrorKind {
    /// Nobody signed in
    Unauthenticated,

    /// Quantity below one
    InvalidQuantity,

    /// Hydration failed
    FetchFailed,

    /// Remote add failed
    AddFailed,

    /// Remote update failed
    UpdateFailed,

    /// Remote remove failed
    RemoveFailed,
}

impl CartErrorKind {
    /// User facing message.
    pub const fn message(self) -> &'static str {
        match self {
            CartErrorKind::Unauthenticated => "Please sign in to use the cart",
            CartErrorKind::InvalidQuantity => "Quantity must be at least 1",
            CartErrorKind::FetchFailed => "Failed to load cart data",
            CartErrorKind::AddFailed => "Failed to add item to cart",
            CartErrorKind::UpdateFailed => "Failed to update item quantity",
            CartErrorKind::RemoveFailed => "Failed to remove item",
        }
    }
}

impl Display for CartErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.message())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn kind_matches_variant() {
        let error = CartError::AddFailed(CartStoreError::Timeout(Duration::from_secs(1)));

        assert_eq!(error.kind(), CartErrorKind::AddFailed);
        assert_eq!(CartError::InvalidQuantity(0).kind(), CartErrorKind::InvalidQuantity);
    }

    #[test]
    fn store_error_is_exposed_as_source() {
        let error = CartError::FetchFailed(CartStoreError::Rejected {
            status: 500,
            message: "boom".to_string(),
        });

        let source = std::error::Error::source(&error).map(ToString::to_string);

        assert_eq!(
            source.as_deref(),
            Some("cart store rejected the request with status 500: boom")
        );
    }
}
