//! Cart notices

use std::fmt::{Display, Formatter, Result as FmtResult};

use crate::{errors::CartErrorKind, products::ProductId};

/// Outcome of a settled cart mutation, for the caller to present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartNotice {
    /// A product was added
    Added(ProductId),

    /// A line quantity changed
    Updated(ProductId),

    /// A line was removed
    Removed(ProductId),

    /// The local cart view was emptied
    Cleared,

    /// A mutation failed
    Failed(CartErrorKind),
}

impl CartNotice {
    /// Whether the notice reports a failure.
    pub fn is_failure(self) -> bool {
        matches!(self, CartNotice::Failed(_))
    }

    /// User facing message.
    pub fn message(self) -> &'static str {
        match self {
            CartNotice::Added(_) => "Added to cart",
            CartNotice::Updated(_) => "Cart updated",
            CartNotice::Removed(_) => "Item removed from cart",
            CartNotice::Cleared => "Cart cleared",
            CartNotice::Failed(kind) => kind.message(),
        }
    }
}

impl Display for CartNotice {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.message())
    }
}
