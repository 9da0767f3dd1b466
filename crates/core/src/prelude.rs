//! Storefront prelude.
//!
//! Use this when wiring a cart session into an application.

pub use crate::{
    auth::{AuthSession, Identity, UserId},
    cart::{Cart, CartLine},
    catalog::{Catalog, InMemoryCatalog},
    errors::{CartError, CartErrorKind},
    notices::CartNotice,
    products::{Product, ProductId, Theme},
    session::{CartChange, CartPhase, CartSession, FailurePolicy, SessionConfig},
    store::{CartStore, CartStoreError, RemoteCartLine},
};
