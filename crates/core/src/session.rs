//! Cart session
//!
//! [`CartSession`] owns the signed-in user's cart view and keeps it in line with
//! the remote cart of record. Every hydration and mutation passes through a
//! fair per-cart queue, so at most one remote call is in flight and calls reach
//! the store in the order they were made. Mutations are applied locally before
//! the remote call and settled afterwards according to the [`FailurePolicy`].

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    future::Future,
    sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
    time::Duration,
};

use jiff::Timestamp;
use rusty_money::{Money, iso::Currency};
use tokio::{
    sync::{Mutex, broadcast},
    task::JoinHandle,
};
use tracing::{debug, info, warn};

use crate::{
    auth::{AuthSession, Identity, UserId},
    cart::{Cart, CartLine},
    catalog::Catalog,
    errors::{CartError, CartErrorKind},
    notices::CartNotice,
    products::ProductId,
    store::{CartStore, CartStoreError, RemoteCartLine},
};

const NOTICE_CAPACITY: usize = 32;

/// What happens to an optimistic local change when its remote call fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Restore the line as it was before the mutation.
    #[default]
    Rollback,

    /// Keep the local change; the next hydration reconciles it.
    KeepOptimistic,
}

/// Session tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Upper bound on each remote call.
    pub request_timeout: Duration,

    /// Handling of failed optimistic mutations.
    pub failure_policy: FailurePolicy,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(10),
            failure_policy: FailurePolicy::default(),
        }
    }
}

/// Lifecycle phase of the cart view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartPhase {
    /// Signed out, or nothing loaded yet.
    Empty,

    /// Loading the remote cart.
    Hydrating,

    /// Loaded and idle.
    Ready,

    /// A mutation's remote call is in flight.
    Mutating,
}

/// Whether an operation changed the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartChange {
    /// The cart changed and the change settled.
    Applied,

    /// Nothing to do; no remote call was made.
    Unchanged,
}

#[derive(Debug)]
struct SessionState {
    identity: Option<Identity>,
    epoch: u64,
    cart: Cart,
    phase: CartPhase,
    last_error: Option<CartErrorKind>,
    last_synced_at: Option<Timestamp>,
}

impl SessionState {
    fn signed_out(&mut self) {
        self.identity = None;
        self.epoch = self.epoch.wrapping_add(1);
        self.cart.clear();
        self.phase = CartPhase::Empty;
        self.last_error = None;
        self.last_synced_at = None;
    }
}

/// Identity and epoch captured when an operation leaves the queue.
#[derive(Debug)]
struct Ticket {
    epoch: u64,
    user: UserId,
}

/// Operation awaiting its remote call.
///
/// Dropping it before [`Pending::disarm`] means the caller cancelled the
/// operation: the session leaves its syncing phase and, under
/// [`FailurePolicy::Rollback`], undoes the optimistic change.
struct Pending<'a, R: FnOnce(&mut Cart)> {
    session: &'a CartSession,
    epoch: u64,
    kind: CartErrorKind,
    rollback: Option<R>,
}

impl<'a, R: FnOnce(&mut Cart)> Pending<'a, R> {
    fn new(session: &'a CartSession, ticket: &Ticket, kind: CartErrorKind, rollback: R) -> Self {
        Self {
            session,
            epoch: ticket.epoch,
            kind,
            rollback: Some(rollback),
        }
    }

    fn disarm(mut self) -> Option<R> {
        self.rollback.take()
    }
}

impl<R: FnOnce(&mut Cart)> Drop for Pending<'_, R> {
    fn drop(&mut self) {
        if let Some(rollback) = self.rollback.take() {
            self.session.abandon(self.epoch, self.kind, rollback);
        }
    }
}

/// Cart reconciliation service for one client session.
pub struct CartSession {
    store: Arc<dyn CartStore>,
    catalog: Arc<dyn Catalog>,
    config: SessionConfig,
    state: RwLock<SessionState>,
    queue: Mutex<()>,
    notices: broadcast::Sender<CartNotice>,
}

impl Debug for CartSession {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("CartSession")
            .field("config", &self.config)
            .field("state", &*self.read())
            .finish_non_exhaustive()
    }
}

impl CartSession {
    /// Create a signed-out session.
    pub fn new(
        store: Arc<dyn CartStore>,
        catalog: Arc<dyn Catalog>,
        config: SessionConfig,
    ) -> Self {
        let (notices, _receiver) = broadcast::channel(NOTICE_CAPACITY);

        Self {
            store,
            catalog,
            config,
            state: RwLock::new(SessionState {
                identity: None,
                epoch: 0,
                cart: Cart::new(),
                phase: CartPhase::Empty,
                last_error: None,
                last_synced_at: None,
            }),
            queue: Mutex::new(()),
            notices,
        }
    }

    /// Apply every identity transition published by `auth`, starting with the
    /// current one. Sign-outs clear the cart at once; sign-ins hydrate in the
    /// background. The task ends when `auth` is dropped.
    pub fn follow(self: &Arc<Self>, auth: &AuthSession) -> JoinHandle<()> {
        let session = Arc::clone(self);
        let mut identities = auth.subscribe();

        tokio::spawn(async move {
            loop {
                let identity = identities.borrow_and_update().clone();

                match identity {
                    None => session.sign_out(),
                    Some(identity) => {
                        session.switch_identity(identity);

                        let session = Arc::clone(&session);

                        tokio::spawn(async move {
                            if let Err(error) = session.hydrate().await {
                                warn!(%error, "failed to hydrate cart after sign-in");
                            }
                        });
                    }
                }

                if identities.changed().await.is_err() {
                    debug!("auth session dropped; no longer following identity changes");
                    break;
                }
            }
        })
    }

    /// Switch to `identity` (or sign out) and hydrate.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::FetchFailed`] when the remote cart cannot be loaded.
    pub async fn set_identity(&self, identity: Option<Identity>) -> Result<(), CartError> {
        match identity {
            None => {
                self.sign_out();

                Ok(())
            }
            Some(identity) => {
                self.switch_identity(identity);

                self.hydrate().await
            }
        }
    }

    /// Forget the current user and empty the cart immediately, without any
    /// remote call. In-flight operations settle without touching the new state.
    pub fn sign_out(&self) {
        self.write().signed_out();

        debug!("cart cleared on sign-out");
    }

    fn switch_identity(&self, identity: Identity) {
        let mut state = self.write();

        if state.identity.as_ref() == Some(&identity) {
            return;
        }

        let had_user = state.identity.is_some();

        state.signed_out();
        state.identity = Some(identity);

        if had_user {
            debug!("cart cleared on identity switch");
        }
    }

    /// Replace the cart with the remote cart of the current user.
    ///
    /// Without a user the cart is emptied and no remote call is made. On failure
    /// the previous lines are kept.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::FetchFailed`] when the fetch fails or times out.
    pub async fn hydrate(&self) -> Result<(), CartError> {
        if self.read().identity.is_none() {
            self.sign_out();

            return Ok(());
        }

        let _queue = self.queue.lock().await;

        let ticket = {
            let mut state = self.write();

            let Some(user) = state.identity.as_ref().map(|identity| identity.id.clone()) else {
                state.signed_out();

                return Ok(());
            };

            state.phase = CartPhase::Hydrating;

            Ticket {
                epoch: state.epoch,
                user,
            }
        };

        debug!(user = %ticket.user, "hydrating cart");

        let pending = Pending::new(self, &ticket, CartErrorKind::FetchFailed, |_: &mut Cart| {});
        let result = self.call(self.store.fetch_cart(&ticket.user)).await;

        pending.disarm();

        let mut state = self.write();

        if state.epoch != ticket.epoch {
            debug!(user = %ticket.user, "discarding cart fetched for a previous identity");

            return Ok(());
        }

        match result {
            Ok(remote) => {
                state.cart = self.resolve(remote);
                state.phase = CartPhase::Ready;
                state.last_error = None;
                state.last_synced_at = Some(Timestamp::now());

                info!(
                    user = %ticket.user,
                    lines = state.cart.len(),
                    count = state.cart.count(),
                    "cart hydrated"
                );

                Ok(())
            }
            Err(source) => {
                state.last_error = Some(CartErrorKind::FetchFailed);
                state.phase = if state.cart.is_empty() {
                    CartPhase::Empty
                } else {
                    CartPhase::Ready
                };

                warn!(user = %ticket.user, error = %source, "failed to hydrate cart; keeping previous lines");

                Err(CartError::FetchFailed(source))
            }
        }
    }

    /// Add `quantity` of a product, increasing an existing line.
    ///
    /// The store receives the delta, not the resulting quantity.
    ///
    /// # Errors
    ///
    /// - [`CartError::Unauthenticated`]: nobody is signed in.
    /// - [`CartError::InvalidQuantity`]: `quantity` is zero.
    /// - [`CartError::AddFailed`]: the remote call failed or timed out.
    pub async fn add_item(
        &self,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<CartChange, CartError> {
        let _queue = self.queue.lock().await;
        let ticket = self.ticket()?;

        if quantity == 0 {
            return Err(self.reject(CartError::InvalidQuantity(quantity)));
        }

        let previous = {
            let mut state = self.write();
            state.phase = CartPhase::Mutating;

            state
                .cart
                .increment(product_id, quantity, || self.catalog.get_product(product_id))
        };

        let pending = Pending::new(self, &ticket, CartErrorKind::AddFailed, |cart: &mut Cart| {
            cart.revert_increment(product_id, previous);
        });

        let result = self
            .call(self.store.add_item(&ticket.user, product_id, quantity))
            .await;

        self.settle(
            &ticket,
            pending,
            result,
            CartNotice::Added(product_id),
            CartError::AddFailed,
        )
    }

    /// Set the quantity of an existing line.
    ///
    /// Quantities below one and products without a line are no-ops; removal goes
    /// through [`CartSession::remove_item`]. The store receives the absolute
    /// quantity.
    ///
    /// # Errors
    ///
    /// - [`CartError::Unauthenticated`]: nobody is signed in.
    /// - [`CartError::UpdateFailed`]: the remote call failed or timed out.
    pub async fn update_quantity(
        &self,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<CartChange, CartError> {
        let _queue = self.queue.lock().await;
        let ticket = self.ticket()?;

        if quantity < 1 {
            debug!(%product_id, "ignoring quantity update below 1");

            return Ok(CartChange::Unchanged);
        }

        let previous = {
            let mut state = self.write();
            let previous = state.cart.set_quantity(product_id, quantity);

            if previous.is_some() {
                state.phase = CartPhase::Mutating;
            }

            previous
        };

        let Some(previous) = previous else {
            debug!(%product_id, "no cart line to update");

            return Ok(CartChange::Unchanged);
        };

        let pending = Pending::new(self, &ticket, CartErrorKind::UpdateFailed, |cart: &mut Cart| {
            cart.set_quantity(product_id, previous);
        });

        let result = self
            .call(self.store.update_item(&ticket.user, product_id, quantity))
            .await;

        self.settle(
            &ticket,
            pending,
            result,
            CartNotice::Updated(product_id),
            CartError::UpdateFailed,
        )
    }

    /// Remove the line for a product. Unknown products are a no-op.
    ///
    /// # Errors
    ///
    /// - [`CartError::Unauthenticated`]: nobody is signed in.
    /// - [`CartError::RemoveFailed`]: the remote call failed or timed out.
    pub async fn remove_item(&self, product_id: ProductId) -> Result<CartChange, CartError> {
        let _queue = self.queue.lock().await;
        let ticket = self.ticket()?;

        let removed = {
            let mut state = self.write();
            let removed = state.cart.remove(product_id);

            if removed.is_some() {
                state.phase = CartPhase::Mutating;
            }

            removed
        };

        let Some((position, line)) = removed else {
            debug!(%product_id, "no cart line to remove");

            return Ok(CartChange::Unchanged);
        };

        let pending = Pending::new(self, &ticket, CartErrorKind::RemoveFailed, |cart: &mut Cart| {
            cart.reinsert(position, line);
        });

        let result = self
            .call(self.store.remove_item(&ticket.user, product_id))
            .await;

        self.settle(
            &ticket,
            pending,
            result,
            CartNotice::Removed(product_id),
            CartError::RemoveFailed,
        )
    }

    /// Empty the local cart view.
    ///
    /// The remote store has no bulk delete, so this only affects the local view;
    /// the next hydration restores whatever the store still holds. Clearing an
    /// empty cart is `Unchanged` and sends no notice.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Unauthenticated`] when nobody is signed in.
    pub async fn clear_cart(&self) -> Result<CartChange, CartError> {
        let _queue = self.queue.lock().await;
        let _ticket = self.ticket()?;

        let change = {
            let mut state = self.write();

            if state.cart.is_empty() {
                CartChange::Unchanged
            } else {
                state.cart.clear();
                state.phase = CartPhase::Ready;

                CartChange::Applied
            }
        };

        if change == CartChange::Applied {
            debug!("local cart view cleared");

            self.notify(CartNotice::Cleared);
        }

        Ok(change)
    }

    /// Snapshot of the current lines.
    pub fn lines(&self) -> Vec<CartLine> {
        self.read().cart.lines().to_vec()
    }

    /// Snapshot of the current cart.
    pub fn cart(&self) -> Cart {
        self.read().cart.clone()
    }

    /// Sum of all line quantities.
    pub fn count(&self) -> u64 {
        self.read().cart.count()
    }

    /// Sum of price × quantity; unresolved products contribute nothing.
    pub fn total(&self) -> Money<'static, Currency> {
        self.read().cart.total(self.catalog.currency())
    }

    /// Currency totals are expressed in.
    pub fn currency(&self) -> &'static Currency {
        self.catalog.currency()
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> CartPhase {
        self.read().phase
    }

    /// Whether a remote call is in flight.
    pub fn is_syncing(&self) -> bool {
        matches!(self.phase(), CartPhase::Hydrating | CartPhase::Mutating)
    }

    /// The most recent failure, until dismissed.
    pub fn last_error(&self) -> Option<CartErrorKind> {
        self.read().last_error
    }

    /// Dismiss the most recent failure.
    pub fn dismiss_error(&self) {
        self.write().last_error = None;
    }

    /// The user the cart belongs to.
    pub fn identity(&self) -> Option<Identity> {
        self.read().identity.clone()
    }

    /// When the cart last hydrated successfully.
    pub fn last_synced_at(&self) -> Option<Timestamp> {
        self.read().last_synced_at
    }

    /// Subscribe to notices for settled mutations.
    pub fn subscribe(&self) -> broadcast::Receiver<CartNotice> {
        self.notices.subscribe()
    }

    fn read(&self) -> RwLockReadGuard<'_, SessionState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn ticket(&self) -> Result<Ticket, CartError> {
        let ticket = {
            let state = self.read();

            state.identity.as_ref().map(|identity| Ticket {
                epoch: state.epoch,
                user: identity.id.clone(),
            })
        };

        ticket.ok_or_else(|| self.reject(CartError::Unauthenticated))
    }

    fn reject(&self, error: CartError) -> CartError {
        self.write().last_error = Some(error.kind());

        debug!(%error, "cart operation rejected");

        self.notify(CartNotice::Failed(error.kind()));

        error
    }

    async fn call<T>(
        &self,
        request: impl Future<Output = Result<T, CartStoreError>>,
    ) -> Result<T, CartStoreError> {
        let timeout = self.config.request_timeout;

        tokio::time::timeout(timeout, request)
            .await
            .unwrap_or_else(|_elapsed| Err(CartStoreError::Timeout(timeout)))
    }

    fn resolve(&self, remote: Vec<RemoteCartLine>) -> Cart {
        let received = remote.len();

        let lines: Vec<CartLine> = remote
            .into_iter()
            .filter_map(|line| {
                let product = self.catalog.get_product(line.product_id);

                if product.is_none() {
                    debug!(product_id = %line.product_id, "remote cart line references an unknown product");
                }

                let resolved = CartLine::new(line.product_id, line.quantity, product);

                if resolved.is_none() {
                    warn!(product_id = %line.product_id, "dropping remote cart line with zero quantity");
                }

                resolved
            })
            .collect();

        let kept = lines.len();
        let cart = Cart::from_lines(lines);

        if cart.len() < kept {
            warn!(
                received,
                merged = kept - cart.len(),
                "merged duplicate remote cart lines"
            );
        }

        cart
    }

    fn settle<R: FnOnce(&mut Cart)>(
        &self,
        ticket: &Ticket,
        pending: Pending<'_, R>,
        result: Result<(), CartStoreError>,
        notice: CartNotice,
        failed: fn(CartStoreError) -> CartError,
    ) -> Result<CartChange, CartError> {
        let rollback = pending.disarm();
        let mut state = self.write();
        let current = state.epoch == ticket.epoch;

        match result {
            Ok(()) => {
                if current {
                    state.phase = CartPhase::Ready;
                }

                drop(state);

                info!(user = %ticket.user, ?notice, "cart mutation settled");

                self.notify(notice);

                Ok(CartChange::Applied)
            }
            Err(source) => {
                let error = failed(source);

                if current {
                    if let Some(rollback) = rollback
                        && self.config.failure_policy == FailurePolicy::Rollback
                    {
                        rollback(&mut state.cart);
                    }

                    state.last_error = Some(error.kind());
                    state.phase = CartPhase::Ready;
                }

                drop(state);

                warn!(
                    user = %ticket.user,
                    %error,
                    policy = ?self.config.failure_policy,
                    "cart mutation failed"
                );

                self.notify(CartNotice::Failed(error.kind()));

                Err(error)
            }
        }
    }

    fn abandon(&self, epoch: u64, kind: CartErrorKind, rollback: impl FnOnce(&mut Cart)) {
        {
            let mut state = self.write();

            if state.epoch != epoch {
                return;
            }

            if self.config.failure_policy == FailurePolicy::Rollback {
                rollback(&mut state.cart);
            }

            state.last_error = Some(kind);
            state.phase = if kind == CartErrorKind::FetchFailed && state.cart.is_empty() {
                CartPhase::Empty
            } else {
                CartPhase::Ready
            };
        }

        warn!(?kind, "cart operation cancelled before the store answered");

        self.notify(CartNotice::Failed(kind));
    }

    fn notify(&self, notice: CartNotice) {
        if self.notices.send(notice).is_err() {
            debug!(?notice, "no notice subscribers");
        }
    }
}
