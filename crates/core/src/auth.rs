//! Auth Session

use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

/// Remote user identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Wrap a raw user id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Raw user id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}

/// Authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// User id the remote cart is keyed by
    pub id: UserId,

    /// Display name
    pub name: String,

    /// Email address
    pub email: String,

    /// Whether the user has admin rights
    #[serde(default)]
    pub is_admin: bool,
}

/// Current identity plus change notifications.
///
/// Receivers returned by [`AuthSession::subscribe`] observe every sign-in and
/// sign-out as a new value.
#[derive(Debug)]
pub struct AuthSession {
    identity: watch::Sender<Option<Identity>>,
}

impl AuthSession {
    /// Create a signed-out session.
    pub fn new() -> Self {
        Self::with_identity(None)
    }

    /// Create a session with an initial identity, e.g. one restored from disk.
    pub fn with_identity(identity: Option<Identity>) -> Self {
        let (identity, _receiver) = watch::channel(identity);

        Self { identity }
    }

    /// The signed-in user, if any.
    pub fn current_identity(&self) -> Option<Identity> {
        self.identity.borrow().clone()
    }

    /// Whether a user is signed in.
    pub fn is_authenticated(&self) -> bool {
        self.identity.borrow().is_some()
    }

    /// Subscribe to identity transitions.
    pub fn subscribe(&self) -> watch::Receiver<Option<Identity>> {
        self.identity.subscribe()
    }

    /// Record a successful sign-in.
    pub fn sign_in(&self, identity: Identity) {
        self.identity.send_replace(Some(identity));
    }

    /// Sign the current user out.
    pub fn sign_out(&self) {
        self.identity.send_replace(None);
    }
}

impl Default for AuthSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
pub(crate) fn test_identity(id: &str) -> Identity {
    Identity {
        id: UserId::new(id),
        name: format!("User {id}"),
        email: format!("{id}@example.com"),
        is_admin: false,
    }
}
