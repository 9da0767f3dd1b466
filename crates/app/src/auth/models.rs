//! Auth data models.

use serde::{Deserialize, Serialize};
use storefront::prelude::{Identity, UserId};

/// Login request body.
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Registration request body.
#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Signed-in user plus the bearer token the API issued, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthGrant {
    pub identity: Identity,
    pub token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AuthResponse {
    #[serde(default)]
    pub(crate) message: Option<String>,

    #[serde(default)]
    pub(crate) token: Option<String>,

    #[serde(default)]
    pub(crate) user: Option<UserPayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UserPayload {
    #[serde(rename = "_id")]
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) email: String,
    #[serde(default)]
    pub(crate) is_admin: bool,
}

impl From<UserPayload> for Identity {
    fn from(user: UserPayload) -> Self {
        Identity {
            id: UserId::new(user.id),
            name: user.name,
            email: user.email,
            is_admin: user.is_admin,
        }
    }
}
