//! Auth service.

use async_trait::async_trait;
use mockall::automock;
use reqwest::Method;
use tracing::{debug, info};

use crate::{
    api::ApiClient,
    auth::{AuthGrant, AuthResponse, AuthServiceError, Credentials, Registration},
};

const LOGIN_FAILED: &str = "Failed to login";
const REGISTER_FAILED: &str = "Failed to register";

#[automock]
#[async_trait]
pub trait AuthService: Send + Sync {
    async fn login(&self, credentials: &Credentials) -> Result<AuthGrant, AuthServiceError>;

    async fn register(&self, registration: &Registration)
    -> Result<AuthGrant, AuthServiceError>;
}

/// [`AuthService`] backed by the storefront REST API.
///
/// A successful sign-in stores the issued token on the shared [`ApiClient`].
#[derive(Debug, Clone)]
pub struct HttpAuthClient {
    api: ApiClient,
}

impl HttpAuthClient {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    async fn authenticate(
        &self,
        path: &str,
        body: &(impl serde::Serialize + Sync),
        fallback: &str,
    ) -> Result<AuthGrant, AuthServiceError> {
        let request = self.api.request(Method::POST, path).json(body);

        let response = self
            .api
            .send(request)
            .await
            .map_err(|error| AuthServiceError::from_api(error, fallback))?;

        let parsed: AuthResponse = response
            .json()
            .await
            .map_err(|error| AuthServiceError::from_api(error.into(), fallback))?;

        let grant = grant_from(parsed)?;

        self.api.set_token(grant.token.clone());

        info!(user = %grant.identity.id, "signed in");

        Ok(grant)
    }
}

#[async_trait]
impl AuthService for HttpAuthClient {
    async fn login(&self, credentials: &Credentials) -> Result<AuthGrant, AuthServiceError> {
        self.authenticate("login", credentials, LOGIN_FAILED).await
    }

    async fn register(
        &self,
        registration: &Registration,
    ) -> Result<AuthGrant, AuthServiceError> {
        self.authenticate("register", registration, REGISTER_FAILED)
            .await
    }
}

fn grant_from(response: AuthResponse) -> Result<AuthGrant, AuthServiceError> {
    let user = response.user.ok_or(AuthServiceError::MissingUser)?;

    if let Some(message) = response.message.as_deref() {
        debug!(server_message = message, "auth response");
    }

    Ok(AuthGrant {
        identity: user.into(),
        token: response.token,
    })
}
