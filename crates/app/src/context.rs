//! App Context

use std::sync::Arc;

use storefront::{
    catalog::CatalogError,
    prelude::{CartError, CartSession, Catalog, InMemoryCatalog, Identity},
};
use thiserror::Error;
use tracing::debug;

use crate::{
    api::{ApiClient, ApiError},
    auth::{AuthGrant, AuthService, AuthServiceError, Credentials, HttpAuthClient, Registration},
    carts::HttpCartStore,
    config::AppConfig,
    session_file::{SavedSession, SessionFile, SessionFileError},
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to load product catalog")]
    Catalog(#[from] CatalogError),

    #[error("failed to build API client")]
    Api(#[from] ApiError),
}

#[derive(Clone)]
pub struct AppContext {
    pub api: ApiClient,
    pub catalog: Arc<InMemoryCatalog>,
    pub auth: Arc<dyn AuthService>,
    pub cart: Arc<CartSession>,
    pub session_file: SessionFile,
}

impl AppContext {
    /// Build application context from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error when the catalog cannot be loaded or the HTTP client
    /// cannot be built.
    pub fn from_config(config: &AppConfig) -> Result<Self, AppInitError> {
        let catalog = Arc::new(InMemoryCatalog::from_path(&config.cart.catalog)?);
        let api = ApiClient::new(&config.api.api_url, config.api.request_timeout())?;

        debug!(
            products = catalog.len(),
            api_url = api.base_url(),
            "application context ready"
        );

        let cart = CartSession::new(
            Arc::new(HttpCartStore::new(api.clone())),
            Arc::clone(&catalog) as Arc<dyn Catalog>,
            config.cart.session_config(&config.api),
        );

        Ok(Self {
            auth: Arc::new(HttpAuthClient::new(api.clone())),
            api,
            catalog,
            cart: Arc::new(cart),
            session_file: SessionFile::new(&config.session_file),
        })
    }

    /// Restore the saved sign-in and hydrate the cart for it.
    ///
    /// Returns the restored identity, or `None` when nobody is signed in.
    ///
    /// # Errors
    ///
    /// Returns an error when the session file cannot be read or the cart
    /// cannot be loaded.
    pub async fn restore(&self) -> Result<Option<Identity>, RestoreError> {
        let Some(saved) = self.session_file.load()? else {
            return Ok(None);
        };

        self.api.set_token(saved.token);
        self.cart.set_identity(Some(saved.identity.clone())).await?;

        Ok(Some(saved.identity))
    }

    /// Sign in and remember the session for later invocations.
    ///
    /// The cart is not hydrated; call [`CartSession::set_identity`] with the
    /// returned identity.
    ///
    /// # Errors
    ///
    /// Returns an error when the API rejects the credentials or the session
    /// file cannot be written.
    pub async fn login(&self, credentials: &Credentials) -> Result<AuthGrant, SignInError> {
        let grant = self.auth.login(credentials).await?;

        self.remember(&grant)?;

        Ok(grant)
    }

    /// Create an account, sign in and remember the session.
    ///
    /// # Errors
    ///
    /// Returns an error when the API rejects the registration or the session
    /// file cannot be written.
    pub async fn register(&self, registration: &Registration) -> Result<AuthGrant, SignInError> {
        let grant = self.auth.register(registration).await?;

        self.remember(&grant)?;

        Ok(grant)
    }

    /// Sign out, empty the cart and forget the saved session.
    ///
    /// Returns the session that was saved, if any.
    ///
    /// # Errors
    ///
    /// Returns an error when the session file cannot be read or removed.
    pub fn logout(&self) -> Result<Option<SavedSession>, SessionFileError> {
        let saved = self.session_file.load()?;

        self.cart.sign_out();
        self.api.set_token(None);
        self.session_file.clear()?;

        Ok(saved)
    }

    fn remember(&self, grant: &AuthGrant) -> Result<(), SessionFileError> {
        self.api.set_token(grant.token.clone());

        self.session_file
            .save(&SavedSession::new(grant.identity.clone(), grant.token.clone()))
    }
}

#[derive(Debug, Error)]
pub enum SignInError {
    #[error(transparent)]
    Auth(#[from] AuthServiceError),

    #[error(transparent)]
    SessionFile(#[from] SessionFileError),
}

#[derive(Debug, Error)]
pub enum RestoreError {
    #[error(transparent)]
    SessionFile(#[from] SessionFileError),

    #[error(transparent)]
    Cart(#[from] CartError),
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("api", &self.api)
            .field("catalog", &self.catalog.len())
            .field("cart", &self.cart)
            .field("session_file", &self.session_file)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::{fs, path::Path};

    use storefront::prelude::UserId;
    use tempfile::TempDir;
    use testresult::TestResult;

    use crate::{
        auth::MockAuthService,
        config::{
            api::ApiConfig,
            cart::{CartConfig, FailurePolicyArg},
            logging::{LogFormat, LoggingConfig},
        },
    };

    use super::*;

    const CATALOG: &str = r#"
products:
  - id: 1
    name: Hoodie
    price: "69.99 USD"
    image: /imgs/hoodie.webp
    category: Clothing
    theme: naruto
"#;

    fn config(dir: &Path) -> Result<AppConfig, std::io::Error> {
        let catalog = dir.join("catalog.yaml");

        fs::write(&catalog, CATALOG)?;

        Ok(AppConfig {
            api: ApiConfig {
                api_url: "http://127.0.0.1:9".to_string(),
                request_timeout_seconds: 1,
            },
            cart: CartConfig {
                catalog,
                failure_policy: FailurePolicyArg::Rollback,
            },
            logging: LoggingConfig {
                log_level: "warn".to_string(),
                log_format: LogFormat::Compact,
            },
            session_file: dir.join("session.json"),
        })
    }

    fn ada() -> Identity {
        Identity {
            id: UserId::new("u1"),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            is_admin: false,
        }
    }

    #[test]
    fn missing_catalog_fails_to_build() -> TestResult {
        let dir = TempDir::new()?;
        let mut config = config(dir.path())?;

        config.cart.catalog = dir.path().join("missing.yaml");

        let result = AppContext::from_config(&config);

        assert!(
            matches!(result, Err(AppInitError::Catalog(_))),
            "expected Catalog error, got {:?}",
            result.err()
        );

        Ok(())
    }

    #[tokio::test]
    async fn restore_without_saved_session_is_signed_out() -> TestResult {
        let dir = TempDir::new()?;
        let context = AppContext::from_config(&config(dir.path())?)?;

        assert_eq!(context.catalog.len(), 1);
        assert_eq!(context.restore().await?, None);
        assert!(context.cart.identity().is_none());

        Ok(())
    }

    #[tokio::test]
    async fn restore_applies_saved_identity_and_token() -> TestResult {
        let dir = TempDir::new()?;
        let context = AppContext::from_config(&config(dir.path())?)?;
        let identity = ada();

        context
            .session_file
            .save(&SavedSession::new(identity.clone(), Some("token".to_string())))?;

        // Nothing listens on the configured port, so hydration fails.
        let result = context.restore().await;

        assert!(
            matches!(result, Err(RestoreError::Cart(CartError::FetchFailed(_)))),
            "expected FetchFailed, got {result:?}"
        );
        assert_eq!(context.api.token().as_deref(), Some("token"));
        assert_eq!(context.cart.identity(), Some(identity));
        assert!(context.cart.lines().is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn login_remembers_identity_and_token() -> TestResult {
        let dir = TempDir::new()?;
        let mut context = AppContext::from_config(&config(dir.path())?)?;
        let mut auth = MockAuthService::new();

        auth.expect_login()
            .once()
            .withf(|credentials| {
                credentials.email == "ada@example.com" && credentials.password == "hunter2"
            })
            .return_once(|_| {
                Ok(AuthGrant {
                    identity: ada(),
                    token: Some("token".to_string()),
                })
            });

        context.auth = Arc::new(auth);

        let grant = context
            .login(&Credentials {
                email: "ada@example.com".to_string(),
                password: "hunter2".to_string(),
            })
            .await?;

        assert_eq!(grant.identity, ada());
        assert_eq!(context.api.token().as_deref(), Some("token"));

        let saved = context.session_file.load()?.ok_or("session was not saved")?;

        assert_eq!(saved.identity, ada());
        assert_eq!(saved.token.as_deref(), Some("token"));

        Ok(())
    }

    #[tokio::test]
    async fn rejected_login_saves_nothing() -> TestResult {
        let dir = TempDir::new()?;
        let mut context = AppContext::from_config(&config(dir.path())?)?;
        let mut auth = MockAuthService::new();

        auth.expect_login()
            .once()
            .return_once(|_| Err(AuthServiceError::Rejected("Invalid credentials".to_string())));

        context.auth = Arc::new(auth);

        let result = context
            .login(&Credentials {
                email: "ada@example.com".to_string(),
                password: "wrong".to_string(),
            })
            .await;

        assert!(
            matches!(&result, Err(SignInError::Auth(AuthServiceError::Rejected(message))) if message == "Invalid credentials"),
            "expected rejected login, got {result:?}"
        );
        assert_eq!(context.session_file.load()?, None);
        assert_eq!(context.api.token(), None);

        Ok(())
    }

    #[tokio::test]
    async fn register_then_logout_forgets_the_session() -> TestResult {
        let dir = TempDir::new()?;
        let mut context = AppContext::from_config(&config(dir.path())?)?;
        let mut auth = MockAuthService::new();

        auth.expect_register()
            .once()
            .withf(|registration| registration.name == "Ada")
            .return_once(|_| {
                Ok(AuthGrant {
                    identity: ada(),
                    token: None,
                })
            });

        context.auth = Arc::new(auth);

        context
            .register(&Registration {
                name: "Ada".to_string(),
                email: "ada@example.com".to_string(),
                password: "hunter2".to_string(),
            })
            .await?;

        let saved = context.logout()?;

        assert_eq!(saved.map(|saved| saved.identity), Some(ada()));
        assert_eq!(context.session_file.load()?, None);
        assert!(context.cart.identity().is_none());
        assert_eq!(context.logout()?, None);

        Ok(())
    }
}
